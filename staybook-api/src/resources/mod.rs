//! Per-resource operations
//!
//! Thin wrappers over [`ApiClient::request_json`](crate::ApiClient::request_json)
//! with fixed paths and methods. They add no logic of their own.

pub mod bookings;
pub mod hotels;
pub mod photos;
pub mod rooms;
pub mod users;

pub use bookings::Bookings;
pub use hotels::Hotels;
pub use photos::Photos;
pub use rooms::Rooms;
pub use users::Users;
