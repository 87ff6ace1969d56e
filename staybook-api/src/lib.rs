//! Staybook API - Access layer for the hotel-booking backend
//!
//! Every call goes through [`ApiClient`], which attaches the persisted bearer
//! token and normalizes results into a payload or an
//! [`ApiError`](staybook_core::ApiError):
//!
//! - `Network` (status 0) when no response was received
//! - `Application` (real HTTP status) for any non-2xx response
//!
//! Resource handles (`client.hotels()`, `client.bookings()`, ...) are thin
//! wrappers with fixed paths.

pub mod auth;
pub mod client;
pub mod resources;
pub mod token;

pub use auth::{Auth, AuthApi};
pub use client::{ApiClient, RequestOptions, DEFAULT_UPLOAD_FIELD};
pub use resources::{Bookings, Hotels, Photos, Rooms, Users};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
