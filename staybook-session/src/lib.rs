//! Staybook Session - who is signed in, and what they may open
//!
//! This crate sits between the API access layer and any presentation layer:
//!
//! - [`SessionManager`] owns the authenticated identity and its lifecycle
//!   (`Unresolved -> Resolving -> Authenticated | Anonymous`)
//! - [`RoleSet`] and the role helpers derive permissions from that identity
//! - [`RouteGuard`] turns a session state and a required role set into a
//!   [`GuardDecision`] for the host to act on
//!
//! Nothing here is global. Create one manager per running client and pass it
//! to whatever needs it.

pub mod guard;
pub mod manager;
pub mod roles;
pub mod state;

pub use guard::{GuardDecision, RouteGuard, PUBLIC_ENTRY_POINT};
pub use manager::SessionManager;
pub use roles::RoleSet;
pub use state::SessionState;
