//! Staybook Core - Shared data structures for the Staybook client
//!
//! This crate defines the domain model, the error taxonomy, configuration and
//! logging used by the API access layer and the session manager.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
