//! TurboDocx webhook integration module
//!
//! Receives document / e-signature events pushed by TurboDocx.
//!
//! ## Submodules
//!
//! - [`security`] - Timestamped HMAC-SHA256 signature verification
//! - [`schemas`] - Event envelope and event types
//! - [`handler`] - Dispatch of verified events to business handlers
//! - [`routes`] - HTTP endpoint handler (verification guard, status code mapping)

pub mod handler;
pub mod routes;
pub mod schemas;
pub mod security;

// Re-export commonly used items for convenience
pub use routes::{AppState, receive};
