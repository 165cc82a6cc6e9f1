//! # TurboDocx Webhook Receiver
//!
//! Receives TurboDocx webhook deliveries, verifies their timestamped
//! HMAC-SHA256 signature and dispatches the events to business handlers.

pub mod config;
pub mod consts;
pub mod errors;
pub mod metric;
pub mod server;
pub mod webhook;
