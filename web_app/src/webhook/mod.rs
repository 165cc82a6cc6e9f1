//! Webhook handlers for external integrations
//!
//! ## Modules
//!
//! - [`turbodocx`] - TurboDocx document / e-signature webhook handlers

pub mod routes;
pub mod turbodocx;
