pub const SIGNATURE_HEADER: &str = "X-TurboDocx-Signature";
pub const TIMESTAMP_HEADER: &str = "X-TurboDocx-Timestamp";
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Max skew in seconds between the delivery timestamp and the local clock.
/// Inclusive: a delivery exactly this old (or this far ahead) is accepted.
pub const REPLAY_WINDOW_SECS: u64 = 300;

pub const MAX_PAYLOAD_BYTES: usize = 1_048_576;

pub const EVENT_DOCUMENT_COMPLETED: &str = "signature.document.completed";
pub const EVENT_DOCUMENT_VOIDED: &str = "signature.document.voided";

/// Placeholder used by the TurboDocx docs, never acceptable in production.
pub const PLACEHOLDER_WEBHOOK_SECRET: &str = "your-webhook-secret";
