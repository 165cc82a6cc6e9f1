//! Security utilities for TurboDocx webhook verification
//!
//! TurboDocx signs every delivery with HMAC-SHA256 using the shared webhook
//! secret. Two headers travel with the request:
//!
//! - `X-TurboDocx-Signature`: `sha256=<hex_signature>`
//! - `X-TurboDocx-Timestamp`: Unix seconds at signing time
//!
//! To verify authenticity:
//! 1. Reject when any input is empty
//! 2. Reject when the timestamp is more than 300 seconds away from now, in either direction
//! 3. Compute HMAC-SHA256 of `<timestamp>.<raw body>` using the secret
//! 4. Compare `sha256=<computed hex>` with the received header in constant time
//!
//! # Important Notes
//!
//! - The signature MUST be computed on the raw request body bytes, not parsed JSON
//! - The timestamp is signed exactly as received, not re-formatted
//! - The comparison must be constant-time to prevent timing attacks

use derive_more::Display;
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{config::WebhookSecret, consts};

type HmacSha256 = Hmac<Sha256>;

/// Why a delivery was refused. Only ever logged server-side, the caller
/// always gets the same 401.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[display("missing signature header")]
    MissingSignature,
    #[display("signature header without 'sha256=' prefix")]
    MalformedSignature,
    #[display("missing timestamp header")]
    MissingTimestamp,
    #[display("timestamp is not an integer")]
    InvalidTimestamp,
    #[display("timestamp outside the replay window")]
    StaleTimestamp,
    #[display("empty request body")]
    EmptyBody,
    #[display("webhook secret not configured")]
    MissingSecret,
    #[display("signatures do not match")]
    SignatureMismatch,
}

/// Computes the value TurboDocx puts in `X-TurboDocx-Signature` for the given
/// timestamp text and raw body: `sha256=<lowercase hex>`.
pub fn compute_signature(
    secret: &WebhookSecret,
    timestamp: &str,
    body: &[u8],
) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);

    Ok(format!(
        "{}{}",
        consts::SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Checks a delivery against the secret using `now` (Unix seconds) as the
/// current time, returning the reason when it is refused.
pub fn check_signature_at(
    signature_header: &str,
    timestamp_header: &str,
    body: &[u8],
    secret: &WebhookSecret,
    now: i64,
) -> Result<(), RejectReason> {
    if signature_header.is_empty() {
        return Err(RejectReason::MissingSignature);
    }
    if !signature_header.starts_with(consts::SIGNATURE_PREFIX) {
        return Err(RejectReason::MalformedSignature);
    }
    if timestamp_header.is_empty() {
        return Err(RejectReason::MissingTimestamp);
    }
    if body.is_empty() {
        return Err(RejectReason::EmptyBody);
    }
    if secret.is_empty() {
        return Err(RejectReason::MissingSecret);
    }

    let timestamp = timestamp_header
        .parse::<i64>()
        .map_err(|_| RejectReason::InvalidTimestamp)?;

    if now.abs_diff(timestamp) > consts::REPLAY_WINDOW_SECS {
        return Err(RejectReason::StaleTimestamp);
    }

    let expected = match compute_signature(secret, timestamp_header, body) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return Err(RejectReason::MissingSecret);
        }
    };

    // Constant-time comparison to prevent timing attacks
    let is_valid: bool = expected
        .as_bytes()
        .ct_eq(signature_header.as_bytes())
        .into();

    if !is_valid {
        return Err(RejectReason::SignatureMismatch);
    }

    Ok(())
}

/// Verifies a delivery using `now` (Unix seconds) as the current time.
///
/// Never panics on malformed input, a bad delivery is just `false`.
pub fn verify_signature_at(
    signature_header: &str,
    timestamp_header: &str,
    body: &[u8],
    secret: &WebhookSecret,
    now: i64,
) -> bool {
    check_signature_at(signature_header, timestamp_header, body, secret, now).is_ok()
}

/// Verifies the TurboDocx signature headers against the raw request body
///
/// # Arguments
///
/// * `signature_header` - The value of the X-TurboDocx-Signature header (e.g., "sha256=abc123...")
/// * `timestamp_header` - The value of the X-TurboDocx-Timestamp header (e.g., "1718000000")
/// * `body` - The raw request body bytes
/// * `secret` - The shared webhook secret
///
/// # Returns
///
/// * `true` if the delivery is fresh and the signature is valid
/// * `false` otherwise
///
/// # Example
///
/// ```
/// use turbodocx_webhook::config::WebhookSecret;
/// use turbodocx_webhook::webhook::turbodocx::security::{compute_signature, verify_signature};
///
/// let secret = WebhookSecret::new("your-secret");
/// let body = br#"{"event":"signature.document.completed","data":{}}"#;
/// let timestamp = chrono::Utc::now().timestamp().to_string();
/// let header = compute_signature(&secret, &timestamp, body).unwrap();
///
/// assert!(verify_signature(&header, &timestamp, body, &secret));
/// ```
pub fn verify_signature(
    signature_header: &str,
    timestamp_header: &str,
    body: &[u8],
    secret: &WebhookSecret,
) -> bool {
    verify_signature_at(
        signature_header,
        timestamp_header,
        body,
        secret,
        chrono::Utc::now().timestamp(),
    )
}
