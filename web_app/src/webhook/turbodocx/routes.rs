//! TurboDocx webhook endpoint handler
//!
//! # Security
//!
//! Every delivery goes through signature verification before its body is
//! parsed. Failures short-circuit in this order:
//!
//! 1. body over the size limit, signature or timestamp → 401, before any parsing
//! 2. body is not an event envelope → 400, before dispatch
//! 3. handler error or panic → 500 with a generic body
//!
//! Unknown event types are acknowledged with 200.

use super::{handler, schemas::EventEnvelope, security};
use crate::{config::WebhookSecret, consts, errors, metric};
use futures::StreamExt;
use tracing::Instrument;
use ntex::{
    util::{Bytes, BytesMut},
    web,
};
use uuid::Uuid;

/// State shared by the webhook handlers of one worker.
pub struct AppState {
    pub webhook_secret: WebhookSecret,
    pub dispatcher: handler::EventDispatcher,
}

fn header_value<'a>(req: &'a web::HttpRequest, name: &str) -> &'a str {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Reads the whole body, failing once it grows past `limit` bytes.
async fn read_body(mut payload: web::types::Payload, limit: usize) -> Result<Bytes, String> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| format!("body couldn't be read: {e}"))?;
        if body.len() + chunk.len() > limit {
            return Err(format!("body exceeds {limit} bytes"));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Webhook receiver endpoint (POST)
///
/// # Headers
/// - `X-TurboDocx-Signature` - `sha256=<hex>`
/// - `X-TurboDocx-Timestamp` - Unix seconds at signing time
///
/// # Returns
/// - 200 `{"status":"ok"}` once the event was dispatched (or ignored)
/// - 401 if the signature or timestamp is missing, invalid or stale, or the
///   body can't be read within [`consts::MAX_PAYLOAD_BYTES`]
/// - 400 if the verified body is not an event envelope
/// - 500 if the event handler failed
#[web::post("/webhook")]
pub async fn receive(
    req: web::HttpRequest,
    payload: web::types::Payload,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    let delivery_id = Uuid::new_v4().to_string();
    let span = logfire::span!(
        "turbodocx_webhook {delivery_id}",
        delivery_id = delivery_id.clone()
    );

    let body = read_body(payload, consts::MAX_PAYLOAD_BYTES)
        .instrument(span.clone())
        .await;
    let _span = span.entered();

    let signature = header_value(&req, consts::SIGNATURE_HEADER);
    let timestamp = header_value(&req, consts::TIMESTAMP_HEADER);

    // an unverifiable body is an unauthenticated delivery
    let body = match body {
        Ok(body) => body,
        Err(reason) => {
            logfire::warn!("Webhook body rejected: {reason}", reason = reason);
            metric::incr_delivery_outcome_statds("unauthorized");
            return Err(errors::WebhookError::Unauthorized.into());
        }
    };

    if let Err(reason) = security::check_signature_at(
        signature,
        timestamp,
        &body,
        &app_state.webhook_secret,
        chrono::Utc::now().timestamp(),
    ) {
        logfire::warn!(
            "Webhook signature verification failed: {reason}",
            reason = reason.to_string()
        );
        metric::incr_delivery_outcome_statds("unauthorized");
        return Err(errors::WebhookError::Unauthorized.into());
    }

    let envelope = EventEnvelope::from_slice(&body).map_err(|e| {
        logfire::error!(
            "Failed to parse webhook payload: {error}",
            error = e.to_string()
        );
        metric::incr_delivery_outcome_statds("malformed");
        errors::WebhookError::MalformedPayload(e.to_string())
    })?;

    let event_type = app_state.dispatcher.dispatch(&envelope).map_err(|e| {
        logfire::error!(
            "Failed to process webhook: {error}",
            error = e.to_string()
        );
        metric::incr_delivery_outcome_statds("handler_failure");
        errors::WebhookError::HandlerFailure(e.to_string())
    })?;

    metric::incr_event_type_statds(event_type.metric_label());
    metric::incr_delivery_outcome_statds("accepted");

    Ok(web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok"
    })))
}
