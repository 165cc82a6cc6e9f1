use anyhow::Context;
use serde_json::{Map, Value};
use turbodocx_webhook::{
    config::WebhookSecret, consts, webhook::turbodocx::schemas::EventEnvelope,
    webhook::turbodocx::security,
};

/// A body plus the two headers TurboDocx would send with it.
#[derive(Debug, Clone)]
pub struct SignedDelivery {
    pub signature: String,
    pub timestamp: String,
    pub body: Vec<u8>,
}

pub fn sign_body(
    secret: &WebhookSecret,
    body: Vec<u8>,
    timestamp: i64,
) -> anyhow::Result<SignedDelivery> {
    let timestamp = timestamp.to_string();
    let signature = security::compute_signature(secret, &timestamp, &body)
        .map_err(|e| anyhow::anyhow!("signature couldn't be computed: {e}"))?;

    Ok(SignedDelivery {
        signature,
        timestamp,
        body,
    })
}

/// Serializes a test envelope for `event`, with `documentId` when given.
pub fn build_envelope_body(event: &str, document_id: Option<&str>) -> anyhow::Result<Vec<u8>> {
    let mut data = Map::new();
    if let Some(document_id) = document_id {
        data.insert("documentId".into(), Value::String(document_id.into()));
    }
    let mut envelope = EventEnvelope::new(event, data);
    envelope.timestamp = Some(chrono::Utc::now().to_rfc3339());

    serde_json::to_vec(&envelope).context("envelope couldn't be serialized")
}

/// POSTs a signed delivery, returning the status code and response body.
pub async fn send_delivery(url: &str, delivery: &SignedDelivery) -> anyhow::Result<(u16, String)> {
    let response = reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .header(consts::SIGNATURE_HEADER, &delivery.signature)
        .header(consts::TIMESTAMP_HEADER, &delivery.timestamp)
        .body(delivery.body.clone())
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .with_context(|| format!("response body from {url} couldn't be read"))?;

    Ok((status, body))
}
