//! Handlers not linked to a specific integration

use ntex::web;
use serde_json::json;

use crate::errors;

/// Return a [UrlNotFound](errors::WebhookError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::WebhookError::UrlNotFound.into())
}

/// Liveness endpoint for load balancers and uptime checks
#[web::get("/health")]
pub async fn health() -> Result<impl web::Responder, web::Error> {
    Ok(web::HttpResponse::Ok().json(&json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
