use derive_more::{Display, Error};
use ntex::{http, web};

/// Errors surfaced to the caller of the webhook endpoint.
///
/// The response body is a fixed message per status code, the inner details
/// only reach the server logs. Webhook failures are logged where they happen,
/// inside the delivery span, so the responder only logs unmatched urls.
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    UrlNotFound,
    Unauthorized,
    MalformedPayload(#[error(not(source))] String),
    HandlerFailure(#[error(not(source))] String),
}

impl WebhookError {
    fn get_error_message(&self) -> String {
        match self {
            WebhookError::UrlNotFound => "[UrlNotFound]".to_string(),
            WebhookError::Unauthorized => "[Unauthorized]".to_string(),
            WebhookError::MalformedPayload(msg) => format!("[MalformedPayload] {:#?}", msg),
            WebhookError::HandlerFailure(msg) => format!("[HandlerFailure] {:#?}", msg),
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            WebhookError::UrlNotFound => "Not Found",
            WebhookError::Unauthorized => "Unauthorized",
            WebhookError::MalformedPayload(_) => "Bad Request",
            WebhookError::HandlerFailure(_) => "Internal Server Error",
        }
    }
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        if let WebhookError::UrlNotFound = self {
            tracing::warn!("{}", self.get_error_message());
        }

        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/plain; charset=utf-8")
            .body(self.public_message())
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::UrlNotFound => http::StatusCode::NOT_FOUND,
            WebhookError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            WebhookError::MalformedPayload(_) => http::StatusCode::BAD_REQUEST,
            WebhookError::HandlerFailure(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
