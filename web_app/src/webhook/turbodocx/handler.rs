//! # TurboDocx Webhook Handler
//!
//! Routes a verified [`EventEnvelope`] to the matching business handler.
//! Handlers are isolated: an error or a panic inside one becomes a
//! [`HandlerFailure`] for that delivery only, and unknown event types are
//! acknowledged without doing anything so newer TurboDocx events don't break
//! older receivers.

use derive_more::{Display, Error};
use serde_json::{Map, Value};
use std::panic::{self, AssertUnwindSafe};

use super::schemas::{EventEnvelope, EventType};

/// Business logic for the document events TurboDocx sends.
///
/// `data` is the untyped `data` object of the envelope, so fields must be
/// read defensively.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentEventHandler: Send + Sync {
    fn handle_document_completed(&self, data: &Map<String, Value>) -> anyhow::Result<()>;

    fn handle_document_voided(&self, data: &Map<String, Value>) -> anyhow::Result<()>;
}

pub type ImplDocumentEventHandler = Box<dyn DocumentEventHandler>;

/// Default handler: logs the affected document and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDocumentHandler;

fn document_id(data: &Map<String, Value>) -> &str {
    data.get("documentId")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

impl DocumentEventHandler for LoggingDocumentHandler {
    fn handle_document_completed(&self, data: &Map<String, Value>) -> anyhow::Result<()> {
        tracing::info!("Document completed: {}", document_id(data));
        Ok(())
    }

    fn handle_document_voided(&self, data: &Map<String, Value>) -> anyhow::Result<()> {
        tracing::info!("Document voided: {}", document_id(data));
        Ok(())
    }
}

/// A handler returned an error or panicked.
#[derive(Debug, Display, Error)]
#[display("handler for '{event}' failed: {reason}")]
pub struct HandlerFailure {
    pub event: String,
    pub reason: String,
}

/// Routes envelopes by event type. Holds no per-delivery state, so the same
/// dispatcher serves every delivery of a worker.
pub struct EventDispatcher {
    handler: ImplDocumentEventHandler,
}

impl EventDispatcher {
    pub fn new(handler: ImplDocumentEventHandler) -> Self {
        Self { handler }
    }

    /// Dispatches one envelope to its handler, exactly once.
    ///
    /// # Returns
    ///
    /// The resolved [`EventType`], including [`EventType::Unknown`] which is
    /// not an error.
    pub fn dispatch(&self, envelope: &EventEnvelope) -> Result<EventType, HandlerFailure> {
        let event_type = envelope.event_type();
        tracing::info!("Received event: {}", event_type);

        let outcome = match &event_type {
            EventType::DocumentCompleted => {
                run_isolated(|| self.handler.handle_document_completed(&envelope.data))
            }
            EventType::DocumentVoided => {
                run_isolated(|| self.handler.handle_document_voided(&envelope.data))
            }
            EventType::Unknown(tag) => {
                logfire::warn!("Unknown event type: {tag}", tag = tag.clone());
                Ok(())
            }
        };

        match outcome {
            Ok(()) => Ok(event_type),
            Err(reason) => Err(HandlerFailure {
                event: event_type.to_string(),
                reason,
            }),
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(Box::new(LoggingDocumentHandler))
    }
}

/// Runs a handler, turning both errors and panics into a message.
fn run_isolated<F>(handle: F) -> Result<(), String>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(handle)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{e:#}")),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("panicked: {msg}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(event: &str, data: Value) -> EventEnvelope {
        let Value::Object(data) = data else {
            panic!("test data must be an object");
        };
        EventEnvelope::new(event, data)
    }

    struct PanickingHandler;

    impl DocumentEventHandler for PanickingHandler {
        fn handle_document_completed(&self, _: &Map<String, Value>) -> anyhow::Result<()> {
            panic!("completion handler exploded");
        }

        fn handle_document_voided(&self, _: &Map<String, Value>) -> anyhow::Result<()> {
            panic!("{}", String::from("void handler exploded"));
        }
    }

    #[test]
    fn test_dispatch_document_completed() {
        let mut mock_handler = MockDocumentEventHandler::new();
        mock_handler
            .expect_handle_document_completed()
            .withf(|data: &Map<String, Value>| {
                data.get("documentId").and_then(Value::as_str) == Some("test123")
            })
            .times(1)
            .returning(|_| Ok(()));
        mock_handler.expect_handle_document_voided().never();
        let dispatcher = EventDispatcher::new(Box::new(mock_handler));

        let result = dispatcher.dispatch(&envelope(
            "signature.document.completed",
            json!({"documentId": "test123"}),
        ));

        assert_eq!(result.unwrap(), EventType::DocumentCompleted);
    }

    #[test]
    fn test_dispatch_document_voided() {
        let mut mock_handler = MockDocumentEventHandler::new();
        mock_handler.expect_handle_document_completed().never();
        mock_handler
            .expect_handle_document_voided()
            .times(1)
            .returning(|_| Ok(()));
        let dispatcher = EventDispatcher::new(Box::new(mock_handler));

        let result = dispatcher.dispatch(&envelope("signature.document.voided", json!({})));

        assert_eq!(result.unwrap(), EventType::DocumentVoided);
    }

    #[test]
    fn test_dispatch_unknown_event_is_acknowledged() {
        let mut mock_handler = MockDocumentEventHandler::new();
        mock_handler.expect_handle_document_completed().never();
        mock_handler.expect_handle_document_voided().never();
        let dispatcher = EventDispatcher::new(Box::new(mock_handler));

        let result = dispatcher.dispatch(&envelope("some.future.event", json!({})));
        assert_eq!(
            result.unwrap(),
            EventType::Unknown("some.future.event".into())
        );

        let result = dispatcher.dispatch(&envelope("", json!({})));
        assert_eq!(result.unwrap(), EventType::Unknown(String::new()));
    }

    #[test]
    fn test_dispatch_same_envelope_twice_calls_handler_twice() {
        let mut mock_handler = MockDocumentEventHandler::new();
        mock_handler
            .expect_handle_document_completed()
            .times(2)
            .returning(|_| Ok(()));
        let dispatcher = EventDispatcher::new(Box::new(mock_handler));
        let envelope = envelope(
            "signature.document.completed",
            json!({"documentId": "test123"}),
        );

        assert!(dispatcher.dispatch(&envelope).is_ok());
        assert!(dispatcher.dispatch(&envelope).is_ok());
    }

    #[test]
    fn test_dispatch_handler_error_becomes_failure() {
        let mut mock_handler = MockDocumentEventHandler::new();
        mock_handler
            .expect_handle_document_completed()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("storage unavailable")));
        let dispatcher = EventDispatcher::new(Box::new(mock_handler));

        let failure = dispatcher
            .dispatch(&envelope("signature.document.completed", json!({})))
            .unwrap_err();

        assert_eq!(failure.event, "signature.document.completed");
        assert!(failure.reason.contains("storage unavailable"));
    }

    #[test]
    fn test_dispatch_handler_panic_becomes_failure() {
        let dispatcher = EventDispatcher::new(Box::new(PanickingHandler));

        let failure = dispatcher
            .dispatch(&envelope("signature.document.completed", json!({})))
            .unwrap_err();
        assert!(failure.reason.contains("completion handler exploded"));

        let failure = dispatcher
            .dispatch(&envelope("signature.document.voided", json!({})))
            .unwrap_err();
        assert!(failure.reason.contains("void handler exploded"));
    }

    #[test]
    fn test_logging_handler_tolerates_missing_fields() {
        let dispatcher = EventDispatcher::default();

        for data in [json!({}), json!({"documentId": 42}), json!({"documentId": "doc-9"})] {
            assert!(
                dispatcher
                    .dispatch(&envelope("signature.document.completed", data.clone()))
                    .is_ok()
            );
            assert!(
                dispatcher
                    .dispatch(&envelope("signature.document.voided", data))
                    .is_ok()
            );
        }
    }

    #[test]
    fn test_document_id_defaults_to_unknown() {
        let Value::Object(data) = json!({"documentId": null}) else {
            unreachable!()
        };
        assert_eq!(document_id(&data), "unknown");
    }
}
