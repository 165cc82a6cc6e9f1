use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("turbodocx_webhook_statds")
        .with_description("TurboDocx webhook receiver statistics")
        .with_unit("delivery")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

/// `accepted`, `unauthorized`, `malformed` or `handler_failure`
pub fn incr_delivery_outcome_statds(outcome: &str) {
    incr_statds("delivery_outcome".to_string(), outcome.into())
}

pub fn incr_event_type_statds(event: &str) {
    incr_statds("event_type".to_string(), event.into())
}
