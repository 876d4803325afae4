use serde::Serialize;
use tracing::info;

/// Payload sent when the user picks a glyph from the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEvent {
    pub name: Option<String>,
    pub unicode: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl SelectionEvent {
    pub const EVENT: &'static str = "specimen_select_glyph";
}

/// Fire-and-forget destination for selection events.
///
/// Implementations must return promptly and swallow their own failures;
/// the caller never waits on or inspects the outcome.
pub trait AnalyticsSink {
    fn emit(&self, event: &SelectionEvent);
}

/// Discards every event. Used when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn emit(&self, _event: &SelectionEvent) {}
}

/// Writes events to the log as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn emit(&self, event: &SelectionEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!("{} {}", SelectionEvent::EVENT, json),
            Err(e) => info!("{} (unserializable: {})", SelectionEvent::EVENT, e),
        }
    }
}

impl<F: Fn(&SelectionEvent)> AnalyticsSink for F {
    fn emit(&self, event: &SelectionEvent) {
        self(event)
    }
}
