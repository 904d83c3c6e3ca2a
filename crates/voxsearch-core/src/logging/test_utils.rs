//! In-memory capture of tracing events for assertions in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One captured event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// Level the event was emitted at.
    pub level: Level,
    /// Event target (module path unless overridden).
    pub target: String,
    /// The `message` field.
    pub message: String,
    /// Every other field, rendered as text. Strings are unquoted.
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Value of a recorded field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Shared handle to the captured events.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    /// Every captured event, in emission order.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// First event whose message contains `needle`.
    pub fn find(&self, needle: &str) -> Option<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .find(|e| e.message.contains(needle))
            .cloned()
    }

    /// Whether an event at `level` has a message containing `needle`.
    pub fn has_event(&self, level: Level, needle: &str) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    /// Events whose target starts with `prefix`.
    pub fn events_for_target(&self, prefix: &str) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.target.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[derive(Default)]
struct Fields {
    message: String,
    values: BTreeMap<String, String>,
}

impl Fields {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            let _ = self.values.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let metadata = event.metadata();
        self.logs.events.lock().push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_owned(),
            message: fields.message,
            fields: fields.values,
        });
    }
}

/// Capture every event emitted on the current thread until the returned
/// guard drops.
///
/// Thread-local, so parallel tests do not see each other's events. Works
/// with `#[tokio::test]`'s default current-thread runtime.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let guard = tracing_subscriber::registry()
        .with(CaptureLayer { logs: logs.clone() })
        .with(LevelFilter::TRACE)
        .set_default();
    (logs, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_and_message_match() {
        let (logs, _guard) = capture_logs();
        tracing::debug!("mode resolved");
        tracing::warn!("codec engine load failed");

        assert!(logs.has_event(Level::WARN, "engine load failed"));
        assert!(!logs.has_event(Level::INFO, "mode resolved"));
    }

    #[test]
    fn target_prefix_filters() {
        let (logs, _guard) = capture_logs();
        tracing::info!(target: "voxsearch::telemetry", "voice outcome");
        tracing::info!(target: "voxsearch_audio::engine", "codec engine ready");

        let telemetry = logs.events_for_target("voxsearch::telemetry");
        assert_eq!(telemetry.len(), 1);
        assert_eq!(telemetry[0].message, "voice outcome");
    }

    #[test]
    fn fields_render_as_text() {
        let (logs, _guard) = capture_logs();
        tracing::info!(
            provider = "native",
            duration_ms = 1200_u64,
            energy_detected = true,
            "attempt done"
        );

        let event = logs.find("attempt done").unwrap();
        assert_eq!(event.field("provider"), Some("native"));
        assert_eq!(event.field("duration_ms"), Some("1200"));
        assert_eq!(event.field("energy_detected"), Some("true"));
        assert_eq!(event.field("missing"), None);
    }

    #[test]
    fn clear_discards_events() {
        let (logs, _guard) = capture_logs();
        tracing::info!("first");
        logs.clear();
        assert!(logs.events().is_empty());
        assert!(logs.find("first").is_none());
    }
}
