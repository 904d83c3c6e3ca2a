//! Where recorded outcomes and counter increments are mirrored.

use tracing::info;
use voxsearch_core::VoiceMetric;
use voxsearch_core::logging::TELEMETRY_TARGET;

use crate::event::VoiceOutcomeEvent;

/// Observer of recorded telemetry. Sinks must not block.
pub trait TelemetrySink: Send + Sync {
    /// An outcome event was appended to history.
    fn on_event(&self, event: &VoiceOutcomeEvent);

    /// `metric` was incremented to `count`.
    fn on_metric(&self, metric: VoiceMetric, count: u64);
}

/// Mirrors telemetry to the diagnostic log under [`TELEMETRY_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn on_event(&self, event: &VoiceOutcomeEvent) {
        info!(
            target: TELEMETRY_TARGET,
            provider = %event.provider,
            outcome = %event.outcome,
            energy_detected = event.energy_detected,
            spoken_detected = event.spoken_detected,
            duration_ms = event.duration_ms,
            browser = %event.browser_family,
            platform = %event.platform,
            reason = event.reason.as_ref().map(voxsearch_core::FailureReason::as_str),
            "voice outcome"
        );
    }

    fn on_metric(&self, metric: VoiceMetric, count: u64) {
        info!(target: TELEMETRY_TARGET, metric = %metric, count, "voice metric");
    }
}

/// Counter name used on the `metrics` facade.
pub const VOICE_EVENTS_COUNTER: &str = "voice_events_total";

/// Forwards counter increments to the `metrics` facade as
/// `voice_events_total{metric="voice.*"}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MetricsSink;

impl TelemetrySink for MetricsSink {
    fn on_event(&self, _event: &VoiceOutcomeEvent) {}

    fn on_metric(&self, metric: VoiceMetric, _count: u64) {
        metrics::counter!(VOICE_EVENTS_COUNTER, "metric" => metric.name()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use voxsearch_core::logging::capture_logs;
    use voxsearch_core::{BrowserFamily, Outcome, Platform, Provider};

    use super::*;

    fn event() -> VoiceOutcomeEvent {
        VoiceOutcomeEvent {
            provider: Provider::Native,
            outcome: Outcome::Success,
            energy_detected: true,
            spoken_detected: true,
            duration_ms: 812,
            browser_family: BrowserFamily::Chrome,
            platform: Platform::Windows,
            timestamp_ms: 0,
            reason: None,
        }
    }

    #[test]
    fn tracing_sink_logs_under_telemetry_target() {
        let (logs, _guard) = capture_logs();
        TracingSink.on_event(&event());
        TracingSink.on_metric(VoiceMetric::Success, 3);

        let events = logs.events_for_target(TELEMETRY_TARGET);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].field("outcome"), Some("success"));
        assert_eq!(events[0].field("browser"), Some("chrome"));
        assert_eq!(events[1].field("metric"), Some("voice.success"));
        assert_eq!(events[1].field("count"), Some("3"));
    }

    #[test]
    fn metrics_sink_increments_labelled_counter() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            MetricsSink.on_metric(VoiceMetric::NoSpeech, 1);
            MetricsSink.on_metric(VoiceMetric::NoSpeech, 2);
            MetricsSink.on_metric(VoiceMetric::Denied, 1);
        });

        let rendered = handle.render();
        assert!(
            rendered.contains(r#"voice_events_total{metric="voice.no_speech"} 2"#),
            "{rendered}"
        );
        assert!(
            rendered.contains(r#"voice_events_total{metric="voice.denied"} 1"#),
            "{rendered}"
        );
    }
}
