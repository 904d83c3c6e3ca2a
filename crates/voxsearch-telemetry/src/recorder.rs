//! The outcome telemetry recorder.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use voxsearch_core::VoiceMetric;
use voxsearch_settings::TelemetrySettings;

use crate::counters::VoiceMetricCounters;
use crate::environment::{EnvironmentProbe, ProcessEnvironment, StaticEnvironment};
use crate::event::{OutcomeReport, VoiceOutcomeEvent, clamp_duration_ms};
use crate::history::OutcomeHistory;
use crate::sink::{MetricsSink, TelemetrySink, TracingSink};

/// Owns the SLO counters and the outcome history for one process.
///
/// Both the detailed path ([`Self::record_outcome`]) and the coarse path
/// ([`Self::increment_voice_metric`]) write the same counters. Recording
/// never fails and never blocks on anything but short uncontended locks.
pub struct TelemetryRecorder {
    counters: VoiceMetricCounters,
    history: OutcomeHistory,
    probe: Arc<dyn EnvironmentProbe>,
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl TelemetryRecorder {
    /// Recorder configured from settings.
    ///
    /// Fixed identification strings in `settings` take precedence over the
    /// process environment. Sinks are attached per the `diagnostic_log` and
    /// `export_metrics` flags.
    pub fn new(settings: &TelemetrySettings) -> Self {
        let probe: Arc<dyn EnvironmentProbe> =
            if settings.browser.is_some() || settings.platform.is_some() {
                Arc::new(StaticEnvironment::new(
                    settings.browser.clone(),
                    settings.platform.clone(),
                ))
            } else {
                Arc::new(ProcessEnvironment)
            };

        let mut recorder = Self::with_probe(settings.history_capacity, probe);
        if settings.diagnostic_log {
            recorder = recorder.with_sink(Arc::new(TracingSink));
        }
        if settings.export_metrics {
            recorder = recorder.with_sink(Arc::new(MetricsSink));
        }
        recorder
    }

    /// Recorder with an explicit probe and no sinks.
    pub fn with_probe(history_capacity: usize, probe: Arc<dyn EnvironmentProbe>) -> Self {
        Self {
            counters: VoiceMetricCounters::new(),
            history: OutcomeHistory::new(history_capacity),
            probe,
            sinks: Vec::new(),
        }
    }

    /// Attach a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Record one completed attempt and return the enriched event.
    ///
    /// The duration is clamped, the environment is probed now, the event is
    /// appended to history, and the matching coarse counter is incremented.
    /// A `no_speech` outcome with detected energy also increments
    /// `voice.suspected_false_no_speech`.
    pub fn record_outcome(&self, report: OutcomeReport) -> VoiceOutcomeEvent {
        let coarse = report.coarse_metric();
        let suspected = report.is_suspected_false_no_speech();

        let event = VoiceOutcomeEvent {
            provider: report.provider,
            outcome: report.outcome,
            energy_detected: report.energy_detected,
            spoken_detected: report.spoken_detected,
            duration_ms: clamp_duration_ms(report.duration_ms),
            browser_family: self.probe.browser_family(),
            platform: self.probe.platform(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            reason: report.reason,
        };

        if let Some(evicted) = self.history.push(event.clone()) {
            debug!(timestamp_ms = evicted.timestamp_ms, "outcome history full, evicted oldest");
        }
        for sink in &self.sinks {
            sink.on_event(&event);
        }

        if let Some(metric) = coarse {
            let _ = self.increment_voice_metric(metric);
        }
        if suspected {
            let _ = self.increment_voice_metric(VoiceMetric::SuspectedFalseNoSpeech);
        }

        event
    }

    /// Increment a counter without recording an outcome event. Returns the
    /// new count.
    pub fn increment_voice_metric(&self, metric: VoiceMetric) -> u64 {
        let count = self.counters.increment(metric);
        for sink in &self.sinks {
            sink.on_metric(metric, count);
        }
        count
    }

    /// Current count for `metric`.
    pub fn count(&self, metric: VoiceMetric) -> u64 {
        self.counters.get(metric)
    }

    /// Every counter by dotted name.
    pub fn counters(&self) -> BTreeMap<&'static str, u64> {
        self.counters.snapshot()
    }

    /// Retained outcome events, oldest first.
    pub fn history(&self) -> Vec<VoiceOutcomeEvent> {
        self.history.snapshot()
    }

    /// Ring capacity.
    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new(&TelemetrySettings::default())
    }
}

impl std::fmt::Debug for TelemetryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRecorder")
            .field("counters", &self.counters)
            .field("history_len", &self.history.len())
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}
