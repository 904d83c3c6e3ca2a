//! Outcome event types.

use serde::{Deserialize, Serialize};
use voxsearch_core::{BrowserFamily, FailureReason, Outcome, Platform, Provider, VoiceMetric};

/// What a caller reports when an attempt resolves.
#[derive(Clone, Debug, PartialEq)]
pub struct OutcomeReport {
    /// Provider that handled the attempt.
    pub provider: Provider,
    /// Classified outcome.
    pub outcome: Outcome,
    /// Raw audio peaked above the energy floor.
    pub energy_detected: bool,
    /// Some provider judged speech present.
    pub spoken_detected: bool,
    /// Elapsed time in milliseconds. Any value is accepted; it is clamped.
    pub duration_ms: f64,
    /// Terminal reason from the provider, if any.
    pub reason: Option<FailureReason>,
    /// Coarse counter for an `error` outcome (`voice.invalid_audio` or
    /// `voice.model_unavailable`). Ignored for other outcomes.
    pub error_metric: Option<VoiceMetric>,
}

impl OutcomeReport {
    /// Report with no energy, no speech and no reason.
    pub fn new(provider: Provider, outcome: Outcome, duration_ms: f64) -> Self {
        Self {
            provider,
            outcome,
            energy_detected: false,
            spoken_detected: false,
            duration_ms,
            reason: None,
            error_metric: None,
        }
    }

    /// Set the energy and speech detection flags.
    #[must_use]
    pub fn with_detection(mut self, energy_detected: bool, spoken_detected: bool) -> Self {
        self.energy_detected = energy_detected;
        self.spoken_detected = spoken_detected;
        self
    }

    /// Attach the provider's terminal reason.
    #[must_use]
    pub fn with_reason(mut self, reason: FailureReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Attach the coarse error counter.
    #[must_use]
    pub fn with_error_metric(mut self, metric: VoiceMetric) -> Self {
        self.error_metric = Some(metric);
        self
    }

    /// Coarse counter this report maps to, if any.
    pub fn coarse_metric(&self) -> Option<VoiceMetric> {
        match self.outcome {
            Outcome::Success => Some(VoiceMetric::Success),
            Outcome::NoSpeech => Some(VoiceMetric::NoSpeech),
            Outcome::Denied => Some(VoiceMetric::Denied),
            Outcome::Error => self.error_metric.filter(|m| {
                matches!(m, VoiceMetric::InvalidAudio | VoiceMetric::ModelUnavailable)
            }),
        }
    }

    /// Whether this report is the suspected-false-no-speech signal.
    pub fn is_suspected_false_no_speech(&self) -> bool {
        self.outcome == Outcome::NoSpeech && self.energy_detected
    }
}

/// An enriched, timestamped outcome as retained in history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOutcomeEvent {
    /// Provider that handled the attempt.
    pub provider: Provider,
    /// Classified outcome.
    pub outcome: Outcome,
    /// Raw audio peaked above the energy floor.
    pub energy_detected: bool,
    /// Some provider judged speech present.
    pub spoken_detected: bool,
    /// Non-negative, rounded elapsed time.
    pub duration_ms: u64,
    /// Browser family at record time.
    pub browser_family: BrowserFamily,
    /// Platform at record time.
    pub platform: Platform,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Terminal reason from the provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

/// Clamp a duration to a non-negative whole number of milliseconds.
///
/// NaN and negative values become 0; values past `u64::MAX` saturate.
pub fn clamp_duration_ms(duration_ms: f64) -> u64 {
    if duration_ms.is_nan() || duration_ms <= 0.0 {
        return 0;
    }
    duration_ms.round() as u64
}
