//! Provider selection and native instability tracking.
//!
//! Mode is recomputed from scratch on every attempt. The only state carried
//! across attempts is the [`InstabilityTracker`].

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tracing::{debug, info};
use voxsearch_core::{FailureReason, Provider};
use voxsearch_settings::RecognitionSettings;

/// Default number of soft failures before the native provider is demoted.
pub const DEFAULT_INSTABILITY_THRESHOLD: u32 = 2;

/// Inputs to [`resolve_mode`], gathered at the start of an attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeInputs {
    /// An on-device recognizer exists in this environment.
    pub native_supported: bool,
    /// The native recognizer has been judged unreliable this session.
    pub native_unstable: bool,
    /// Raw capture plus transcription is available.
    pub fallback_supported: bool,
}

/// Pick the provider for the next attempt. First match wins:
///
/// 1. native, when supported and stable
/// 2. fallback, when available
/// 3. native, when supported at all
/// 4. unsupported
pub fn resolve_mode(inputs: ModeInputs) -> Provider {
    if inputs.native_supported && !inputs.native_unstable {
        Provider::Native
    } else if inputs.fallback_supported {
        Provider::Fallback
    } else if inputs.native_supported {
        Provider::Native
    } else {
        Provider::Unsupported
    }
}

/// How a terminal native reason bears on instability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstabilitySignal {
    /// The native provider cannot work here; one occurrence demotes it.
    Hard,
    /// Counts towards the threshold.
    Soft,
    /// Not a provider fault, or an unrecognized reason.
    None,
}

/// Classify a terminal reason.
pub fn instability_signal(reason: &FailureReason) -> InstabilitySignal {
    match reason {
        FailureReason::Network | FailureReason::ServiceNotAllowed | FailureReason::AudioCapture => {
            InstabilitySignal::Hard
        }
        FailureReason::StartFailed | FailureReason::Empty => InstabilitySignal::Soft,
        FailureReason::NoSpeech
        | FailureReason::NotAllowed
        | FailureReason::Aborted
        | FailureReason::Other(_) => InstabilitySignal::None,
    }
}

/// Whether `reason`, seen with `instability_count` accumulated soft and hard
/// failures, means the native provider should be abandoned.
pub fn should_switch_to_fallback(
    reason: &FailureReason,
    instability_count: u32,
    threshold: u32,
) -> bool {
    match instability_signal(reason) {
        InstabilitySignal::Hard => true,
        InstabilitySignal::Soft => instability_count >= threshold,
        InstabilitySignal::None => false,
    }
}

/// Session-wide instability state of the native provider.
///
/// The count only grows. Once demoted, the native provider stays demoted
/// for the tracker's lifetime. Safe to share across concurrent attempts.
#[derive(Debug)]
pub struct InstabilityTracker {
    count: AtomicU32,
    unstable: AtomicBool,
    threshold: u32,
}

impl InstabilityTracker {
    /// Tracker demoting after `threshold` soft failures (at least one).
    pub fn new(threshold: u32) -> Self {
        Self {
            count: AtomicU32::new(0),
            unstable: AtomicBool::new(false),
            threshold: threshold.max(1),
        }
    }

    /// Tracker using the configured threshold.
    pub fn from_settings(settings: &RecognitionSettings) -> Self {
        Self::new(settings.instability_threshold)
    }

    /// Accumulated instability count.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Whether the native provider has been demoted.
    pub fn is_unstable(&self) -> bool {
        self.unstable.load(Ordering::Acquire)
    }

    /// Soft failures needed for demotion.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Account for a terminal native reason. Returns true when the reason
    /// means the attempt should move to the fallback provider.
    pub fn record_failure(&self, reason: &FailureReason) -> bool {
        let count = match instability_signal(reason) {
            InstabilitySignal::None => {
                debug!(reason = reason.as_str(), "reason does not affect stability");
                return false;
            }
            InstabilitySignal::Hard | InstabilitySignal::Soft => {
                self.count.fetch_add(1, Ordering::AcqRel).saturating_add(1)
            }
        };

        let switch = should_switch_to_fallback(reason, count, self.threshold);
        if switch && !self.unstable.swap(true, Ordering::AcqRel) {
            info!(
                reason = reason.as_str(),
                instability_count = count,
                "native recognizer marked unstable"
            );
        } else {
            debug!(reason = reason.as_str(), instability_count = count, switch, "native failure");
        }
        switch
    }
}

impl Default for InstabilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_INSTABILITY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(native: bool, unstable: bool, fallback: bool) -> ModeInputs {
        ModeInputs {
            native_supported: native,
            native_unstable: unstable,
            fallback_supported: fallback,
        }
    }

    #[test]
    fn decision_table() {
        assert_eq!(resolve_mode(inputs(true, false, true)), Provider::Native);
        assert_eq!(resolve_mode(inputs(true, false, false)), Provider::Native);
        assert_eq!(resolve_mode(inputs(true, true, true)), Provider::Fallback);
        assert_eq!(resolve_mode(inputs(false, false, true)), Provider::Fallback);
        assert_eq!(resolve_mode(inputs(true, true, false)), Provider::Native);
        assert_eq!(resolve_mode(inputs(false, false, false)), Provider::Unsupported);
        assert_eq!(resolve_mode(inputs(false, true, false)), Provider::Unsupported);
    }

    #[test]
    fn hard_reasons_switch_immediately() {
        for reason in [
            FailureReason::Network,
            FailureReason::ServiceNotAllowed,
            FailureReason::AudioCapture,
        ] {
            assert!(should_switch_to_fallback(&reason, 0, 2), "{reason}");
        }
    }

    #[test]
    fn soft_reasons_wait_for_threshold() {
        for reason in [FailureReason::StartFailed, FailureReason::Empty] {
            assert!(!should_switch_to_fallback(&reason, 1, 2));
            assert!(should_switch_to_fallback(&reason, 2, 2));
            assert!(should_switch_to_fallback(&reason, 5, 2));
        }
    }

    #[test]
    fn silence_and_unknown_never_switch() {
        assert!(!should_switch_to_fallback(&FailureReason::NoSpeech, 99, 2));
        assert!(!should_switch_to_fallback(&FailureReason::parse("bad-grammar"), 99, 2));
        assert!(!should_switch_to_fallback(&FailureReason::NotAllowed, 99, 2));
    }

    #[test]
    fn tracker_demotes_after_two_soft_failures() {
        let tracker = InstabilityTracker::default();
        assert!(!tracker.record_failure(&FailureReason::StartFailed));
        assert!(!tracker.is_unstable());
        assert!(tracker.record_failure(&FailureReason::Empty));
        assert!(tracker.is_unstable());
        assert_eq!(tracker.count(), 2);
    }

    #[test]
    fn tracker_ignores_no_speech() {
        let tracker = InstabilityTracker::default();
        for _ in 0..10 {
            assert!(!tracker.record_failure(&FailureReason::NoSpeech));
        }
        assert_eq!(tracker.count(), 0);
        assert!(!tracker.is_unstable());
    }

    #[test]
    fn demotion_is_sticky() {
        let tracker = InstabilityTracker::default();
        assert!(tracker.record_failure(&FailureReason::Network));
        let _ = tracker.record_failure(&FailureReason::NoSpeech);
        assert!(tracker.is_unstable());
    }

    #[test]
    fn threshold_comes_from_settings() {
        let tracker = InstabilityTracker::from_settings(&RecognitionSettings {
            instability_threshold: 3,
            ..RecognitionSettings::default()
        });
        assert_eq!(tracker.threshold(), 3);
        assert!(!tracker.record_failure(&FailureReason::StartFailed));
        assert!(!tracker.record_failure(&FailureReason::StartFailed));
        assert!(tracker.record_failure(&FailureReason::StartFailed));
    }
}
