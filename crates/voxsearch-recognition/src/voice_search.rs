//! One voice search gesture, end to end.
//!
//! ```text
//! resolve mode → native recognize ─┬─ transcript ─→ normalize text → search
//!                                  └─ failure → instability → (retry via fallback)
//!              → fallback capture → preprocess → transcribe ─┘
//!                                                    every path → telemetry
//! ```

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use voxsearch_audio::{AudioError, AudioPreprocessor, NormalizeOutcome};
use voxsearch_core::{AttemptId, FailureReason, Outcome, Provider};
use voxsearch_settings::VoiceSettings;
use voxsearch_telemetry::{OutcomeReport, TelemetryRecorder, VoiceOutcomeEvent};
use voxsearch_transcript::TranscriptNormalizer;

use crate::mode::{InstabilityTracker, ModeInputs, resolve_mode};
use crate::provider::{
    AudioCapture, NativeFailure, NativeRecognizer, SearchSink, TranscriptionService,
};

/// What happened during one gesture.
#[derive(Clone, Debug)]
pub struct AttemptReport {
    /// Correlates the log lines of this gesture.
    pub attempt_id: AttemptId,
    /// Provider that produced the final result.
    pub provider: Provider,
    /// Classified outcome.
    pub outcome: Outcome,
    /// Normalized query sent to search, on success.
    pub query: Option<String>,
    /// Terminal reason, when the attempt ended without a query.
    pub reason: Option<FailureReason>,
    /// The native provider failed and the gesture was re-run through the
    /// fallback provider.
    pub retried_with_fallback: bool,
    /// Telemetry event recorded for the gesture.
    pub event: VoiceOutcomeEvent,
}

/// Terminal state of one provider run, before classification.
#[derive(Debug)]
enum Resolution {
    Transcript(String),
    Failed(FailureReason),
    Audio(AudioError),
    Cancelled,
    Unsupported,
}

#[derive(Debug)]
struct ProviderRun {
    provider: Provider,
    resolution: Resolution,
    energy_detected: bool,
}

impl ProviderRun {
    fn new(provider: Provider, resolution: Resolution, energy_detected: bool) -> Self {
        Self {
            provider,
            resolution,
            energy_detected,
        }
    }
}

struct FallbackPath {
    capture: Arc<dyn AudioCapture>,
    transcription: Arc<dyn TranscriptionService>,
}

/// The voice search pipeline: mode selection, recognition, optional audio
/// preprocessing, transcript normalization, search submission and outcome
/// telemetry.
///
/// Shared state across gestures is limited to the instability tracker, the
/// telemetry recorder and the lazily loaded codec engine, all of which
/// tolerate overlapping attempts.
pub struct VoiceSearch {
    native: Option<Arc<dyn NativeRecognizer>>,
    fallback: Option<FallbackPath>,
    preprocessor: Arc<AudioPreprocessor>,
    normalizer: TranscriptNormalizer,
    tracker: InstabilityTracker,
    telemetry: Arc<TelemetryRecorder>,
    search: Arc<dyn SearchSink>,
    retry_with_fallback: bool,
}

impl VoiceSearch {
    /// Pipeline with no providers configured.
    pub fn new(
        settings: &VoiceSettings,
        search: Arc<dyn SearchSink>,
        telemetry: Arc<TelemetryRecorder>,
    ) -> Self {
        Self {
            native: None,
            fallback: None,
            preprocessor: Arc::new(AudioPreprocessor::new(&settings.audio)),
            normalizer: TranscriptNormalizer::new(),
            tracker: InstabilityTracker::from_settings(&settings.recognition),
            telemetry,
            search,
            retry_with_fallback: settings.recognition.retry_with_fallback,
        }
    }

    /// Attach the on-device recognizer.
    #[must_use]
    pub fn with_native(mut self, native: Arc<dyn NativeRecognizer>) -> Self {
        self.native = Some(native);
        self
    }

    /// Attach raw capture and transcription, enabling the fallback provider.
    #[must_use]
    pub fn with_fallback(
        mut self,
        capture: Arc<dyn AudioCapture>,
        transcription: Arc<dyn TranscriptionService>,
    ) -> Self {
        self.fallback = Some(FallbackPath {
            capture,
            transcription,
        });
        self
    }

    /// Replace the audio preprocessor.
    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: Arc<AudioPreprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Replace the transcript normalizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: TranscriptNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Native instability state.
    pub fn tracker(&self) -> &InstabilityTracker {
        &self.tracker
    }

    /// Outcome telemetry.
    pub fn telemetry(&self) -> &Arc<TelemetryRecorder> {
        &self.telemetry
    }

    /// Current mode inputs.
    pub fn mode_inputs(&self) -> ModeInputs {
        ModeInputs {
            native_supported: self.native.as_ref().is_some_and(|n| n.is_supported()),
            native_unstable: self.tracker.is_unstable(),
            fallback_supported: self.fallback_supported(),
        }
    }

    /// Provider the next attempt would use.
    pub fn current_mode(&self) -> Provider {
        resolve_mode(self.mode_inputs())
    }

    fn fallback_supported(&self) -> bool {
        self.fallback
            .as_ref()
            .is_some_and(|f| f.capture.is_supported())
    }

    /// Run one gesture to completion or cancellation.
    ///
    /// Never fails: every ending is classified into an [`Outcome`], recorded
    /// in telemetry and returned.
    pub async fn run_attempt(&self, cancel: CancellationToken) -> AttemptReport {
        let attempt_id = AttemptId::new();
        let span = info_span!("voice_attempt", attempt_id = %attempt_id);
        self.run_attempt_inner(attempt_id, cancel)
            .instrument(span)
            .await
    }

    async fn run_attempt_inner(
        &self,
        attempt_id: AttemptId,
        cancel: CancellationToken,
    ) -> AttemptReport {
        let started = Instant::now();
        let mode = self.current_mode();
        debug!(provider = %mode, "mode resolved");

        let mut retried_with_fallback = false;
        let run = match mode {
            Provider::Native => {
                let run = self.run_native(&cancel).await;
                let demoted = match &run.resolution {
                    Resolution::Failed(reason) => self.tracker.record_failure(reason),
                    _ => false,
                };
                if demoted
                    && self.retry_with_fallback
                    && self.fallback_supported()
                    && !cancel.is_cancelled()
                {
                    info!("retrying through fallback provider");
                    retried_with_fallback = true;
                    self.run_fallback(&cancel).await
                } else {
                    run
                }
            }
            Provider::Fallback => self.run_fallback(&cancel).await,
            Provider::Unsupported => {
                warn!("no recognition provider available");
                ProviderRun::new(Provider::Unsupported, Resolution::Unsupported, false)
            }
        };

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.finish(attempt_id, run, retried_with_fallback, duration_ms)
            .await
    }

    async fn run_native(&self, cancel: &CancellationToken) -> ProviderRun {
        let Some(native) = &self.native else {
            return ProviderRun::new(
                Provider::Native,
                Resolution::Failed(FailureReason::StartFailed),
                false,
            );
        };

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return ProviderRun::new(Provider::Native, Resolution::Cancelled, false);
            }
            result = native.recognize(cancel) => result,
        };

        match result {
            // A recognizer that "succeeds" with nothing is the empty signal
            Ok(t) if t.text.trim().is_empty() => ProviderRun::new(
                Provider::Native,
                Resolution::Failed(FailureReason::Empty),
                t.energy_detected,
            ),
            Ok(t) => ProviderRun::new(
                Provider::Native,
                Resolution::Transcript(t.text),
                t.energy_detected,
            ),
            Err(NativeFailure {
                reason,
                energy_detected,
            }) => {
                debug!(reason = reason.as_str(), "native recognition failed");
                ProviderRun::new(Provider::Native, Resolution::Failed(reason), energy_detected)
            }
        }
    }

    async fn run_fallback(&self, cancel: &CancellationToken) -> ProviderRun {
        let Some(fallback) = &self.fallback else {
            return ProviderRun::new(
                Provider::Fallback,
                Resolution::Failed(FailureReason::StartFailed),
                false,
            );
        };
        let run = |resolution, energy| ProviderRun::new(Provider::Fallback, resolution, energy);

        let captured = tokio::select! {
            biased;
            () = cancel.cancelled() => return run(Resolution::Cancelled, false),
            captured = fallback.capture.capture(cancel) => captured,
        };
        let clip = match captured {
            Ok(clip) => clip,
            Err(reason) => return run(Resolution::Failed(reason), false),
        };

        // Dropping normalize on cancellation still releases the engine slots
        let normalized = tokio::select! {
            biased;
            () = cancel.cancelled() => return run(Resolution::Cancelled, false),
            normalized = self.preprocessor.normalize(clip) => normalized,
        };
        let floor = self.preprocessor.energy_floor_db();
        let clip = match normalized {
            Ok(NormalizeOutcome::Normalized(clip)) => clip,
            Ok(empty @ NormalizeOutcome::Empty { .. }) => {
                return run(
                    Resolution::Failed(FailureReason::Empty),
                    empty.energy_detected(floor),
                );
            }
            Err(e) => return run(Resolution::Audio(e), false),
        };
        let energy = clip.input_peak_dbfs > floor;

        let transcribed = tokio::select! {
            biased;
            () = cancel.cancelled() => return run(Resolution::Cancelled, energy),
            transcribed = fallback.transcription.transcribe(&clip) => transcribed,
        };
        match transcribed {
            Ok(text) if text.trim().is_empty() => {
                run(Resolution::Failed(FailureReason::Empty), energy)
            }
            Ok(text) => run(Resolution::Transcript(text), energy),
            Err(reason) => run(Resolution::Failed(reason), energy),
        }
    }

    async fn finish(
        &self,
        attempt_id: AttemptId,
        run: ProviderRun,
        retried_with_fallback: bool,
        duration_ms: f64,
    ) -> AttemptReport {
        let ProviderRun {
            provider,
            resolution,
            energy_detected,
        } = run;

        let mut query = None;
        let mut report = OutcomeReport::new(provider, Outcome::Error, duration_ms);
        match resolution {
            Resolution::Transcript(raw) => {
                let text = self.normalizer.normalize(&raw);
                if text.is_empty() {
                    report.outcome = Outcome::NoSpeech;
                    report.reason = Some(FailureReason::Empty);
                    report.energy_detected = energy_detected;
                } else {
                    self.search.submit(&text).await;
                    report.outcome = Outcome::Success;
                    report.energy_detected = energy_detected;
                    report.spoken_detected = true;
                    query = Some(text);
                }
            }
            Resolution::Failed(reason) => {
                report.outcome = if reason.is_permission_denied() {
                    Outcome::Denied
                } else if reason.is_silence() {
                    Outcome::NoSpeech
                } else {
                    Outcome::Error
                };
                report.energy_detected = energy_detected;
                report.reason = Some(reason);
            }
            Resolution::Audio(e) => {
                warn!(error = %e, "audio preprocessing failed");
                report.error_metric = Some(e.metric());
            }
            Resolution::Unsupported => {}
            Resolution::Cancelled => {
                report.energy_detected = energy_detected;
                report.reason = Some(FailureReason::Aborted);
            }
        }

        let event = self.telemetry.record_outcome(report);
        info!(
            provider = %event.provider,
            outcome = %event.outcome,
            duration_ms = event.duration_ms,
            retried_with_fallback,
            "voice attempt finished"
        );

        AttemptReport {
            attempt_id,
            provider: event.provider,
            outcome: event.outcome,
            query,
            reason: event.reason.clone(),
            retried_with_fallback,
            event,
        }
    }
}

impl std::fmt::Debug for VoiceSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSearch")
            .field("native", &self.native.is_some())
            .field("fallback", &self.fallback.is_some())
            .field("tracker", &self.tracker)
            .field("retry_with_fallback", &self.retry_with_fallback)
            .finish_non_exhaustive()
    }
}
