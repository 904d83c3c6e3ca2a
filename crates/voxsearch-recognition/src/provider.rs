//! Collaborators the attempt orchestration talks to.
//!
//! Implementations live with the host (browser bridge, device APIs, HTTP
//! clients). Every call receives the attempt's cancellation token; capture
//! implementations must release the microphone when it fires or when their
//! future is dropped.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use voxsearch_audio::{AudioClip, NormalizedClip};
use voxsearch_core::FailureReason;

/// Text produced by the native recognizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeTranscript {
    /// Raw transcript, before vocabulary normalization.
    pub text: String,
    /// The microphone level rose above the energy floor during capture.
    pub energy_detected: bool,
}

/// A native recognition that ended without text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeFailure {
    /// Terminal reason reported by the recognizer.
    pub reason: FailureReason,
    /// The microphone level rose above the energy floor during capture.
    pub energy_detected: bool,
}

impl NativeFailure {
    /// Failure with no energy observed.
    pub fn new(reason: FailureReason) -> Self {
        Self {
            reason,
            energy_detected: false,
        }
    }
}

/// On-device speech recognition.
#[async_trait]
pub trait NativeRecognizer: Send + Sync {
    /// Whether the runtime exposes a recognizer at all.
    fn is_supported(&self) -> bool;

    /// Listen for one utterance.
    async fn recognize(
        &self,
        cancel: &CancellationToken,
    ) -> Result<NativeTranscript, NativeFailure>;
}

/// Raw microphone capture for the fallback path.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Whether raw capture is possible in this runtime.
    fn is_supported(&self) -> bool {
        true
    }

    /// Record one clip. Permission refusal is reported as
    /// [`FailureReason::NotAllowed`].
    async fn capture(&self, cancel: &CancellationToken) -> Result<AudioClip, FailureReason>;
}

/// External transcription of a normalized clip.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Transcribe `clip`, or report a terminal reason such as `network`.
    async fn transcribe(&self, clip: &NormalizedClip) -> Result<String, FailureReason>;
}

/// Receives the final query.
#[async_trait]
pub trait SearchSink: Send + Sync {
    /// Run a search for `query`. Fire-and-forget from the pipeline's view.
    async fn submit(&self, query: &str);
}
