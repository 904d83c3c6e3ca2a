//! Core types for the audio preprocessing engine.

use std::time::Duration;

use voxsearch_core::VoiceMetric;

/// A raw captured clip in whatever container the capture layer produced.
#[derive(Clone, Debug)]
pub struct AudioClip {
    /// Encoded bytes (WAV, M4A/AAC, MP3, OGG, FLAC...).
    pub bytes: Vec<u8>,
    /// MIME type reported by the capture layer, used as a probe hint.
    pub mime_type: String,
}

impl AudioClip {
    /// Wrap encoded bytes with their MIME type.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// MIME type without parameters, lowercased (`audio/ogg;codecs=opus`
    /// becomes `audio/ogg`).
    pub fn essence(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// File extension used for the engine's input slot.
    pub fn extension(&self) -> &'static str {
        match self.essence().as_str() {
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => "wav",
            "audio/m4a" | "audio/mp4" | "audio/x-m4a" | "audio/aac" => "m4a",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/ogg" => "ogg",
            "audio/flac" | "audio/x-flac" => "flac",
            "audio/webm" => "webm",
            _ => "bin",
        }
    }
}

/// Loudness measurements taken during normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoudnessReport {
    /// Integrated loudness before gain (LUFS). `-inf` when every block was gated.
    pub input_lufs: f64,
    /// Integrated loudness after gain (LUFS).
    pub output_lufs: f64,
    /// Loudness range of the input (LU).
    pub input_range_lu: f64,
    /// True peak before gain (dBTP).
    pub input_true_peak_dbtp: f64,
    /// Gain applied (dB).
    pub gain_db: f64,
}

/// A normalized clip ready for a transcription service: mono, resampled,
/// trimmed, loudness-normalized, encoded as 16-bit PCM WAV.
#[derive(Clone, Debug)]
pub struct NormalizedClip {
    /// WAV container bytes.
    pub wav: Vec<u8>,
    /// Output sample rate (Hz).
    pub sample_rate: u32,
    /// Number of frames in the WAV payload (one sample each once downmixed).
    pub sample_count: usize,
    /// Peak level of the decoded input before any processing (dBFS).
    pub input_peak_dbfs: f32,
    /// Loudness measurements, when the chain includes a loudness stage.
    pub loudness: Option<LoudnessReport>,
    /// Rendered filter chain that produced the clip.
    pub filter_graph: String,
}

impl NormalizedClip {
    /// Playback duration of the normalized audio.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.sample_count as f64 / f64::from(self.sample_rate.max(1)))
    }
}

/// Result of a successful normalization call.
#[derive(Clone, Debug)]
pub enum NormalizeOutcome {
    /// The clip contained audio above the silence threshold.
    Normalized(NormalizedClip),
    /// Nothing was left after silence trimming. Not a failure: the caller
    /// classifies this as no speech.
    Empty {
        /// Peak level of the decoded input (dBFS), for energy detection.
        input_peak_dbfs: f32,
    },
}

impl NormalizeOutcome {
    /// Peak level of the decoded input (dBFS).
    pub fn input_peak_dbfs(&self) -> f32 {
        match self {
            Self::Normalized(clip) => clip.input_peak_dbfs,
            Self::Empty { input_peak_dbfs } => *input_peak_dbfs,
        }
    }

    /// Whether the input peak exceeded `floor_db`.
    pub fn energy_detected(&self, floor_db: f32) -> bool {
        self.input_peak_dbfs() > floor_db
    }
}

/// Errors that can occur during preprocessing.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The codec engine could not be loaded.
    #[error("codec engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Input could not be probed or decoded.
    #[error("audio decode error: {0}")]
    Decode(String),

    /// Resampling failure.
    #[error("resample error: {0}")]
    Resample(String),

    /// WAV encoding failure.
    #[error("wav encode error: {0}")]
    Encode(String),

    /// Engine scratch storage I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking worker running the chain panicked or was cancelled.
    #[error("processing task failed: {0}")]
    Task(String),
}

impl AudioError {
    /// Coarse counter a caller should bump for this failure.
    pub fn metric(&self) -> VoiceMetric {
        match self {
            Self::EngineUnavailable(_) | Self::Io(_) | Self::Task(_) => {
                VoiceMetric::ModelUnavailable
            }
            Self::Decode(_) | Self::Resample(_) | Self::Encode(_) => VoiceMetric::InvalidAudio,
        }
    }
}

/// Extension trait for mapping arbitrary errors into [`AudioError`] variants.
pub(crate) trait ResultExt<T> {
    /// Map the error into [`AudioError::Decode`] with context.
    fn decode(self, context: &str) -> Result<T, AudioError>;
    /// Map the error into [`AudioError::Resample`] with context.
    fn resample(self, context: &str) -> Result<T, AudioError>;
    /// Map the error into [`AudioError::Encode`] with context.
    fn encode(self, context: &str) -> Result<T, AudioError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn decode(self, context: &str) -> Result<T, AudioError> {
        self.map_err(|e| AudioError::Decode(format!("{context}: {e}")))
    }

    fn resample(self, context: &str) -> Result<T, AudioError> {
        self.map_err(|e| AudioError::Resample(format!("{context}: {e}")))
    }

    fn encode(self, context: &str) -> Result<T, AudioError> {
        self.map_err(|e| AudioError::Encode(format!("{context}: {e}")))
    }
}
