//! In-memory PCM buffer passed between filter stages, and level helpers.

/// Smallest level reported for digital silence (dBFS).
pub const SILENCE_FLOOR_DB: f32 = -144.0;

/// Interleaved `f32` PCM samples in `[-1.0, 1.0]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signal {
    /// Interleaved samples (`frames * channels` values).
    pub samples: Vec<f32>,
    /// Channel count (≥ 1).
    pub channels: usize,
    /// Sample rate (Hz).
    pub sample_rate: u32,
}

impl Signal {
    /// Wrap interleaved samples.
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            sample_rate,
        }
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Absolute sample peak across all channels (dBFS).
    pub fn peak_dbfs(&self) -> f32 {
        amplitude_to_db(peak(&self.samples))
    }
}

/// Absolute peak of a sample slice.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
}

/// Convert a linear amplitude to dBFS, clamped at [`SILENCE_FLOOR_DB`].
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        return SILENCE_FLOOR_DB;
    }
    (20.0 * amplitude.log10()).max(SILENCE_FLOOR_DB)
}

/// Convert dBFS to a linear amplitude.
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}
