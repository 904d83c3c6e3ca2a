//! The speech normalization filter chain, held as data.
//!
//! Order matters: trimming precedes loudness measurement so silence is not
//! measured, and tail trimming is a head trim between two reversals.

use std::fmt;

use tracing::debug;
use voxsearch_settings::AudioSettings;

use crate::loudness::{LoudnessTarget, normalize_loudness};
use crate::resample::resample;
use crate::signal::Signal;
use crate::silence::{reverse, trim_leading_silence};
use crate::types::{AudioError, LoudnessReport};

/// One processing stage.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Average all channels into one.
    Downmix,
    /// Convert to `rate` Hz.
    Resample {
        /// Output sample rate.
        rate: u32,
    },
    /// Drop audio before the first window whose RMS reaches the threshold.
    TrimLeadingSilence {
        /// Silence threshold (dBFS).
        threshold_db: f32,
        /// RMS detection window (ms).
        window_ms: u32,
    },
    /// Reverse frame order.
    Reverse,
    /// Linear gain towards an integrated loudness target.
    LoudnessNormalize(LoudnessTarget),
}

impl Filter {
    fn apply(&self, signal: Signal, report: &mut Option<LoudnessReport>) -> Result<Signal, AudioError> {
        Ok(match self {
            Self::Downmix => downmix(&signal),
            Self::Resample { rate } => resample(&signal, *rate)?,
            Self::TrimLeadingSilence {
                threshold_db,
                window_ms,
            } => trim_leading_silence(&signal, *threshold_db, *window_ms),
            Self::Reverse => reverse(&signal),
            Self::LoudnessNormalize(target) => {
                if signal.is_empty() {
                    return Ok(signal);
                }
                let (out, measured) = normalize_loudness(&signal, target);
                *report = Some(measured);
                out
            }
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downmix => f.write_str("aformat=channel_layouts=mono"),
            Self::Resample { rate } => write!(f, "aresample={rate}"),
            Self::TrimLeadingSilence {
                threshold_db,
                window_ms,
            } => write!(
                f,
                "silenceremove=start_periods=1:start_threshold={threshold_db}dB:window={}",
                f64::from(*window_ms) / 1000.0
            ),
            Self::Reverse => f.write_str("areverse"),
            Self::LoudnessNormalize(t) => write!(
                f,
                "loudnorm=I={}:TP={}:LRA={}:linear=true",
                t.integrated_lufs, t.true_peak_dbtp, t.loudness_range_lu
            ),
        }
    }
}

/// Signal and measurements after running a chain.
#[derive(Clone, Debug)]
pub struct ChainOutput {
    /// Processed signal.
    pub signal: Signal,
    /// Set when a loudness stage ran on non-empty audio.
    pub loudness: Option<LoudnessReport>,
}

/// An ordered list of filters.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    /// Build a chain from explicit stages.
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    /// The speech normalization chain: downmix, resample, trim both ends,
    /// normalize loudness.
    pub fn speech_normalization(settings: &AudioSettings) -> Self {
        let trim = Filter::TrimLeadingSilence {
            threshold_db: settings.silence_threshold_db,
            window_ms: settings.silence_window_ms,
        };
        Self::new(vec![
            Filter::Downmix,
            Filter::Resample {
                rate: settings.target_sample_rate,
            },
            trim.clone(),
            Filter::Reverse,
            trim,
            Filter::Reverse,
            Filter::LoudnessNormalize(LoudnessTarget {
                integrated_lufs: f64::from(settings.loudness.integrated_lufs),
                true_peak_dbtp: f64::from(settings.loudness.true_peak_dbtp),
                loudness_range_lu: f64::from(settings.loudness.loudness_range_lu),
            }),
        ])
    }

    /// Stages in application order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Run every stage in order.
    pub fn apply(&self, input: Signal) -> Result<ChainOutput, AudioError> {
        let mut loudness = None;
        let mut signal = input;
        for filter in &self.filters {
            signal = filter.apply(signal, &mut loudness)?;
            debug!(filter = %filter, frames = signal.frames(), "filter applied");
        }
        Ok(ChainOutput { signal, loudness })
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{filter}")?;
        }
        Ok(())
    }
}

/// Average interleaved channels into a mono signal.
pub fn downmix(signal: &Signal) -> Signal {
    if signal.channels == 1 {
        return signal.clone();
    }
    let channels = signal.channels as f32;
    let samples = signal
        .samples
        .chunks_exact(signal.channels)
        .map(|frame| frame.iter().sum::<f32>() / channels)
        .collect();
    Signal::new(samples, 1, signal.sample_rate)
}
