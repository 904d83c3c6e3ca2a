//! # voxsearch-audio
//!
//! Audio preprocessing for the fallback recognition path: turns a captured
//! clip in any supported container into mono 16 kHz PCM WAV that has been
//! silence-trimmed at both ends and loudness-normalized.
//!
//! # Pipeline
//!
//! ```text
//! clip bytes → input slot → symphonia decode → downmix → rubato resample
//! → trim head → reverse → trim head → reverse → EBU R128 loudness gain
//! → hound WAV → output slot → bytes
//! ```
//!
//! The codec engine (scratch filesystem + slots) is loaded lazily and
//! shared; see [`AudioPreprocessor`].

#![deny(unsafe_code)]

pub mod chain;
pub mod decode;
pub mod engine;
pub mod loudness;
pub mod preprocessor;
pub mod resample;
pub mod signal;
pub mod silence;
pub mod types;
pub mod wav;

pub use chain::{Filter, FilterChain};
pub use engine::{CodecEngine, EngineLoader, ScratchDirLoader};
pub use preprocessor::AudioPreprocessor;
pub use signal::Signal;
pub use types::{AudioClip, AudioError, LoudnessReport, NormalizeOutcome, NormalizedClip};
