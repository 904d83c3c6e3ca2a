//! # voxsearch-recognition
//!
//! Chooses between the on-device recognizer and the capture-and-transcribe
//! fallback, tracks native instability across attempts, and drives one
//! voice search gesture through the pipeline.
//!
//! - [`resolve_mode`] / [`should_switch_to_fallback`]: pure decisions
//! - [`InstabilityTracker`]: the only cross-attempt recognition state
//! - [`VoiceSearch`]: gesture orchestration over the collaborator traits in
//!   [`provider`]

#![deny(unsafe_code)]

pub mod mode;
pub mod provider;
pub mod voice_search;

pub use mode::{
    DEFAULT_INSTABILITY_THRESHOLD, InstabilitySignal, InstabilityTracker, ModeInputs,
    instability_signal, resolve_mode, should_switch_to_fallback,
};
pub use provider::{
    AudioCapture, NativeFailure, NativeRecognizer, NativeTranscript, SearchSink,
    TranscriptionService,
};
pub use voice_search::{AttemptReport, VoiceSearch};
