//! # voxsearch-telemetry
//!
//! Outcome telemetry for voice attempts: SLO counters, a bounded history of
//! enriched outcome events, and fire-and-forget sinks.
//!
//! - [`TelemetryRecorder`]: the single entry point; detailed and coarse
//!   recording share one counter registry
//! - [`VoiceMetricCounters`]: lock-free counters over the closed metric set
//! - [`OutcomeHistory`]: FIFO ring of the most recent events
//! - [`EnvironmentProbe`]: browser family and platform classification
//! - [`TelemetrySink`]: diagnostic log and `metrics` facade mirrors

#![deny(unsafe_code)]

pub mod counters;
pub mod environment;
pub mod event;
pub mod history;
pub mod recorder;
pub mod sink;

pub use counters::VoiceMetricCounters;
pub use environment::{
    EnvironmentProbe, ProcessEnvironment, StaticEnvironment, classify_browser, classify_platform,
};
pub use event::{OutcomeReport, VoiceOutcomeEvent, clamp_duration_ms};
pub use history::{DEFAULT_HISTORY_CAPACITY, OutcomeHistory};
pub use recorder::TelemetryRecorder;
pub use sink::{MetricsSink, TelemetrySink, TracingSink};
