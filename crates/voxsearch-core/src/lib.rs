//! # voxsearch-core
//!
//! Foundation types shared by every stage of the voice search pipeline.
//!
//! - **Providers and outcomes**: [`Provider`], [`Outcome`] as closed enums with
//!   stable wire names (`native`, `no_speech`, ...)
//! - **Failure reasons**: [`FailureReason`], the open enumeration of terminal
//!   causes reported by recognition providers
//! - **Metrics**: [`VoiceMetric`], the fixed set of SLO counter names
//! - **Environment**: [`BrowserFamily`] and [`Platform`] classifications
//! - **IDs**: [`AttemptId`] for correlating log lines of one voice gesture
//! - **Logging**: subscriber bootstrap and in-memory capture for tests

#![deny(unsafe_code)]

pub mod ids;
pub mod logging;
pub mod metric;
pub mod reason;
pub mod types;

pub use ids::AttemptId;
pub use metric::VoiceMetric;
pub use reason::FailureReason;
pub use types::{BrowserFamily, Outcome, Platform, Provider};
