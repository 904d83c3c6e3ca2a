//! Closed set of voice metric names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counter names tracked for voice SLOs.
///
/// The set is fixed at compile time; counters for every variant exist from
/// process start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoiceMetric {
    /// `voice.success`
    #[serde(rename = "voice.success")]
    Success,
    /// `voice.no_speech`
    #[serde(rename = "voice.no_speech")]
    NoSpeech,
    /// `voice.denied`
    #[serde(rename = "voice.denied")]
    Denied,
    /// `voice.invalid_audio`
    #[serde(rename = "voice.invalid_audio")]
    InvalidAudio,
    /// `voice.model_unavailable`
    #[serde(rename = "voice.model_unavailable")]
    ModelUnavailable,
    /// `voice.suspected_false_no_speech`
    #[serde(rename = "voice.suspected_false_no_speech")]
    SuspectedFalseNoSpeech,
}

impl VoiceMetric {
    /// Every metric, in index order.
    pub const ALL: [Self; 6] = [
        Self::Success,
        Self::NoSpeech,
        Self::Denied,
        Self::InvalidAudio,
        Self::ModelUnavailable,
        Self::SuspectedFalseNoSpeech,
    ];

    /// Dotted metric name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "voice.success",
            Self::NoSpeech => "voice.no_speech",
            Self::Denied => "voice.denied",
            Self::InvalidAudio => "voice.invalid_audio",
            Self::ModelUnavailable => "voice.model_unavailable",
            Self::SuspectedFalseNoSpeech => "voice.suspected_false_no_speech",
        }
    }

    /// Position in [`Self::ALL`]; stable array index for counter storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a metric by its dotted name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

impl fmt::Display for VoiceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
