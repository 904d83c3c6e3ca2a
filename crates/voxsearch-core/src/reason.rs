//! Terminal failure reasons reported by recognition providers.
//!
//! Providers report why an attempt ended as a free-form string. The pipeline
//! only interprets a fixed set of them; anything else is carried through
//! verbatim as [`FailureReason::Other`] so it still shows up in logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a provider ended an attempt without a transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FailureReason {
    /// The recognizer could not reach its backing service.
    Network,
    /// The environment forbids the speech service (policy, insecure origin).
    ServiceNotAllowed,
    /// The microphone could not be opened or stopped delivering audio.
    AudioCapture,
    /// The recognizer refused to start.
    StartFailed,
    /// The recognizer finished with an empty result.
    Empty,
    /// The recognizer heard nothing it judged to be speech.
    NoSpeech,
    /// The user or the platform denied microphone access.
    NotAllowed,
    /// The attempt was stopped before the provider finished.
    Aborted,
    /// Any reason string outside the recognized set.
    Other(String),
}

impl FailureReason {
    /// Parse a provider reason string. Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "network" => Self::Network,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "audio-capture" => Self::AudioCapture,
            "start-failed" => Self::StartFailed,
            "empty" => Self::Empty,
            "no-speech" => Self::NoSpeech,
            "not-allowed" | "permission-denied" => Self::NotAllowed,
            "aborted" => Self::Aborted,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Wire form of the reason.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Network => "network",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::AudioCapture => "audio-capture",
            Self::StartFailed => "start-failed",
            Self::Empty => "empty",
            Self::NoSpeech => "no-speech",
            Self::NotAllowed => "not-allowed",
            Self::Aborted => "aborted",
            Self::Other(s) => s,
        }
    }

    /// Whether the reason means permission was refused.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::NotAllowed)
    }

    /// Whether the reason means nothing usable was heard.
    #[must_use]
    pub fn is_silence(&self) -> bool {
        matches!(self, Self::NoSpeech | Self::Empty)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FailureReason {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for FailureReason {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<FailureReason> for String {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_known_reasons() {
        assert_eq!(FailureReason::parse("network"), FailureReason::Network);
        assert_eq!(
            FailureReason::parse("service-not-allowed"),
            FailureReason::ServiceNotAllowed
        );
        assert_eq!(FailureReason::parse("audio-capture"), FailureReason::AudioCapture);
        assert_eq!(FailureReason::parse("start-failed"), FailureReason::StartFailed);
        assert_eq!(FailureReason::parse("empty"), FailureReason::Empty);
        assert_eq!(FailureReason::parse("no-speech"), FailureReason::NoSpeech);
    }

    #[test]
    fn permission_aliases_collapse() {
        assert!(FailureReason::parse("not-allowed").is_permission_denied());
        assert!(FailureReason::parse("permission-denied").is_permission_denied());
        assert!(!FailureReason::Network.is_permission_denied());
    }

    #[test]
    fn unknown_reason_is_preserved() {
        let reason = FailureReason::parse("bad-grammar");
        assert_eq!(reason, FailureReason::Other("bad-grammar".into()));
        assert_eq!(reason.to_string(), "bad-grammar");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&FailureReason::StartFailed).unwrap();
        assert_eq!(json, "\"start-failed\"");
        let back: FailureReason = serde_json::from_str("\"no-speech\"").unwrap();
        assert_eq!(back, FailureReason::NoSpeech);
    }

    #[test]
    fn silence_reasons() {
        assert!(FailureReason::NoSpeech.is_silence());
        assert!(FailureReason::Empty.is_silence());
        assert!(!FailureReason::StartFailed.is_silence());
    }

    proptest! {
        #[test]
        fn parse_never_loses_text(raw in "[a-z\\-]{1,24}") {
            let reason = FailureReason::parse(&raw);
            let again = FailureReason::parse(reason.as_str());
            prop_assert_eq!(reason, again);
        }
    }
}
