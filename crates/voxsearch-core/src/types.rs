//! Closed enumerations shared across the pipeline.
//!
//! All wire names are `snake_case` / lowercase so telemetry events serialize
//! to the same strings the dashboards key on (`native`, `no_speech`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Recognition path chosen for an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// On-device recognizer; produces text directly, no audio upload.
    Native,
    /// Raw capture, normalization, then an external transcription service.
    Fallback,
    /// Neither path is available in this environment.
    Unsupported,
}

impl Provider {
    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Fallback => "fallback",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Classified result of one completed voice attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A non-empty transcript reached search.
    Success,
    /// The provider reported silence, or produced nothing usable.
    NoSpeech,
    /// Microphone or speech permission was refused.
    Denied,
    /// Any other terminal failure.
    Error,
}

impl Outcome {
    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoSpeech => "no_speech",
            Self::Denied => "denied",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment classification
// ─────────────────────────────────────────────────────────────────────────────

/// Browser family derived from the runtime's identification string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFamily {
    /// Chromium-based Microsoft Edge.
    Edge,
    /// Opera (Chromium-based).
    Opera,
    /// Samsung Internet.
    Samsung,
    /// Google Chrome and other Chromium shells.
    Chrome,
    /// Mozilla Firefox.
    Firefox,
    /// Apple Safari / `WebKit`.
    Safari,
    /// No pattern matched.
    Unknown,
}

impl BrowserFamily {
    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Opera => "opera",
            Self::Samsung => "samsung",
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating platform derived from the runtime's identification strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iPhone / iPad.
    Ios,
    /// Android phones and tablets.
    Android,
    /// Desktop macOS.
    Macos,
    /// Desktop Windows.
    Windows,
    /// Desktop Linux and Chrome OS.
    Linux,
    /// No pattern matched.
    Unknown,
}

impl Platform {
    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_wire_names() {
        assert_eq!(serde_json::to_string(&Outcome::NoSpeech).unwrap(), "\"no_speech\"");
        assert_eq!(serde_json::to_string(&Outcome::Success).unwrap(), "\"success\"");
        assert_eq!(Outcome::Denied.to_string(), "denied");
    }

    #[test]
    fn provider_wire_names_match_display() {
        for p in [Provider::Native, Provider::Fallback, Provider::Unsupported] {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{p}\""));
        }
    }

    #[test]
    fn environment_wire_names_match_display() {
        for b in [
            BrowserFamily::Edge,
            BrowserFamily::Opera,
            BrowserFamily::Samsung,
            BrowserFamily::Chrome,
            BrowserFamily::Firefox,
            BrowserFamily::Safari,
            BrowserFamily::Unknown,
        ] {
            assert_eq!(serde_json::to_string(&b).unwrap(), format!("\"{b}\""));
        }
        for p in [
            Platform::Ios,
            Platform::Android,
            Platform::Macos,
            Platform::Windows,
            Platform::Linux,
            Platform::Unknown,
        ] {
            assert_eq!(serde_json::to_string(&p).unwrap(), format!("\"{p}\""));
        }
    }
}
