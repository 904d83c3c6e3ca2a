//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so a settings file may specify any subset of fields.

mod audio;
mod recognition;
mod telemetry;

pub use audio::*;
pub use recognition::*;
pub use telemetry::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type for the voice search pipeline.
///
/// # JSON Format
///
/// ```json
/// {
///   "recognition": { "instabilityThreshold": 3 },
///   "audio": { "loudness": { "integratedLufs": -18.0 } },
///   "telemetry": { "historyCapacity": 250 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSettings {
    /// Recognition mode selection policy.
    pub recognition: RecognitionSettings,
    /// Audio preprocessing parameters.
    pub audio: AudioSettings,
    /// Outcome telemetry parameters.
    pub telemetry: TelemetrySettings,
    /// Log output configuration.
    pub logging: LoggingSettings,
}

impl VoiceSettings {
    /// Reject values no component can operate with.
    pub fn validate(&self) -> Result<()> {
        if self.recognition.instability_threshold == 0 {
            return Err(SettingsError::invalid(
                "recognition.instabilityThreshold",
                "must be at least 1",
            ));
        }
        if self.audio.target_sample_rate < 8_000 {
            return Err(SettingsError::invalid(
                "audio.targetSampleRate",
                format!("{} Hz is below 8000 Hz", self.audio.target_sample_rate),
            ));
        }
        if self.audio.silence_threshold_db >= 0.0 {
            return Err(SettingsError::invalid(
                "audio.silenceThresholdDb",
                "dBFS threshold must be negative",
            ));
        }
        if self.audio.energy_floor_db >= 0.0 {
            return Err(SettingsError::invalid(
                "audio.energyFloorDb",
                "dBFS floor must be negative",
            ));
        }
        if self.audio.silence_window_ms == 0 {
            return Err(SettingsError::invalid("audio.silenceWindowMs", "must be at least 1"));
        }
        if self.audio.loudness.true_peak_dbtp > 0.0 {
            return Err(SettingsError::invalid(
                "audio.loudness.truePeakDbtp",
                "must not exceed 0 dBTP",
            ));
        }
        if self.telemetry.history_capacity == 0 {
            return Err(SettingsError::invalid("telemetry.historyCapacity", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: VoiceSettings =
            serde_json::from_str(r#"{"recognition": {"instabilityThreshold": 3}}"#).unwrap();
        assert_eq!(settings.recognition.instability_threshold, 3);
        assert!(settings.recognition.retry_with_fallback);
        assert_eq!(settings.audio.target_sample_rate, 16_000);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(VoiceSettings::default()).unwrap();
        assert!(json["recognition"]["instabilityThreshold"].is_number());
        assert!(json["audio"]["loudness"]["truePeakDbtp"].is_number());
        assert!(json["telemetry"]["historyCapacity"].is_number());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut settings = VoiceSettings::default();
        settings.telemetry.history_capacity = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                key: "telemetry.historyCapacity",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_positive_thresholds() {
        let mut settings = VoiceSettings::default();
        settings.audio.silence_threshold_db = 3.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_instability_threshold() {
        let mut settings = VoiceSettings::default();
        settings.recognition.instability_threshold = 0;
        assert!(settings.validate().is_err());
    }
}
