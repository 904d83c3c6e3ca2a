//! Audio preprocessing settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Parameters for the fallback-path audio normalization chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioSettings {
    /// Output sample rate expected by the transcription service.
    pub target_sample_rate: u32,
    /// Level below which leading/trailing audio is trimmed as silence (dBFS).
    pub silence_threshold_db: f32,
    /// RMS window used by silence detection, in milliseconds.
    pub silence_window_ms: u32,
    /// Peak level above which a raw clip counts as containing energy (dBFS).
    pub energy_floor_db: f32,
    /// Loudness normalization targets.
    pub loudness: LoudnessSettings,
    /// Base directory for the codec engine scratch space. System temp dir
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            target_sample_rate: 16_000,
            silence_threshold_db: -40.0,
            silence_window_ms: 20,
            energy_floor_db: -50.0,
            loudness: LoudnessSettings::default(),
            scratch_dir: None,
        }
    }
}

/// EBU R128 loudness normalization targets.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoudnessSettings {
    /// Target integrated loudness (LUFS).
    pub integrated_lufs: f32,
    /// True-peak ceiling (dBTP).
    pub true_peak_dbtp: f32,
    /// Loudness range target (LU).
    pub loudness_range_lu: f32,
}

impl Default for LoudnessSettings {
    fn default() -> Self {
        Self {
            integrated_lufs: -16.0,
            true_peak_dbtp: -1.0,
            loudness_range_lu: 11.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dir_omitted_when_unset() {
        let json = serde_json::to_value(AudioSettings::default()).unwrap();
        assert!(json.get("scratchDir").is_none());
    }

    #[test]
    fn scratch_dir_round_trips() {
        let settings: AudioSettings =
            serde_json::from_str(r#"{"scratchDir": "/var/tmp/voxsearch"}"#).unwrap();
        assert_eq!(
            settings.scratch_dir.as_deref(),
            Some(std::path::Path::new("/var/tmp/voxsearch"))
        );
    }
}
