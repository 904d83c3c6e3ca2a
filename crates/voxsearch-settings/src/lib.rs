//! # voxsearch-settings
//!
//! Configuration for the voice search pipeline, loaded from three layers
//! (in priority order):
//! 1. **Compiled defaults**: [`VoiceSettings::default()`]
//! 2. **User file**: `~/.voxsearch/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `VOXSEARCH_*` overrides (highest priority)
//!
//! Unlike a process-wide singleton, the loaded [`VoiceSettings`] value is
//! handed to the composition root, which passes each section to the
//! component that owns it.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = VoiceSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.recognition.instability_threshold, 2);
        assert_eq!(settings.audio.target_sample_rate, 16_000);
        assert!((settings.audio.silence_threshold_db - -40.0).abs() < f32::EPSILON);
        assert!((settings.audio.loudness.integrated_lufs - -16.0).abs() < f32::EPSILON);
        assert!((settings.audio.loudness.true_peak_dbtp - -1.0).abs() < f32::EPSILON);
        assert!((settings.audio.loudness.loudness_range_lu - 11.0).abs() < f32::EPSILON);
        assert_eq!(settings.telemetry.history_capacity, 100);
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }
}
