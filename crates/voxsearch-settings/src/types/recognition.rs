//! Recognition mode selection settings.

use serde::{Deserialize, Serialize};

/// Policy knobs for the native/fallback mode selector.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognitionSettings {
    /// Soft failures (`start-failed`, `empty`) needed before the native
    /// provider is demoted.
    pub instability_threshold: u32,
    /// Re-run a gesture through the fallback provider when a native failure
    /// demotes the native provider mid-attempt.
    pub retry_with_fallback: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            instability_threshold: 2,
            retry_with_fallback: true,
        }
    }
}
