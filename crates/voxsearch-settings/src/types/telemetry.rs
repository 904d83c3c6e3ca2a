//! Telemetry and logging settings.

use serde::{Deserialize, Serialize};

/// Outcome telemetry recorder settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetrySettings {
    /// Most recent outcome events kept in memory.
    pub history_capacity: usize,
    /// Mirror events and counter increments to the diagnostic log.
    pub diagnostic_log: bool,
    /// Mirror counter increments to the `metrics` facade.
    pub export_metrics: bool,
    /// Fixed browser identification string. Probed from the process
    /// environment when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    /// Fixed platform identification string. Probed from the process
    /// environment when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            diagnostic_log: cfg!(debug_assertions),
            export_metrics: false,
            browser: None,
            platform: None,
        }
    }
}

/// Log output configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level filter; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl LoggingSettings {
    /// Install the global tracing subscriber described by these settings.
    /// Later calls are no-ops once a subscriber is set.
    pub fn init(&self) {
        voxsearch_core::logging::init_logging(&self.level, self.json);
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}
