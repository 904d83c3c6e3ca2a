//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Why settings could not be produced.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON, or a value has the wrong type.
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Compiled defaults failed to round-trip through JSON.
    #[error("settings defaults: {0}")]
    Defaults(#[from] serde_json::Error),

    /// A value no component can operate with.
    #[error("{key}: {reason}")]
    Invalid {
        /// camelCase path of the offending key.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_names_the_key() {
        let err = SettingsError::invalid("telemetry.historyCapacity", "must be at least 1");
        assert_eq!(err.to_string(), "telemetry.historyCapacity: must be at least 1");
    }

    #[test]
    fn parse_error_names_the_file() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = SettingsError::Parse {
            path: PathBuf::from("/home/u/.voxsearch/settings.json"),
            source,
        };
        assert!(err.to_string().starts_with("cannot parse /home/u/.voxsearch/settings.json"));
    }
}
