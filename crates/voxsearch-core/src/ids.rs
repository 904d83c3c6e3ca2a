//! Attempt identifiers.
//!
//! Every voice gesture gets an [`AttemptId`] (UUID v7, time-ordered) so the
//! log lines emitted by mode selection, preprocessing, and telemetry for the
//! same gesture can be correlated.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one user-initiated voice search gesture.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(String);

impl AttemptId {
    /// Create a new random ID (UUID v7, time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttemptId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = AttemptId::new();
        let b = AttemptId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_v7_uuids() {
        let id = AttemptId::new();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn serde_is_transparent() {
        let id = AttemptId::from("attempt-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"attempt-1\"");
        let back: AttemptId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
