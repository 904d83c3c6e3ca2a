//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`VoiceSettings::default()`]
//! 2. If `~/.voxsearch/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `VOXSEARCH_*` environment variable overrides
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::VoiceSettings;

/// Resolve the path to the settings file (`~/.voxsearch/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".voxsearch").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<VoiceSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or values that fail
/// [`VoiceSettings::validate`] are errors.
pub fn load_settings_from_path(path: &Path) -> Result<VoiceSettings> {
    let defaults = serde_json::to_value(VoiceSettings::default())?;

    let parse_err = |source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(parse_err)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: VoiceSettings = serde_json::from_value(merged).map_err(parse_err)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (file/default value wins).
pub fn apply_env_overrides(settings: &mut VoiceSettings) {
    // ── Recognition ─────────────────────────────────────────────────
    if let Some(v) = read_env_u32("VOXSEARCH_INSTABILITY_THRESHOLD", 1, 100) {
        settings.recognition.instability_threshold = v;
    }
    if let Some(v) = read_env_bool("VOXSEARCH_RETRY_WITH_FALLBACK") {
        settings.recognition.retry_with_fallback = v;
    }

    // ── Audio ───────────────────────────────────────────────────────
    if let Some(v) = read_env_f32("VOXSEARCH_SILENCE_THRESHOLD_DB", -120.0, -1.0) {
        settings.audio.silence_threshold_db = v;
    }
    if let Some(v) = read_env_f32("VOXSEARCH_ENERGY_FLOOR_DB", -120.0, -1.0) {
        settings.audio.energy_floor_db = v;
    }
    if let Some(v) = read_env_f32("VOXSEARCH_TARGET_LUFS", -70.0, -5.0) {
        settings.audio.loudness.integrated_lufs = v;
    }
    if let Some(v) = read_env_f32("VOXSEARCH_TRUE_PEAK_DBTP", -9.0, 0.0) {
        settings.audio.loudness.true_peak_dbtp = v;
    }
    if let Some(v) = read_env_string("VOXSEARCH_SCRATCH_DIR") {
        settings.audio.scratch_dir = Some(PathBuf::from(v));
    }

    // ── Telemetry ───────────────────────────────────────────────────
    if let Some(v) = read_env_usize("VOXSEARCH_HISTORY_CAPACITY", 1, 100_000) {
        settings.telemetry.history_capacity = v;
    }
    if let Some(v) = read_env_bool("VOXSEARCH_DIAGNOSTIC_LOG") {
        settings.telemetry.diagnostic_log = v;
    }
    if let Some(v) = read_env_bool("VOXSEARCH_EXPORT_METRICS") {
        settings.telemetry.export_metrics = v;
    }
    if let Some(v) = read_env_string("VOXSEARCH_USER_AGENT") {
        settings.telemetry.browser = Some(v);
    }
    if let Some(v) = read_env_string("VOXSEARCH_PLATFORM") {
        settings.telemetry.platform = Some(v);
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("VOXSEARCH_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool("VOXSEARCH_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within an inclusive range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `usize` within an inclusive range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a finite `f32` within an inclusive range.
pub fn parse_f32_range(val: &str, min: f32, max: f32) -> Option<f32> {
    let n: f32 = val.trim().parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read and parse `name`; a set but unparseable value is logged and ignored.
fn read_env<T>(name: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        tracing::warn!(key = name, value = %raw, "ignoring out-of-range env override");
    }
    parsed
}

fn read_env_bool(name: &str) -> Option<bool> {
    read_env(name, parse_bool)
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    read_env(name, |v| parse_u32_range(v, min, max))
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    read_env(name, |v| parse_usize_range(v, min, max))
}

fn read_env_f32(name: &str, min: f32, max: f32) -> Option<f32> {
    read_env(name, |v| parse_f32_range(v, min, max))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
