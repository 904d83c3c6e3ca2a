//! Logging bootstrap for processes embedding the voice pipeline.
//!
//! All crates log through `tracing`. The host application calls
//! [`init_logging`] (or one of the subscriber-specific initializers) once at
//! startup; tests use [`capture_logs`] to assert
//! on emitted events without touching the global subscriber.

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

/// Log target used for the development diagnostic mirror of telemetry.
pub const TELEMETRY_TARGET: &str = "voxsearch::telemetry";

/// Initialize the global tracing subscriber with stderr output.
///
/// `RUST_LOG` takes precedence over `level` when set. Subsequent calls are
/// no-ops.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init fails if a global subscriber is already set
    let _ = subscriber.try_init();
}

/// Initialize the global subscriber with JSON lines on stderr.
///
/// Intended for production deployments where logs are shipped to an
/// aggregator.
pub fn init_json_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = subscriber.try_init();
}

/// Initialize the global subscriber, picking JSON lines when `json` is set
/// and compact text otherwise.
pub fn init_logging(level: &str, json: bool) {
    if json {
        init_json_subscriber(level);
    } else {
        init_subscriber(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_does_not_panic() {
        init_subscriber("warn");
        init_subscriber("debug");
        init_json_subscriber("info");
        init_logging("info", true);
        init_logging("trace", false);
    }

    #[test]
    fn telemetry_target_is_namespaced() {
        assert!(TELEMETRY_TARGET.starts_with("voxsearch"));
    }
}
