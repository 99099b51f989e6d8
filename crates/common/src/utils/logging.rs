use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, otherwise the configured default level.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize tracing subscriber with compact human-readable output.
/// - Respects `RUST_LOG` if set
/// - Falls back to `default_level` (e.g. `info`)
/// - Writes to stderr so that command output on stdout (dumps) stays machine-readable
pub fn init_logging_default(default_level: &str) {
    let _ = fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, defaults to `default_level`
/// - Emits one JSON object per event for log shippers
pub fn init_logging_json(default_level: &str) {
    let _ = fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(false)
        .json()
        .with_writer(io::stderr)
        .try_init();
}

/// Pick the subscriber by format name (`compact` or `json`).
/// Unknown names fall back to compact output.
pub fn init_logging(format: &str, default_level: &str) {
    match format {
        "json" => init_logging_json(default_level),
        _ => init_logging_default(default_level),
    }
}
