//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Default level when `RUST_LOG` is unset.
pub fn default_level(env: &str) -> &'static str {
    match env {
        "production" | "staging" => "info",
        _ => "debug",
    }
}

/// Initialize tracing/logging for the process.
///
/// JSON logs with timestamps. `RUST_LOG` wins when set; otherwise the level
/// comes from [`default_level`].
pub fn init(env: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(env)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();

    ::tracing::debug!(env, "tracing initialized");
}
