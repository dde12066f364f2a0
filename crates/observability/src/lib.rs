//! Tracing and logging (shared setup).

/// Initialize process-wide tracing for the named application environment.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(env: &str) {
    tracing::init(env);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
