//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing for binaries and tests.
///
/// Loads `.env` (if present) so `RUST_LOG` can live there, then installs an
/// env-filtered fmt subscriber unless one is already set. Library users that
/// install their own subscriber are left alone.
pub fn init_tracing() {
    let _ = dotenvy::dotenv();
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
