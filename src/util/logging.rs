use tracing_subscriber::{fmt, EnvFilter};

/// Initializes tracing/logging based on environment variables. Request
/// tracing from tower-http rides on the same filter.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("metacat=info,tower_http=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();
}
