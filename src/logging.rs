use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DASHTINT_LOG";

/// Installs the stderr subscriber. Filter comes from `DASHTINT_LOG`
/// (`info` when unset or invalid); a second call is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
