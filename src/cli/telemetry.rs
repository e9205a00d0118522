use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber.
///
/// Without a verbosity flag the filter comes from `RUST_LOG`; otherwise the
/// requested level applies to this crate and to `tower_http` request traces.
///
/// # Errors
/// Returns an error if a subscriber is already installed.
pub fn init(level: Option<tracing::Level>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::new(format!(
            "{name}={level},tower_http={level}",
            name = env!("CARGO_PKG_NAME")
        )),
        None => EnvFilter::from_default_env(),
    };

    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!("Failed to initialize tracing subscriber: {err}"))
}
