//! Logging initialization.
//!
//! Installs a `tracing-subscriber` registry with an env-filter. Embedding
//! binaries call [`init`] once at startup; `RUST_LOG` overrides the
//! default directive.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "tablekeeper=info";

/// Initialize global logging with the default filter.
///
/// Fails if a global subscriber is already installed.
pub fn init() -> crate::Result<()> {
    init_with_filter(DEFAULT_LOG_FILTER)
}

/// Initialize global logging with an explicit fallback directive.
///
/// The `RUST_LOG` environment variable, when set, takes precedence over
/// `directive`.
pub fn init_with_filter(directive: &str) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .map_err(|e| crate::Error::config(format!("Invalid filter directive: {}", e)))?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|e| crate::Error::config(format!("Failed to install subscriber: {}", e)))?;

    Ok(())
}
