//! Structured logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the configured level when `RUST_LOG` is unset.
pub fn default_directive(log_level: &str) -> String {
    let level = log_level.to_ascii_lowercase();
    format!("xsendfile_filter={level},tower_http={level}")
}

/// Install the global subscriber. Call once, at startup.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(log_level))))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
