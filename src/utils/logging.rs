// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Global subscriber filtered by `RUST_LOG` (default `info`), writing to stderr.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the data grid and the menu
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Logging setup complete.");
}
