//! Logging setup utilities for the Palaver chat client.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the calling crate and the binary itself. The log level
/// can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_name` - The library crate emitting most events (e.g., "palaver_client")
/// * `binary_name` - The name of the binary (e.g., "palaver")
/// * `default_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use palaver_shared::logger::setup_logger;
///
/// setup_logger("palaver_client", "palaver", "info");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_level: &str) {
    let default_filter = format!(
        "{}={},{}={}",
        crate_name.replace('-', "_"),
        default_level,
        binary_name.replace('-', "_"),
        default_level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
