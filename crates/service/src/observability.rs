//! Log output for the service binary.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Single-line output without thread details.
    Compact,
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
///
/// # Errors
///
/// An unparsable filter, or a subscriber that is already installed.
pub fn init_logging(default_filter: &str, format: LogFormat) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_unset) => EnvFilter::try_new(default_filter)?,
    };

    let fmt_layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    info!(filter = default_filter, ?format, "logging initialized");
    Ok(())
}
