//! Tracing subscriber setup for the `todo` binary.

use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::cli::{LogFormat, LoggingArgs};
use crate::error::AppError;

/// Install the global subscriber. Logs go to stderr so they never interleave
/// with the rendered list on stdout.
pub fn init(logging: &LoggingArgs) -> Result<(), AppError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| AppError::Telemetry(format!("failed to install tracing subscriber: {err}")))
}
