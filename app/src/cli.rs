//! Command-line flags with environment fallbacks.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use todo_core::{ClientConfig, ConfigError, InvalidationPolicy, Mode};
use tracing::level_filters::LevelFilter;

/// Command-line arguments for the `todo` shell.
#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Terminal task list")]
pub struct CliArgs {
    /// Selects the API base URL.
    #[arg(long, value_enum, env = "TODO_MODE", default_value_t = ModeArg::Development)]
    pub mode: ModeArg,

    /// Origin `/api` is resolved against in production mode.
    #[arg(long, env = "TODO_ORIGIN", value_name = "URL")]
    pub origin: Option<String>,

    /// Explicit API base URL; overrides --mode and --origin.
    #[arg(long = "api-url", env = "TODO_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// When finished mutations refetch the task list.
    #[arg(long, value_enum, env = "TODO_INVALIDATE", default_value_t = PolicyArg::OnSuccess)]
    pub invalidate: PolicyArg,

    /// Overall request timeout; unset keeps the transport default.
    #[arg(long = "timeout-secs", env = "TODO_TIMEOUT_SECS", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(Debug, clap::Args)]
pub struct LoggingArgs {
    /// Default log level; `RUST_LOG` directives take precedence.
    #[arg(long = "log-level", env = "TODO_LOG_LEVEL", default_value = "warn")]
    pub level: LevelFilter,

    #[arg(long = "log-format", value_enum, env = "TODO_LOG_FORMAT", default_value_t = LogFormat::Compact)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    OnSuccess,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

impl CliArgs {
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let config = match &self.api_url {
            Some(url) => ClientConfig::with_base_url(url)?,
            None => ClientConfig::for_mode(self.mode.into(), self.origin.as_deref())?,
        };
        Ok(config
            .invalidation(self.invalidate.into())
            .timeout(self.timeout_secs.map(Duration::from_secs)))
    }
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => Mode::Development,
            ModeArg::Production => Mode::Production,
        }
    }
}

impl From<PolicyArg> for InvalidationPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::OnSuccess => InvalidationPolicy::OnSuccess,
            PolicyArg::Always => InvalidationPolicy::Always,
        }
    }
}
