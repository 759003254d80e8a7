//! Client configuration: base URL selection and mutation policy.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used in development mode.
pub const DEV_BASE_URL: &str = "http://localhost:4000/api";

/// Path the API is mounted under in production, relative to the origin.
pub const PROD_BASE_PATH: &str = "/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

/// When a finished mutation invalidates the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// Only successful mutations trigger a refetch.
    #[default]
    OnSuccess,
    /// Every finished mutation triggers a refetch, failed ones included.
    Always,
}

impl InvalidationPolicy {
    pub fn should_invalidate(self, succeeded: bool) -> bool {
        match self {
            InvalidationPolicy::OnSuccess => succeeded,
            InvalidationPolicy::Always => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("production mode needs an origin to resolve the `/api` path against")]
    MissingOrigin,

    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub invalidation: InvalidationPolicy,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Select the base URL for `mode`. Development ignores `origin`;
    /// production resolves [`PROD_BASE_PATH`] against it.
    pub fn for_mode(mode: Mode, origin: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = match mode {
            Mode::Development => DEV_BASE_URL.to_string(),
            Mode::Production => {
                let origin = origin.ok_or(ConfigError::MissingOrigin)?;
                parse_url(origin)?
                    .join(PROD_BASE_PATH)
                    .map_err(|source| ConfigError::InvalidUrl {
                        url: origin.to_string(),
                        source,
                    })?
                    .to_string()
            }
        };
        Ok(Self::from_base_url(base_url))
    }

    /// Use an explicit, absolute base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let url = parse_url(base_url)?;
        Ok(Self::from_base_url(url.to_string()))
    }

    pub fn invalidation(mut self, policy: InvalidationPolicy) -> Self {
        self.invalidation = policy;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn from_base_url(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            invalidation: InvalidationPolicy::default(),
            timeout: None,
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}
