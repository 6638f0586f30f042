//! HTTP client settings for the fetcher.

use std::time::Duration;

use thiserror::Error;

/// Environment variable overriding the request timeout, in whole seconds.
pub const TIMEOUT_VAR: &str = "TEXTLENS_FETCH_TIMEOUT_SECS";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser-like agent; many article hosts reject unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Errors raised while reading [`FetchConfig`] from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchConfigError {
    /// The timeout is not a positive whole number of seconds.
    #[error("{TIMEOUT_VAR} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout {
        /// The rejected value as given.
        value: String,
    },
}

/// Settings for [`crate::HtmlFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FetchConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, FetchConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FetchConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(FetchConfigError::InvalidTimeout { value: raw })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overrides() {
        let config = FetchConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, FetchConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn timeout_override() {
        let config = FetchConfig::from_lookup(|key| {
            (key == TIMEOUT_VAR).then(|| "5".to_owned())
        })
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_or_garbage_timeouts_are_rejected() {
        for bad in ["0", "soon", "-3"] {
            let err = FetchConfig::from_lookup(|_| Some(bad.to_owned())).unwrap_err();
            assert_eq!(
                err,
                FetchConfigError::InvalidTimeout {
                    value: bad.to_owned()
                }
            );
        }
    }
}
