//! OpenAI connection settings.

use pipeline::{ModelSettings, Temperature};
use thiserror::Error;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable overriding the model.
pub const MODEL_VAR: &str = "OPENAI_MODEL";
/// Environment variable overriding the sampling temperature.
pub const TEMPERATURE_VAR: &str = "OPENAI_TEMPERATURE";
/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Public OpenAI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors raised while assembling an [`OpenAiConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// No API key was provided.
    #[error("{API_KEY_VAR} is not set")]
    MissingApiKey,

    /// The temperature could not be parsed or lies outside `[0, 2]`.
    #[error("{TEMPERATURE_VAR} must be a number between 0 and 2, got '{value}'")]
    InvalidTemperature {
        /// The rejected value as given.
        value: String,
    },
}

/// Everything [`crate::OpenAiProvider`] needs to reach the API.
#[derive(Clone, PartialEq)]
pub struct OpenAiConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Default model for callers that do not choose one.
    pub model: String,
    /// Default sampling temperature.
    pub temperature: Temperature,
}

impl OpenAiConfig {
    /// Config with default model, temperature and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            temperature: Temperature::default(),
        }
    }

    /// Points the provider at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key.trim());

        if let Some(model) = var(MODEL_VAR) {
            config.model = model.trim().to_owned();
        }
        if let Some(raw) = var(TEMPERATURE_VAR) {
            config.temperature = raw
                .trim()
                .parse::<f32>()
                .ok()
                .and_then(Temperature::new)
                .ok_or(ConfigError::InvalidTemperature { value: raw })?;
        }
        if let Some(base_url) = var(BASE_URL_VAR) {
            config = config.with_base_url(base_url.trim());
        }
        Ok(config)
    }

    /// The configured model and temperature as step settings.
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings::new(self.model.clone()).with_temperature(self.temperature)
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn api_key_is_required() {
        assert_eq!(
            OpenAiConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingApiKey)
        );
        assert_eq!(
            OpenAiConfig::from_lookup(lookup(&[(API_KEY_VAR, "  ")])),
            Err(ConfigError::MissingApiKey)
        );
    }

    #[test]
    fn defaults_apply() {
        let config = OpenAiConfig::from_lookup(lookup(&[(API_KEY_VAR, "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.temperature.as_f32(), 0.0);
    }

    #[test]
    fn overrides_are_read() {
        let config = OpenAiConfig::from_lookup(lookup(&[
            (API_KEY_VAR, "sk-test"),
            (MODEL_VAR, "gpt-4o"),
            (TEMPERATURE_VAR, "0.7"),
            (BASE_URL_VAR, "http://localhost:8080/v1/"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        let settings = config.model_settings();
        assert_eq!(settings.model, "gpt-4o");
        assert!((settings.temperature.as_f32() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        for bad in ["2.5", "-1", "warm"] {
            let err = OpenAiConfig::from_lookup(lookup(&[
                (API_KEY_VAR, "sk-test"),
                (TEMPERATURE_VAR, bad),
            ]))
            .unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidTemperature {
                    value: bad.to_owned()
                }
            );
        }
    }

    #[test]
    fn debug_hides_the_key() {
        let rendered = format!("{:?}", OpenAiConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
