use dotenv::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV_VAR: &str = "RECIPE_IDEAS_MODEL";
pub const BASE_URL_ENV_VAR: &str = "RECIPE_IDEAS_BASE_URL";
pub const TEMPERATURE_ENV_VAR: &str = "RECIPE_IDEAS_TEMPERATURE";
pub const TIMEOUT_ENV_VAR: &str = "RECIPE_IDEAS_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: String, value: String },
}

/// Settings for the recipe generation client.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    pub base_url: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads configuration from the environment (a `.env` file is read first).
    ///
    /// Required: `OPENROUTER_API_KEY`.
    ///
    /// Optional:
    /// - `RECIPE_IDEAS_MODEL` (default: "google/gemini-2.5-flash")
    /// - `RECIPE_IDEAS_BASE_URL` (default: "https://openrouter.ai/api/v1")
    /// - `RECIPE_IDEAS_TEMPERATURE` (default: 0.7)
    /// - `RECIPE_IDEAS_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_ENV_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_ENV_VAR.to_string()))?;

        let mut config = Self::new(api_key);

        if let Some(model) = lookup(MODEL_ENV_VAR) {
            config.model = model;
        }
        if let Some(base_url) = lookup(BASE_URL_ENV_VAR) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(TEMPERATURE_ENV_VAR) {
            config.temperature = parse_value(TEMPERATURE_ENV_VAR, &raw)?;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV_VAR) {
            config.request_timeout = Duration::from_secs(parse_value(TIMEOUT_ENV_VAR, &raw)?);
        }

        Ok(config)
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = GeneratorConfig::from_lookup(lookup_from(&[(API_KEY_ENV_VAR, "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            config.chat_completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_missing_or_blank_api_key() {
        let err = GeneratorConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar(API_KEY_ENV_VAR.to_string()));

        let err = GeneratorConfig::from_lookup(lookup_from(&[(API_KEY_ENV_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_overrides() {
        let config = GeneratorConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV_VAR, "sk-test"),
            (MODEL_ENV_VAR, "openai/gpt-4o-mini"),
            (BASE_URL_ENV_VAR, "http://localhost:8080/v1/"),
            (TEMPERATURE_ENV_VAR, "0.2"),
            (TIMEOUT_ENV_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.chat_completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_numeric_value() {
        let err = GeneratorConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV_VAR, "sk-test"),
            (TIMEOUT_ENV_VAR, "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: TIMEOUT_ENV_VAR.to_string(),
                value: "soon".to_string()
            }
        );
    }
}
