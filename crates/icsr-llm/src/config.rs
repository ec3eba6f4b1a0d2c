//! Gateway configuration.
//!
//! Settings are read once at process startup and then passed into the
//! gateway. Nothing reads environment variables while requests are running.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Primary environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Fallback variable name used by older deployments.
pub const LEGACY_API_KEY_VAR: &str = "API_KEY";
pub const MODEL_VAR: &str = "ICSR_MODEL";
pub const API_BASE_VAR: &str = "ICSR_API_BASE";
pub const TIMEOUT_VAR: &str = "ICSR_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key is not configured: set GEMINI_API_KEY (or API_KEY) in the environment or a .env file")]
    MissingApiKey,

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Could not initialise the HTTP client: {0}")]
    HttpClient(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Provider API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        (!key.is_empty()).then_some(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Raw startup settings, before the API key requirement is enforced.
#[derive(Debug, Clone)]
pub struct Settings {
    api_key: Option<ApiKey>,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        // A missing .env file is normal outside local development
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through an arbitrary lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .and_then(ApiKey::new)
            .or_else(|| lookup(LEGACY_API_KEY_VAR).and_then(ApiKey::new));

        let model = non_blank(lookup(MODEL_VAR)).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = non_blank(lookup(API_BASE_VAR))
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout_secs = match non_blank(lookup(TIMEOUT_VAR)) {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: TIMEOUT_VAR,
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            api_key,
            model,
            api_base,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn is_api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Enforce the API key requirement and produce the gateway configuration.
    pub fn into_gateway_config(self) -> ConfigResult<GatewayConfig> {
        let api_key = self.api_key.ok_or(ConfigError::MissingApiKey)?;
        Ok(GatewayConfig {
            api_key,
            model: self.model,
            api_base: self.api_base,
            timeout: self.timeout,
        })
    }
}

/// Immutable configuration the gateway is constructed from.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: ApiKey,
    /// Model identifier, e.g. `gemini-2.5-flash`
    pub model: String,
    /// Provider base URL without trailing slash
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
