//! Environment-driven configuration.
//!
//! Every setting has a default; [`AppConfig::load`] reads overrides from the
//! process environment and validates them. Command-line flags are applied on
//! top by the binary.

use std::path::PathBuf;
use std::time::Duration;

use snafu::Snafu;

use crate::translate::OpenAiConfig;

/// Invalid configuration input.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[snafu(display("invalid configuration for {key}: '{value}' ({reason})"))]
    InvalidValue {
        /// Environment variable name.
        key: String,
        /// Raw value found.
        value: String,
        /// What was expected.
        reason: String,
    },
}

/// Database settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
    /// How long a connection waits on a locked database.
    pub busy_timeout: Duration,
    /// Reject every statement that is not a single query.
    pub read_only: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("database.db"),
            busy_timeout: Duration::from_millis(5_000),
            read_only: false,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Language-model settings; translation is enabled only with an API key.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// API key; `None` disables the translator.
    pub api_key: Option<String>,
    /// API root.
    pub base_url: String,
    /// Chat model name.
    pub model: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ModelConfig {
    /// Translator settings, if an API key is configured.
    pub fn openai(&self) -> Option<OpenAiConfig> {
        let api_key = self.api_key.clone()?;
        Some(OpenAiConfig {
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: self.timeout,
        })
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Database settings.
    pub database: DatabaseConfig,
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Language-model settings.
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("DB_URL") {
            config.database.path = PathBuf::from(path);
        }
        if let Some(raw) = get("DB_BUSY_TIMEOUT_MS") {
            let millis = parse_number::<u64>("DB_BUSY_TIMEOUT_MS", &raw)?;
            config.database.busy_timeout = Duration::from_millis(millis);
        }
        if let Some(raw) = get("NL2SQL_READ_ONLY") {
            config.database.read_only = parse_bool("NL2SQL_READ_ONLY", &raw)?;
        }

        if let Some(addr) = get("HTTP_BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        if let Some(raw) = get("HTTP_PORT") {
            config.server.port = parse_number::<u16>("HTTP_PORT", &raw)?;
        }

        config.model.api_key = get("OPENAI_API_KEY");
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.model.base_url = url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            config.model.model = model;
        }
        if let Some(raw) = get("OPENAI_TIMEOUT_SECS") {
            let secs = parse_number::<u64>("OPENAI_TIMEOUT_SECS", &raw)?;
            config.model.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        InvalidValueSnafu {
            key,
            value: raw,
            reason: e.to_string(),
        }
        .build()
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => InvalidValueSnafu {
            key,
            value: raw,
            reason: "expected true or false",
        }
        .fail(),
    }
}
