use std::env;
use std::time::Duration;

use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;
const DATABASE: &str = "trip_planner";

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BACKOFF_MS: u64 = 1000;

const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Settings for the Gemini `generateContent` endpoint and its retry loop.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub initial_backoff: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            initial_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

impl GeminiSettings {
    /// The key to use for live calls, or `None` when the key is unset or
    /// still the placeholder from a sample `.env`.
    pub fn live_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.to_ascii_lowercase().contains("placeholder"))
    }

    pub fn mode(&self) -> AiMode {
        match (self.live_api_key(), self.endpoint.as_deref()) {
            (None, _) => AiMode::Mock,
            (Some(_), None) => AiMode::Misconfigured,
            (Some(_), Some(_)) => AiMode::Live,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    Live,
    Mock,
    Misconfigured,
}

impl AiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiMode::Live => "live",
            AiMode::Mock => "mock",
            AiMode::Misconfigured => "misconfigured",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database: String,
    pub jwt_secret: String,
    pub frontend_url: Option<String>,
    pub gemini: GeminiSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini = GeminiSettings {
            api_key: optional("GEMINI_API_KEY"),
            endpoint: optional("GEMINI_ENDPOINT"),
            max_attempts: parsed("GEMINI_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            attempt_timeout: Duration::from_secs(parsed(
                "GEMINI_TIMEOUT_SECS",
                DEFAULT_ATTEMPT_TIMEOUT_SECS,
            )?),
            initial_backoff: Duration::from_millis(parsed("GEMINI_BACKOFF_MS", DEFAULT_BACKOFF_MS)?),
        };

        if gemini.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "GEMINI_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| HOST.to_string()),
            port: parsed("PORT", PORT)?,
            mongo_uri: optional("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
            database: optional("MONGODB_DATABASE").unwrap_or_else(|| DATABASE.to_string()),
            jwt_secret: optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            frontend_url: optional("FRONTEND_URL"),
            gemini,
        })
    }

    /// Origins the browser client may call from.
    pub fn allowed_origins(&self) -> Vec<String> {
        LOCAL_ORIGINS
            .iter()
            .map(|origin| origin.to_string())
            .chain(self.frontend_url.iter().cloned())
            .collect()
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
