//! Process configuration, read once at start-up and passed to the stores and the HTTP layer.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::oauth2::GoogleOAuthConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:sonora.db";
pub const DEFAULT_TABLE_PREFIX: &str = "sonora_";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Incomplete configuration: {0}")]
    Incomplete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
    Postgres,
}

impl std::str::FromStr for DatabaseKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidValue {
                key: "DATABASE_TYPE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_kind: DatabaseKind,
    pub database_url: String,
    pub table_prefix: String,
    /// Development mode drops the `Secure` cookie attribute and switches to human-readable logs.
    pub dev_mode: bool,
    pub validation_timeout: Duration,
    pub port: u16,
    pub google: Option<GoogleOAuthConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_kind: DatabaseKind::Sqlite,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            dev_mode: false,
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            port: DEFAULT_PORT,
            google: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_kind = match lookup("DATABASE_TYPE") {
            Some(v) => v.parse()?,
            None => defaults.database_kind,
        };

        let validation_timeout = match lookup("SESSION_VALIDATION_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SESSION_VALIDATION_TIMEOUT_MS",
                value: v.clone(),
            })?),
            None => defaults.validation_timeout,
        };

        let port = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: v.clone(),
            })?,
            None => defaults.port,
        };

        let dev_mode = lookup("SONORA_ENV")
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        let google = match (
            lookup("GOOGLE_CLIENT_ID"),
            lookup("GOOGLE_CLIENT_SECRET"),
            lookup("GOOGLE_REDIRECT_URI"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => {
                let mut google = GoogleOAuthConfig::new(client_id, client_secret, redirect_uri);
                if let Some(url) = lookup("GOOGLE_AUTH_URL") {
                    google.auth_url = url;
                }
                if let Some(url) = lookup("GOOGLE_TOKEN_URL") {
                    google.token_url = url;
                }
                Some(google)
            }
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::Incomplete(
                    "GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI must be set together"
                        .to_string(),
                ));
            }
        };

        Ok(Self {
            database_kind,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            table_prefix: lookup("DB_TABLE_PREFIX").unwrap_or(defaults.table_prefix),
            dev_mode,
            validation_timeout,
            port,
            google,
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !self.dev_mode
    }
}
