//! Configuration management for the stickerdiary application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `STICKERDIARY_DB`: Path to the SQLite database (defaults to ~/.local/share/stickerdiary/diary.db)
//! - `STICKERDIARY_TOKEN_SECRET`: HMAC secret used to sign bearer tokens (required)
//! - `STICKERDIARY_ACCESS_TTL_SECS`: Access token lifetime (defaults to 3600)
//! - `STICKERDIARY_REFRESH_TTL_SECS`: Refresh token lifetime (defaults to 604800)
//! - `STICKERDIARY_LOG_FORMAT`: `text` or `json` (defaults to text)
//! - `STICKERDIARY_LOG_LEVEL`: tracing filter directive (defaults to info)

use crate::constants::{
    DEFAULT_ACCESS_TTL_SECS, DEFAULT_DB_PATH, DEFAULT_LOG_LEVEL, DEFAULT_REFRESH_TTL_SECS,
    ENV_VAR_ACCESS_TTL, ENV_VAR_DB_PATH, ENV_VAR_LOG_FORMAT, ENV_VAR_LOG_LEVEL,
    ENV_VAR_REFRESH_TTL, ENV_VAR_TOKEN_SECRET, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
    MIN_TOKEN_SECRET_LEN, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Unknown log format '{}'. Expected '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }
}

/// Configuration for the stickerdiary application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use stickerdiary::Config;
/// use std::path::PathBuf;
///
/// let config = Config::with_secret(
///     PathBuf::from("/var/lib/stickerdiary/diary.db"),
///     "0123456789abcdef0123456789abcdef",
/// );
/// assert!(config.validate().is_ok());
/// ```
pub struct Config {
    /// Location of the SQLite database file.
    pub db_path: PathBuf,

    /// Secret used to sign and verify bearer tokens. Wiped from memory on drop.
    pub token_secret: Zeroizing<String>,

    /// Lifetime of access tokens, in seconds.
    pub access_ttl_secs: i64,

    /// Lifetime of refresh tokens, in seconds.
    pub refresh_ttl_secs: i64,

    /// Log output format.
    pub log_format: LogFormat,

    /// Log filter directive, e.g. `info` or `stickerdiary=debug`.
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &"[REDACTED_PATH]")
            .field("token_secret", &REDACTED_PLACEHOLDER)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Builds a configuration with default lifetimes and logging.
    pub fn with_secret(db_path: PathBuf, token_secret: &str) -> Self {
        Config {
            db_path,
            token_secret: Zeroizing::new(token_secret.to_string()),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            log_format: LogFormat::Text,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    fn read_ttl(var: &str, default: i64) -> AppResult<i64> {
        match env::var(var) {
            Ok(raw) => raw.trim().parse::<i64>().map_err(|e| {
                AppError::Config(format!("{} must be a whole number of seconds: {}", var, e))
            }),
            Err(_) => Ok(default),
        }
    }

    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The token secret is missing
    /// - The database path expansion fails
    /// - A lifetime or the log format cannot be parsed
    /// - The loaded values fail [`Config::validate`]
    pub fn load() -> AppResult<Self> {
        let db_path_raw = env::var(ENV_VAR_DB_PATH).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

        // Expand the path (handles ~ and environment variables)
        let expanded_path = shellexpand::full(&db_path_raw)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let db_path = PathBuf::from(expanded_path.into_owned());

        let token_secret = env::var(ENV_VAR_TOKEN_SECRET)
            .map(Zeroizing::new)
            .map_err(|_| AppError::Config(format!("{} must be set", ENV_VAR_TOKEN_SECRET)))?;

        let access_ttl_secs = Self::read_ttl(ENV_VAR_ACCESS_TTL, DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl_secs = Self::read_ttl(ENV_VAR_REFRESH_TTL, DEFAULT_REFRESH_TTL_SECS)?;

        let log_format = match env::var(ENV_VAR_LOG_FORMAT) {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Text,
        };
        let log_level =
            env::var(ENV_VAR_LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let config = Config {
            db_path,
            token_secret,
            access_ttl_secs,
            refresh_ttl_secs,
            log_format,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the database path is empty, the token
    /// secret is shorter than 32 bytes, a lifetime is not positive, or the
    /// refresh lifetime does not exceed the access lifetime.
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if self.token_secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "Token secret must be at least {} bytes",
                MIN_TOKEN_SECRET_LEN
            )));
        }

        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err(AppError::Config(
                "Token lifetimes must be positive".to_string(),
            ));
        }

        if self.refresh_ttl_secs <= self.access_ttl_secs {
            return Err(AppError::Config(
                "Refresh token lifetime must exceed access token lifetime".to_string(),
            ));
        }

        Ok(())
    }
}
