//! Constants used throughout the application.
//!
//! Limits, defaults and environment variable names are kept here so the core,
//! the configuration loader and the command-line boundary agree on them.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "stickerdiary";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A sticker-collage diary backend";

// Configuration Keys & Environment Variables
/// Environment variable for the database file path.
pub const ENV_VAR_DB_PATH: &str = "STICKERDIARY_DB";
/// Environment variable holding the token signing secret.
pub const ENV_VAR_TOKEN_SECRET: &str = "STICKERDIARY_TOKEN_SECRET";
/// Environment variable for the access token lifetime in seconds.
pub const ENV_VAR_ACCESS_TTL: &str = "STICKERDIARY_ACCESS_TTL_SECS";
/// Environment variable for the refresh token lifetime in seconds.
pub const ENV_VAR_REFRESH_TTL: &str = "STICKERDIARY_REFRESH_TTL_SECS";
/// Environment variable selecting the log format.
pub const ENV_VAR_LOG_FORMAT: &str = "STICKERDIARY_LOG_FORMAT";
/// Environment variable selecting the log level.
pub const ENV_VAR_LOG_LEVEL: &str = "STICKERDIARY_LOG_LEVEL";
/// Environment variable carrying an access token for the CLI.
pub const ENV_VAR_ACCESS_TOKEN: &str = "STICKERDIARY_ACCESS_TOKEN";
/// Default database location, expanded with `shellexpand`.
pub const DEFAULT_DB_PATH: &str = "~/.local/share/stickerdiary/diary.db";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Tokens
/// Default access token lifetime (one hour).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 3_600;
/// Default refresh token lifetime (seven days).
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;
/// Minimum accepted length of the HMAC signing secret, in bytes.
pub const MIN_TOKEN_SECRET_LEN: usize = 32;
/// Token type label reported alongside issued token pairs.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";
/// Prefix stripped from `Authorization` header values.
pub const BEARER_PREFIX: &str = "Bearer ";

// Field limits
/// Maximum diary title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum diary genre length, in characters.
pub const MAX_GENRE_LEN: usize = 50;
/// Minimum nickname length, in characters.
pub const MIN_NICKNAME_LEN: usize = 2;
/// Maximum nickname length, in characters.
pub const MAX_NICKNAME_LEN: usize = 20;
/// Maximum bio length, in characters.
pub const MAX_BIO_LEN: usize = 200;
/// Maximum email length, in characters.
pub const MAX_EMAIL_LEN: usize = 100;
/// Maximum sticker type length, in characters.
pub const MAX_STICKER_TYPE_LEN: usize = 50;
/// Maximum sticker source length, in characters.
pub const MAX_STICKER_SRC_LEN: usize = 500;

// Sticker defaults
/// Default sticker rotation in degrees.
pub const DEFAULT_STICKER_ROTATION: f64 = 0.0;
/// Default sticker stacking order.
pub const DEFAULT_STICKER_Z_INDEX: i32 = 1;

// Database
/// Maximum number of pooled SQLite connections.
pub const DB_POOL_MAX_SIZE: u32 = 5;
/// SQLite busy timeout in milliseconds.
pub const DB_BUSY_TIMEOUT_MS: u32 = 5_000;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";

// Logging Configuration
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "stickerdiary";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
