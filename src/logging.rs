//! Tracing subscriber setup.
//!
//! Logs go to stderr so that stdout stays reserved for command output.

use crate::config::LogFormat;
use crate::constants::{TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME};
use crate::errors::{AppError, AppResult};
use tracing::Span;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is an error
/// rather than a panic.
///
/// # Errors
///
/// Returns `AppError::Config` if the filter directive is malformed or a
/// global subscriber is already installed.
pub fn init_logging(format: LogFormat, level: &str) -> AppResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| AppError::Config(format!("Invalid log level '{}': {}", level, e)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(ChronoUtc::rfc_3339());

    let result = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };

    result.map_err(|e| AppError::Config(format!("Failed to initialise logging: {}", e)))
}

/// Creates the root span that wraps a single application invocation.
pub fn root_span(command: &str) -> Span {
    tracing::info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        invocation_id = %uuid::Uuid::new_v4(),
        command = command
    )
}
