//! Error handling for the stickerdiary core.
//!
//! This module provides the central error type `AppError`, whose variants follow
//! the failure taxonomy every core operation reports (not found, duplicate
//! identity, invalid credential, validation failure, unexpected), the
//! convenience alias `AppResult`, and the stable `ErrorCode` table a boundary
//! layer uses to render failures.

use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

/// A single field-level validation problem.
///
/// # Examples
///
/// ```
/// use stickerdiary::errors::FieldError;
///
/// let error = FieldError::new("title", "title is required");
/// assert_eq!(format!("{}", error), "title: title is required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Path of the offending field, e.g. `title` or `stickers[0].src`.
    pub field: String,
    /// Human readable description of the problem.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors raised by the SQLite storage layer.
///
/// # Examples
///
/// ```
/// use stickerdiary::errors::DatabaseError;
///
/// let error = DatabaseError::Custom("schema version mismatch".to_string());
/// assert!(format!("{}", error).contains("schema version mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// Custom database error with detailed message.
    #[error("Database error: {0}")]
    Custom(String),
}

/// Errors raised while issuing or checking bearer tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token could not be decoded, was badly signed or has expired.
    #[error("Invalid or expired token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// The token decoded fine but is of the wrong kind for this use.
    #[error("Expected a {expected} token but got a {actual} token")]
    WrongType {
        /// Token type the caller required
        expected: &'static str,
        /// Token type found in the claims
        actual: String,
    },

    /// The token carries a role label this system does not know.
    #[error("Unknown role in token: {0}")]
    UnknownRole(String),

    /// Signing a new token failed.
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Coarse classification of every failure the core can produce.
///
/// A boundary layer maps each kind to one stable external status; anything
/// classified as [`ErrorKind::Unexpected`] is rendered opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    DuplicateIdentity,
    InvalidCredential,
    Validation,
    Unexpected,
}

/// Represents all possible errors that can occur in the stickerdiary core.
///
/// # Examples
///
/// ```
/// use stickerdiary::errors::{AppError, ErrorKind};
///
/// let error = AppError::DuplicateIdentity("alice@example.com".to_string());
/// assert_eq!(error.kind(), ErrorKind::DuplicateIdentity);
/// assert!(format!("{}", error).contains("alice@example.com"));
/// ```
///
/// Converting from an IO error:
/// ```
/// use stickerdiary::errors::{AppError, ErrorKind};
/// use std::io::{self, ErrorKind as IoKind};
///
/// let app_error: AppError = io::Error::new(IoKind::NotFound, "missing").into();
/// assert_eq!(app_error.kind(), ErrorKind::Unexpected);
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// A user, diary or sticker does not exist.
    #[error("{resource} not found: {detail}")]
    NotFound {
        /// Which kind of resource was missing
        resource: Resource,
        /// Identifier or context of the lookup
        detail: String,
    },

    /// The email is already registered.
    #[error("Email is already registered: {0}")]
    DuplicateIdentity(String),

    /// Password mismatch, or an invalid/expired token.
    #[error("Invalid credentials: {0}")]
    InvalidCredential(String),

    /// Malformed input, reported field by field.
    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Errors related to token handling.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Anything not otherwise classified.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Resource named by a [`AppError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Diary,
    Sticker,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::User => "User",
            Resource::Diary => "Diary",
            Resource::Sticker => "Sticker",
        };
        f.write_str(name)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    pub fn user_not_found(detail: impl fmt::Display) -> Self {
        AppError::NotFound {
            resource: Resource::User,
            detail: detail.to_string(),
        }
    }

    pub fn diary_not_found(detail: impl fmt::Display) -> Self {
        AppError::NotFound {
            resource: Resource::Diary,
            detail: detail.to_string(),
        }
    }

    /// Classifies this error into the failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::DuplicateIdentity(_) => ErrorKind::DuplicateIdentity,
            AppError::InvalidCredential(_) | AppError::Token(TokenError::Invalid(_)) => {
                ErrorKind::InvalidCredential
            }
            AppError::Token(TokenError::WrongType { .. })
            | AppError::Token(TokenError::UnknownRole(_)) => ErrorKind::InvalidCredential,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Database(_)
            | AppError::Token(TokenError::Signing(_))
            | AppError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Collapses "no such account" into an invalid-credential failure.
    ///
    /// Login must not reveal whether an email is registered, so the boundary
    /// passes login failures through this before rendering them.
    pub fn for_login(self) -> Self {
        match self {
            AppError::NotFound {
                resource: Resource::User,
                ..
            } => AppError::InvalidCredential("email or password does not match".to_string()),
            AppError::InvalidCredential(_) => {
                AppError::InvalidCredential("email or password does not match".to_string())
            }
            other => other,
        }
    }

    /// Maps this error to its stable external code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound { resource, .. } => match resource {
                Resource::User => ErrorCode::UserNotFound,
                Resource::Diary => ErrorCode::DiaryNotFound,
                Resource::Sticker => ErrorCode::StickerNotFound,
            },
            AppError::DuplicateIdentity(_) => ErrorCode::DuplicateEmail,
            AppError::Validation(_) => ErrorCode::InvalidInput,
            AppError::InvalidCredential(_) => ErrorCode::InvalidCredentials,
            other => match other.kind() {
                ErrorKind::InvalidCredential => ErrorCode::Unauthorized,
                _ => ErrorCode::InternalError,
            },
        }
    }

    /// Renders this error for an external caller.
    ///
    /// Unexpected failures never leak their internal description.
    pub fn to_response(&self) -> ErrorResponse {
        let code = self.code();
        let message = match self.kind() {
            ErrorKind::Unexpected => code.message().to_string(),
            ErrorKind::Validation => code.message().to_string(),
            _ => self.to_string(),
        };
        let errors = match self {
            AppError::Validation(fields) => fields.clone(),
            _ => Vec::new(),
        };
        ErrorResponse {
            status: code.status(),
            code: code.as_str(),
            message,
            errors,
        }
    }
}

/// Stable external error codes with their status and default message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    Unauthorized,
    InvalidCredentials,
    UserNotFound,
    DiaryNotFound,
    StickerNotFound,
    DuplicateEmail,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput => 400,
            ErrorCode::Unauthorized | ErrorCode::InvalidCredentials => 401,
            ErrorCode::UserNotFound | ErrorCode::DiaryNotFound | ErrorCode::StickerNotFound => 404,
            ErrorCode::DuplicateEmail => 409,
            ErrorCode::InternalError => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::DiaryNotFound => "DIARY_NOT_FOUND",
            ErrorCode::StickerNotFound => "STICKER_NOT_FOUND",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Input is not valid.",
            ErrorCode::Unauthorized => "Authentication is required.",
            ErrorCode::InvalidCredentials => "Email or password does not match.",
            ErrorCode::UserNotFound => "User not found.",
            ErrorCode::DiaryNotFound => "Diary not found.",
            ErrorCode::StickerNotFound => "Sticker not found.",
            ErrorCode::DuplicateEmail => "Email is already in use.",
            ErrorCode::InternalError => "An internal server error occurred.",
        }
    }
}

/// Serializable error body produced by [`AppError::to_response`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use stickerdiary::errors::{AppError, AppResult};
///
/// fn lookup(found: bool) -> AppResult<u32> {
///     if !found {
///         return Err(AppError::diary_not_found(42));
///     }
///     Ok(42)
/// }
///
/// assert!(lookup(false).is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(ref inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
        assert_eq!(app_error.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_not_found_display_and_code() {
        let error = AppError::diary_not_found(7);
        assert_eq!(format!("{}", error), "Diary not found: 7");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.code(), ErrorCode::DiaryNotFound);
        assert_eq!(error.code().status(), 404);
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let error = AppError::Validation(vec![
            FieldError::new("title", "title is required"),
            FieldError::new("genre", "genre must be at most 50 characters"),
        ]);
        let message = format!("{}", error);
        assert!(message.contains("title: title is required"));
        assert!(message.contains("genre: genre must be at most 50 characters"));
        assert_eq!(error.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_for_login_hides_unknown_email() {
        let missing = AppError::user_not_found("bob@example.com").for_login();
        let mismatch = AppError::InvalidCredential("password mismatch".to_string()).for_login();

        assert_eq!(missing.code(), ErrorCode::InvalidCredentials);
        assert_eq!(mismatch.code(), ErrorCode::InvalidCredentials);
        assert_eq!(missing.to_string(), mismatch.to_string());
        assert!(!missing.to_string().contains("bob@example.com"));
    }

    #[test]
    fn test_for_login_keeps_other_errors() {
        let error = AppError::Unexpected("disk on fire".to_string()).for_login();
        assert_eq!(error.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_unexpected_response_is_opaque() {
        let error: AppError = DatabaseError::Custom("secret table layout".to_string()).into();
        let response = error.to_response();

        assert_eq!(response.status, 500);
        assert_eq!(response.code, "INTERNAL_ERROR");
        assert!(!response.message.contains("secret table layout"));
    }

    #[test]
    fn test_validation_response_carries_fields() {
        let error = AppError::Validation(vec![FieldError::new("email", "email is malformed")]);
        let response = error.to_response();

        assert_eq!(response.status, 400);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].field, "email");
    }

    #[test]
    fn test_wrong_token_type_is_credential_failure() {
        let error: AppError = TokenError::WrongType {
            expected: "refresh",
            actual: "access".to_string(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::InvalidCredential);
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn test_result_combinators() {
        let io_result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::Other, "boom"));
        let app_result: AppResult<()> = io_result.map_err(AppError::Io);

        match app_result {
            Err(AppError::Io(inner)) => assert_eq!(inner.kind(), io::ErrorKind::Other),
            _ => panic!("Expected AppError::Io variant"),
        }
    }
}
