//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, which embed the salt and parameters, so
//! a stored hash is all that is needed to verify a later login attempt.

use crate::errors::{AppError, AppResult};
use argon2::password_hash::{
    rand_core, Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;

/// Hashes a raw password with a fresh random salt.
///
/// # Errors
///
/// Returns `AppError::Unexpected` if hashing itself fails.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Unexpected(format!("Password hashing failed: {}", e)))
}

/// Checks a raw password against a stored PHC hash.
///
/// # Errors
///
/// Returns `AppError::InvalidCredential` on mismatch, and
/// `AppError::Unexpected` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Unexpected(format!("Stored password hash is unreadable: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(PasswordHashError::Password) => {
            Err(AppError::InvalidCredential("password mismatch".to_string()))
        }
        Err(e) => Err(AppError::Unexpected(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
