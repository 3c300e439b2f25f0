//! Accounts: sign-up, login, token refresh and profile changes.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{TokenAuthority, TokenPair};
use crate::db::users::{self, NewUser};
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::model::{ProfileUpdate, Role, User};
use crate::validation::{validate_profile_update, validate_sign_up};
use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

/// Owns user identity, profile fields and the onboarding flag.
#[derive(Debug, Clone)]
pub struct AccountManager {
    db: Database,
    tokens: TokenAuthority,
}

fn load_user(conn: &Connection, user_id: i64) -> AppResult<User> {
    users::get_user_by_id(conn, user_id)?.ok_or_else(|| AppError::user_not_found(user_id))
}

impl AccountManager {
    pub fn new(db: Database, tokens: TokenAuthority) -> Self {
        AccountManager { db, tokens }
    }

    /// The token authority this manager issues tokens with.
    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    /// Registers a new account with role `USER`.
    ///
    /// Only the Argon2 hash of `password` is stored.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` for malformed input
    /// - `AppError::DuplicateIdentity` if the exact email is already registered
    pub fn sign_up(&self, email: &str, password: &str, nickname: &str) -> AppResult<User> {
        validate_sign_up(email, password, nickname)?;

        if self.db.read(|conn| users::email_exists(conn, email))? {
            return Err(AppError::DuplicateIdentity(email.to_string()));
        }

        let password_hash = hash_password(password)?;
        let nickname = nickname.trim();
        let user = self.db.transaction(|tx| {
            // The UNIQUE index still rejects a concurrent sign-up that passed the check above
            let id = users::insert_user(
                tx,
                NewUser {
                    email,
                    password_hash: &password_hash,
                    nickname,
                    role: Role::User,
                },
                Utc::now(),
            )?;
            load_user(tx, id)
        })?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Verifies a password and issues a token pair.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` if no account uses `email`
    /// - `AppError::InvalidCredential` if the password does not match
    ///
    /// A boundary reporting these to a client should pass the error through
    /// [`AppError::for_login`] so the two cases look the same.
    pub fn login(&self, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let user = self
            .db
            .read(|conn| users::get_user_by_email(conn, email))?
            .ok_or_else(|| AppError::user_not_found(email))?;

        verify_password(password, &user.password_hash)?;

        let pair = self.tokens.issue(&user.email, user.role)?;
        info!("User {} logged in", user.id);
        Ok((user, pair))
    }

    /// Exchanges a refresh token for a new pair carrying the current role.
    ///
    /// # Errors
    ///
    /// - `AppError::Token` (an invalid credential) if the token is invalid,
    ///   expired or not a refresh token
    /// - `AppError::NotFound` if its account no longer exists
    pub fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let pair = self.tokens.refresh(refresh_token, |email| {
            self.db
                .read(|conn| users::get_user_by_email(conn, email))?
                .map(|user| user.role)
                .ok_or_else(|| AppError::user_not_found(email))
        })?;
        debug!("Refreshed token pair");
        Ok(pair)
    }

    /// Resolves the account an access token was issued to.
    ///
    /// # Errors
    ///
    /// Fails with an invalid-credential error if the token is not a valid
    /// access token or its account is gone.
    pub fn authenticate(&self, access_token: &str) -> AppResult<User> {
        let claims = self.tokens.access_claims(access_token)?;
        self.db
            .read(|conn| users::get_user_by_email(conn, &claims.sub))?
            .ok_or_else(|| AppError::InvalidCredential("token subject is not registered".to_string()))
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no account has this id.
    pub fn get_by_id(&self, user_id: i64) -> AppResult<User> {
        self.db.read(|conn| load_user(conn, user_id))
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no account uses this exact email.
    pub fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.db
            .read(|conn| users::get_user_by_email(conn, email))?
            .ok_or_else(|| AppError::user_not_found(email))
    }

    /// Applies only the fields present in `update`.
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> AppResult<User> {
        validate_profile_update(update)?;

        let update = ProfileUpdate {
            nickname: update.nickname.as_deref().map(|n| n.trim().to_string()),
            ..update.clone()
        };
        let user = self.db.transaction(|tx| {
            if update.is_empty() {
                return load_user(tx, user_id);
            }
            users::update_profile(tx, user_id, &update, Utc::now())?;
            load_user(tx, user_id)
        })?;

        info!("Updated profile of user {}", user_id);
        Ok(user)
    }

    /// Marks onboarding as done. Calling it again changes nothing.
    pub fn complete_onboarding(&self, user_id: i64) -> AppResult<User> {
        self.db.transaction(|tx| {
            users::mark_onboarding_completed(tx, user_id, Utc::now())?;
            load_user(tx, user_id)
        })
    }

    /// Grants `role` to an account. Tokens refreshed afterwards carry it.
    pub fn change_role(&self, user_id: i64, role: Role) -> AppResult<User> {
        let user = self.db.transaction(|tx| {
            users::update_role(tx, user_id, role, Utc::now())?;
            load_user(tx, user_id)
        })?;
        info!("User {} now has role {}", user_id, role.as_str());
        Ok(user)
    }
}
