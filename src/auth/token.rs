//! Stateless HS256 bearer tokens.
//!
//! An issued pair holds a short-lived access token and a longer-lived refresh
//! token. Both carry the email as subject, the role authority and a `typ`
//! claim telling them apart. Nothing is persisted: a token stays valid until
//! it expires.

use crate::config::Config;
use crate::constants::{BEARER_PREFIX, BEARER_TOKEN_TYPE};
use crate::errors::{AppResult, TokenError};
use crate::model::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal email.
    pub sub: String,
    /// Role authority, e.g. `ROLE_USER`.
    pub role: String,
    /// `access` or `refresh`.
    pub typ: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second differ.
    pub jti: String,
}

impl Claims {
    /// The role named by the `role` claim.
    pub fn granted_role(&self) -> AppResult<Role> {
        Role::from_authority(&self.role)
            .ok_or_else(|| TokenError::UnknownRole(self.role.clone()).into())
    }

    fn expect_kind(self, kind: TokenKind) -> AppResult<Self> {
        if self.typ != kind.as_str() {
            return Err(TokenError::WrongType {
                expected: kind.as_str(),
                actual: self.typ,
            }
            .into());
        }
        Ok(self)
    }
}

/// An access/refresh token pair as handed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub access_expires_in: i64,
}

/// Issues, validates and refreshes signed bearer tokens.
///
/// Holds no mutable state and can be shared freely between callers.
///
/// # Examples
///
/// ```
/// use stickerdiary::auth::TokenAuthority;
/// use stickerdiary::model::Role;
///
/// let tokens = TokenAuthority::new(b"0123456789abcdef0123456789abcdef", 3600, 604800);
/// let pair = tokens.issue("alice@example.com", Role::User)?;
///
/// assert!(tokens.validate(&pair.access_token));
/// assert!(!tokens.validate("not-a-token"));
/// assert_eq!(tokens.identity_of(&pair.access_token)?, "alice@example.com");
/// # Ok::<(), stickerdiary::errors::AppError>(())
/// ```
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Creates an authority signing with `secret`.
    ///
    /// Lifetimes are in seconds. Expiry is checked with zero leeway.
    pub fn new(secret: &[u8], access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        TokenAuthority {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    /// Creates an authority from the configured secret and lifetimes.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.token_secret.as_bytes(),
            config.access_ttl_secs,
            config.refresh_ttl_secs,
        )
    }

    fn sign(&self, identity: &str, role: Role, kind: TokenKind) -> AppResult<String> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: identity.to_string(),
            role: role.authority().to_string(),
            typ: kind.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e).into())
    }

    /// Issues a fresh access/refresh pair for `identity` with `role`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, identity: &str, role: Role) -> AppResult<TokenPair> {
        let pair = TokenPair {
            access_token: self.sign(identity, role, TokenKind::Access)?,
            refresh_token: self.sign(identity, role, TokenKind::Refresh)?,
            token_type: BEARER_TOKEN_TYPE,
            access_expires_in: self.access_ttl.num_seconds(),
        };
        debug!("Issued token pair with role {}", role.authority());
        Ok(pair)
    }

    /// Decodes and verifies a token of either kind.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for malformed, badly signed or expired
    /// tokens.
    pub fn claims(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e).into())
    }

    /// Verified claims of an access token.
    pub fn access_claims(&self, token: &str) -> AppResult<Claims> {
        self.claims(token)?.expect_kind(TokenKind::Access)
    }

    /// Verified claims of a refresh token.
    pub fn refresh_claims(&self, token: &str) -> AppResult<Claims> {
        self.claims(token)?.expect_kind(TokenKind::Refresh)
    }

    /// Whether `token` is well-formed, correctly signed and unexpired.
    ///
    /// Never fails; any problem with untrusted input yields `false`.
    pub fn validate(&self, token: &str) -> bool {
        self.claims(token).is_ok()
    }

    /// Whether `token` is a valid access token.
    pub fn validate_access(&self, token: &str) -> bool {
        self.access_claims(token).is_ok()
    }

    /// The identity (email) a valid token was issued to.
    ///
    /// # Errors
    ///
    /// Fails with an invalid-credential error when the token is not valid.
    pub fn identity_of(&self, token: &str) -> AppResult<String> {
        self.claims(token).map(|claims| claims.sub)
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The refresh token is verified on its own; the role is then looked up
    /// afresh through `current_role` so a role change applies at once.
    ///
    /// # Errors
    ///
    /// Fails with an invalid-credential error when the token is invalid or
    /// not a refresh token, and with whatever `current_role` returns.
    pub fn refresh<F>(&self, refresh_token: &str, current_role: F) -> AppResult<TokenPair>
    where
        F: FnOnce(&str) -> AppResult<Role>,
    {
        let claims = self.refresh_claims(refresh_token)?;
        let role = current_role(&claims.sub)?;
        self.issue(&claims.sub, role)
    }
}

/// Strips an optional `Bearer ` prefix from an authorization value.
///
/// ```
/// use stickerdiary::auth::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc.def.ghi"), "abc.def.ghi");
/// assert_eq!(bearer_token("abc.def.ghi"), "abc.def.ghi");
/// ```
pub fn bearer_token(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim()
}
