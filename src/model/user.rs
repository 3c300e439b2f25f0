//! User accounts.

use super::Timestamps;
use crate::constants::REDACTED_PLACEHOLDER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization role granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Authority label carried in token claims, e.g. `ROLE_USER`.
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// Parse an authority label back into a role.
    pub fn from_authority(authority: &str) -> Option<Self> {
        authority.strip_prefix("ROLE_").and_then(Self::parse)
    }
}

/// A registered account.
///
/// The password hash is never serialized and is redacted from `Debug` output.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub nickname: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub onboarding_completed: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &REDACTED_PLACEHOLDER)
            .field("nickname", &self.nickname)
            .field("bio", &self.bio)
            .field("avatar_url", &self.avatar_url)
            .field("role", &self.role)
            .field("onboarding_completed", &self.onboarding_completed)
            .field("timestamps", &self.timestamps)
            .finish()
    }
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }
}
