//! Domain types for users, diaries and stickers.
//!
//! Every persisted entity embeds [`Timestamps`] by composition; the storage
//! layer fills them on insert and update.

pub mod diary;
pub mod user;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use diary::{Diary, DiaryDetail, DiaryFields, Sticker, StickerSpec, UserStats};
pub use user::{ProfileUpdate, Role, User};

/// Creation and last-update instants shared by every persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Both instants set to `now`, as for a freshly inserted row.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// Formats an instant the way every timestamp column stores it.
///
/// Fixed microsecond precision keeps lexical order equal to time order.
pub fn to_db_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a timestamp column written by [`to_db_timestamp`].
pub fn parse_db_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc))
}
