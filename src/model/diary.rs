//! Diaries and the stickers collaged onto them.

use super::Timestamps;
use crate::constants::{DEFAULT_STICKER_ROTATION, DEFAULT_STICKER_Z_INDEX};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A dated diary page owned by exactly one user.
///
/// `is_deleted` and `deleted_at` always move together: a trashed diary has a
/// deletion instant and an active one has none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diary {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub memo: Option<String>,
    pub date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub is_public: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub like_count: u64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Diary {
    /// Whether the diary sits in the trash.
    pub fn is_trashed(&self) -> bool {
        self.is_deleted
    }
}

/// A diary together with its stickers, ascending by z-index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiaryDetail {
    #[serde(flatten)]
    pub diary: Diary,
    pub stickers: Vec<Sticker>,
}

/// The caller-editable fields of a diary.
///
/// An update overwrites every one of these, so an absent `memo` clears the
/// stored memo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryFields {
    pub title: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl DiaryFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A positioned decorative element belonging to one diary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub id: i64,
    pub diary_id: i64,
    #[serde(rename = "type")]
    pub sticker_type: String,
    pub src: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub rotation: f64,
    pub z_index: i32,
}

/// The caller-supplied description of a sticker to attach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerSpec {
    #[serde(rename = "type")]
    pub sticker_type: String,
    pub src: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default = "default_rotation")]
    pub rotation: f64,
    #[serde(default = "default_z_index")]
    pub z_index: i32,
}

fn default_rotation() -> f64 {
    DEFAULT_STICKER_ROTATION
}

fn default_z_index() -> i32 {
    DEFAULT_STICKER_Z_INDEX
}

impl StickerSpec {
    /// A sticker at the origin with zero size, no rotation and z-index 1.
    pub fn new(sticker_type: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            sticker_type: sticker_type.into(),
            src: src.into(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            rotation: DEFAULT_STICKER_ROTATION,
            z_index: DEFAULT_STICKER_Z_INDEX,
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn rotated(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

/// Per-user diary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Active (non-trashed) diaries.
    pub diary_count: u64,
    /// Active diaries created in the requested month.
    pub monthly_diary_count: u64,
    /// Stickers attached to active diaries.
    pub sticker_count: u64,
    /// Mean stickers per active diary that has at least one sticker.
    pub avg_stickers_per_diary: f64,
}
