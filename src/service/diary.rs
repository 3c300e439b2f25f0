//! The diary lifecycle.
//!
//! A diary is either active or trashed, and leaves both states only through
//! permanent deletion:
//!
//! ```text
//! create ──▶ Active ──move_to_trash──▶ Trashed
//!              ▲                          │
//!              └─────────restore──────────┘
//!        delete (from either) ──▶ removed with its stickers
//! ```
//!
//! Every mutation runs in one transaction, so the diary row and its sticker
//! set always commit together.

use super::search::SearchCriteria;
use super::stickers::replace_all;
use crate::db::{diaries, stickers, users, Database};
use crate::errors::{AppError, AppResult};
use crate::model::{Diary, DiaryDetail, DiaryFields, Sticker, StickerSpec, UserStats};
use crate::validation::validate_diary;
use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

/// Owns diary creation, updates, trash state, likes and visibility.
#[derive(Debug, Clone)]
pub struct DiaryManager {
    db: Database,
}

fn load_diary(conn: &Connection, diary_id: i64) -> AppResult<Diary> {
    diaries::get_diary(conn, diary_id)?.ok_or_else(|| AppError::diary_not_found(diary_id))
}

fn load_detail(conn: &Connection, diary_id: i64) -> AppResult<DiaryDetail> {
    let diary = load_diary(conn, diary_id)?;
    let stickers = stickers::list_stickers(conn, diary_id)?;
    Ok(DiaryDetail { diary, stickers })
}

impl DiaryManager {
    pub fn new(db: Database) -> Self {
        DiaryManager { db }
    }

    /// Creates an active diary owned by `owner_id` with its initial stickers.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` for malformed fields or stickers
    /// - `AppError::NotFound` if the owner does not exist
    pub fn create(
        &self,
        owner_id: i64,
        fields: &DiaryFields,
        initial_stickers: &[StickerSpec],
    ) -> AppResult<DiaryDetail> {
        validate_diary(fields, initial_stickers)?;

        let detail = self.db.transaction(|tx| {
            if !users::user_exists(tx, owner_id)? {
                return Err(AppError::user_not_found(owner_id));
            }
            let id = diaries::insert_diary(tx, owner_id, fields, Utc::now())?;
            let stickers = replace_all(tx, id, initial_stickers)?;
            Ok(DiaryDetail {
                diary: load_diary(tx, id)?,
                stickers,
            })
        })?;

        info!(
            "Created diary {} for user {} with {} stickers",
            detail.diary.id,
            owner_id,
            detail.stickers.len()
        );
        Ok(detail)
    }

    /// A diary with its stickers, whatever its state.
    pub fn get_by_id(&self, diary_id: i64) -> AppResult<DiaryDetail> {
        self.db.read(|conn| load_detail(conn, diary_id))
    }

    /// A diary that is public and not trashed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a private, trashed or missing diary
    /// alike.
    pub fn get_public_by_id(&self, diary_id: i64) -> AppResult<DiaryDetail> {
        self.db.read(|conn| {
            let diary = diaries::get_public_diary(conn, diary_id)?
                .ok_or_else(|| AppError::diary_not_found(diary_id))?;
            let stickers = stickers::list_stickers(conn, diary_id)?;
            Ok(DiaryDetail { diary, stickers })
        })
    }

    /// The user's active diaries, newest first.
    pub fn list_active(&self, user_id: i64) -> AppResult<Vec<Diary>> {
        self.db.read(|conn| diaries::list_active(conn, user_id))
    }

    /// The user's trashed diaries, most recently trashed first.
    pub fn list_trashed(&self, user_id: i64) -> AppResult<Vec<Diary>> {
        self.db.read(|conn| diaries::list_trashed(conn, user_id))
    }

    /// Overwrites every editable field and replaces the whole sticker set.
    ///
    /// Absent optional fields are cleared. Trash state and likes are kept.
    pub fn update(
        &self,
        diary_id: i64,
        fields: &DiaryFields,
        replacement_stickers: &[StickerSpec],
    ) -> AppResult<DiaryDetail> {
        validate_diary(fields, replacement_stickers)?;

        let detail = self.db.transaction(|tx| {
            diaries::update_fields(tx, diary_id, fields, Utc::now())?;
            let stickers = replace_all(tx, diary_id, replacement_stickers)?;
            Ok(DiaryDetail {
                diary: load_diary(tx, diary_id)?,
                stickers,
            })
        })?;

        info!("Updated diary {}", diary_id);
        Ok(detail)
    }

    /// Moves a diary to the trash, stamping the deletion instant.
    ///
    /// Trashing a diary that is already trashed stamps it again.
    pub fn move_to_trash(&self, diary_id: i64) -> AppResult<Diary> {
        let diary = self.db.transaction(|tx| {
            diaries::mark_trashed(tx, diary_id, Utc::now())?;
            load_diary(tx, diary_id)
        })?;
        info!("Moved diary {} to trash", diary_id);
        Ok(diary)
    }

    /// Brings a diary back from the trash.
    pub fn restore(&self, diary_id: i64) -> AppResult<Diary> {
        let diary = self.db.transaction(|tx| {
            diaries::clear_trashed(tx, diary_id, Utc::now())?;
            load_diary(tx, diary_id)
        })?;
        info!("Restored diary {}", diary_id);
        Ok(diary)
    }

    /// Permanently removes a diary and every sticker it owns.
    pub fn delete(&self, diary_id: i64) -> AppResult<()> {
        self.db.transaction(|tx| {
            load_diary(tx, diary_id)?;
            let removed = stickers::delete_stickers_for_diary(tx, diary_id)?;
            diaries::delete_diary(tx, diary_id)?;
            debug!("Deleted {} stickers with diary {}", removed, diary_id);
            Ok(())
        })?;
        info!("Permanently deleted diary {}", diary_id);
        Ok(())
    }

    /// Adds one like. Every call counts; likes are not tracked per user.
    pub fn toggle_like(&self, diary_id: i64) -> AppResult<Diary> {
        self.db.transaction(|tx| {
            diaries::increment_like(tx, diary_id, Utc::now())?;
            load_diary(tx, diary_id)
        })
    }

    /// Removes one like, never going below zero.
    pub fn unlike(&self, diary_id: i64) -> AppResult<Diary> {
        self.db.transaction(|tx| {
            diaries::decrement_like(tx, diary_id, Utc::now())?;
            load_diary(tx, diary_id)
        })
    }

    /// Flips the public flag.
    pub fn toggle_public(&self, diary_id: i64) -> AppResult<Diary> {
        let diary = self.db.transaction(|tx| {
            diaries::flip_public(tx, diary_id, Utc::now())?;
            load_diary(tx, diary_id)
        })?;
        info!("Diary {} is now {}", diary_id, if diary.is_public { "public" } else { "private" });
        Ok(diary)
    }

    /// A diary's stickers, ascending by z-index.
    pub fn list_stickers(&self, diary_id: i64) -> AppResult<Vec<Sticker>> {
        self.db.read(|conn| {
            load_diary(conn, diary_id)?;
            stickers::list_stickers(conn, diary_id)
        })
    }

    /// Searches the user's active diaries by the highest-precedence criterion
    /// present.
    pub fn search(&self, user_id: i64, criteria: &SearchCriteria) -> AppResult<Vec<Diary>> {
        let query = criteria.resolve()?;
        debug!("Searching diaries of user {} by {:?}", user_id, query);
        self.db.read(|conn| query.execute(conn, user_id))
    }

    /// Diary and sticker counts over the user's active diaries.
    ///
    /// `monthly_diary_count` counts diaries created in `year`/`month` (UTC).
    pub fn stats(&self, user_id: i64, year: i32, month: u32) -> AppResult<UserStats> {
        self.db.read(|conn| {
            Ok(UserStats {
                diary_count: diaries::count_active(conn, user_id)?,
                monthly_diary_count: diaries::count_active_in_month(conn, user_id, year, month)?,
                sticker_count: stickers::count_active_stickers_for_user(conn, user_id)?,
                avg_stickers_per_diary: stickers::avg_stickers_per_active_diary(conn, user_id)?,
            })
        })
    }

    /// Public, active diaries of every user, newest first.
    pub fn list_public_feed(&self, limit: u32) -> AppResult<Vec<Diary>> {
        self.db.read(|conn| diaries::list_public(conn, limit))
    }
}
