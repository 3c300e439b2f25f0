//! Sticker composition.
//!
//! A diary's stickers are only ever written as a whole set. Callers run
//! [`replace_all`] on the same transaction as the diary write it belongs to,
//! so a failure part way leaves the previous set in place.

use crate::db::stickers;
use crate::errors::AppResult;
use crate::model::{Sticker, StickerSpec};
use rusqlite::Connection;
use tracing::debug;

/// Removes every sticker the diary owns, then inserts `specs` in the given
/// order with their z-index untouched.
///
/// Returns the stored set ascending by z-index.
pub fn replace_all(
    conn: &Connection,
    diary_id: i64,
    specs: &[StickerSpec],
) -> AppResult<Vec<Sticker>> {
    let removed = stickers::delete_stickers_for_diary(conn, diary_id)?;
    stickers::insert_stickers(conn, diary_id, specs)?;
    debug!(
        "Replaced {} stickers with {} on diary {}",
        removed,
        specs.len(),
        diary_id
    );
    stickers::list_stickers(conn, diary_id)
}
