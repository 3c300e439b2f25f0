//! Sticker rows owned by diaries.

use crate::errors::{AppResult, DatabaseError};
use crate::model::{Sticker, StickerSpec};
use rusqlite::{params, Connection, Row};
use tracing::debug;

fn map_sticker_row(row: &Row<'_>) -> rusqlite::Result<Sticker> {
    Ok(Sticker {
        id: row.get(0)?,
        diary_id: row.get(1)?,
        sticker_type: row.get(2)?,
        src: row.get(3)?,
        x: row.get(4)?,
        y: row.get(5)?,
        width: row.get(6)?,
        height: row.get(7)?,
        rotation: row.get(8)?,
        z_index: row.get(9)?,
    })
}

/// Inserts stickers for a diary in the given order, keeping each z-index.
///
/// Returns the ids of the inserted rows.
pub fn insert_stickers(
    conn: &Connection,
    diary_id: i64,
    specs: &[StickerSpec],
) -> AppResult<Vec<i64>> {
    debug!("Inserting {} stickers for diary {}", specs.len(), diary_id);

    let mut stmt = conn
        .prepare_cached(
            r#"
            INSERT INTO stickers (diary_id, type, src, x, y, width, height, rotation, z_index)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let mut ids = Vec::with_capacity(specs.len());
    for spec in specs {
        stmt.execute(params![
            diary_id,
            spec.sticker_type,
            spec.src,
            spec.x,
            spec.y,
            spec.width,
            spec.height,
            spec.rotation,
            spec.z_index
        ])
        .map_err(DatabaseError::Sqlite)?;
        ids.push(conn.last_insert_rowid());
    }

    Ok(ids)
}

/// Deletes every sticker owned by a diary and returns how many were removed.
pub fn delete_stickers_for_diary(conn: &Connection, diary_id: i64) -> AppResult<usize> {
    let removed = conn
        .execute("DELETE FROM stickers WHERE diary_id = ?1", params![diary_id])
        .map_err(DatabaseError::Sqlite)?;
    debug!("Removed {} stickers from diary {}", removed, diary_id);
    Ok(removed)
}

/// Lists a diary's stickers ascending by z-index, then by insertion order.
pub fn list_stickers(conn: &Connection, diary_id: i64) -> AppResult<Vec<Sticker>> {
    let mut stmt = conn
        .prepare_cached(
            r#"
            SELECT id, diary_id, type, src, x, y, width, height, rotation, z_index
            FROM stickers
            WHERE diary_id = ?1
            ORDER BY z_index ASC, id ASC
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let stickers = stmt
        .query_map(params![diary_id], map_sticker_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(stickers)
}

/// Counts stickers on a user's active diaries.
pub fn count_active_stickers_for_user(conn: &Connection, user_id: i64) -> AppResult<u64> {
    conn.query_row(
        r#"
        SELECT COUNT(*) FROM stickers s
        JOIN diaries d ON d.id = s.diary_id
        WHERE d.user_id = ?1 AND d.is_deleted = 0
        "#,
        params![user_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count.max(0) as u64)
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Mean sticker count over a user's active diaries that have stickers.
///
/// Returns 0.0 when no active diary has any sticker.
pub fn avg_stickers_per_active_diary(conn: &Connection, user_id: i64) -> AppResult<f64> {
    conn.query_row(
        r#"
        SELECT COALESCE(AVG(sticker_count), 0.0) FROM (
            SELECT COUNT(*) AS sticker_count FROM stickers s
            JOIN diaries d ON d.id = s.diary_id
            WHERE d.user_id = ?1 AND d.is_deleted = 0
            GROUP BY s.diary_id
        )
        "#,
        params![user_id],
        |row| row.get(0),
    )
    .map_err(|e| DatabaseError::Sqlite(e).into())
}
