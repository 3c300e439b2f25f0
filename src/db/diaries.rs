//! Diary rows: inserts, lifecycle updates and listing/search queries.
//!
//! Every mutating statement also stamps `updated_at`. Queries that list a
//! user's diaries never mix active and trashed rows.

use super::users::timestamp_column;
use crate::constants::DATE_FORMAT_ISO;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::model::{to_db_timestamp, Diary, DiaryFields, Timestamps};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Params, Row};
use tracing::debug;

const DIARY_COLUMNS: &str = "id, user_id, title, memo, date, genre, is_public, is_deleted, \
                             deleted_at, like_count, created_at, updated_at";

fn map_diary_row(row: &Row<'_>) -> rusqlite::Result<Diary> {
    let date = match row.get::<_, Option<String>>(4)? {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, DATE_FORMAT_ISO).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
            })?,
        ),
        None => None,
    };
    let deleted_at = match row.get::<_, Option<String>>(8)? {
        Some(_) => Some(timestamp_column(row, 8)?),
        None => None,
    };
    let like_count: i64 = row.get(9)?;

    Ok(Diary {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        memo: row.get(3)?,
        date,
        genre: row.get(5)?,
        is_public: row.get(6)?,
        is_deleted: row.get(7)?,
        deleted_at,
        like_count: u64::try_from(like_count)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(9, like_count))?,
        timestamps: Timestamps {
            created_at: timestamp_column(row, 10)?,
            updated_at: timestamp_column(row, 11)?,
        },
    })
}

fn date_param(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT_ISO).to_string())
}

fn query_diaries<P: Params>(conn: &Connection, sql: &str, params: P) -> AppResult<Vec<Diary>> {
    let mut stmt = conn.prepare_cached(sql).map_err(DatabaseError::Sqlite)?;
    let diaries = stmt
        .query_map(params, map_diary_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(diaries)
}

fn ensure_updated(rows_affected: usize, diary_id: i64) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::diary_not_found(diary_id));
    }
    Ok(())
}

/// Inserts an active, unliked diary and returns its id.
pub fn insert_diary(
    conn: &Connection,
    user_id: i64,
    fields: &DiaryFields,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    debug!("Inserting diary for user {}", user_id);

    conn.execute(
        r#"
        INSERT INTO diaries (user_id, title, memo, date, genre, is_public, is_deleted, deleted_at,
                             like_count, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, 0, ?7, ?7)
        "#,
        params![
            user_id,
            fields.title,
            fields.memo,
            date_param(fields.date),
            fields.genre,
            fields.is_public,
            to_db_timestamp(now)
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(conn.last_insert_rowid())
}

/// Retrieves a diary by id, whatever its state.
pub fn get_diary(conn: &Connection, diary_id: i64) -> AppResult<Option<Diary>> {
    super::optional(conn.query_row(
        &format!("SELECT {} FROM diaries WHERE id = ?1", DIARY_COLUMNS),
        params![diary_id],
        map_diary_row,
    ))
}

/// Retrieves a diary only if it is public and not in the trash.
pub fn get_public_diary(conn: &Connection, diary_id: i64) -> AppResult<Option<Diary>> {
    super::optional(conn.query_row(
        &format!(
            "SELECT {} FROM diaries WHERE id = ?1 AND is_public = 1 AND is_deleted = 0",
            DIARY_COLUMNS
        ),
        params![diary_id],
        map_diary_row,
    ))
}

/// Overwrites title, memo, date, genre and the public flag.
///
/// Trash state and like count are left alone.
pub fn update_fields(
    conn: &Connection,
    diary_id: i64,
    fields: &DiaryFields,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let rows_affected = conn
        .execute(
            r#"
            UPDATE diaries SET
                title = ?2, memo = ?3, date = ?4, genre = ?5, is_public = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                diary_id,
                fields.title,
                fields.memo,
                date_param(fields.date),
                fields.genre,
                fields.is_public,
                to_db_timestamp(now)
            ],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, diary_id)
}

/// Marks a diary trashed and stamps `deleted_at` with `now`.
///
/// Trashing an already trashed diary re-stamps the deletion instant.
pub fn mark_trashed(conn: &Connection, diary_id: i64, now: DateTime<Utc>) -> AppResult<()> {
    let stamp = to_db_timestamp(now);
    let rows_affected = conn
        .execute(
            "UPDATE diaries SET is_deleted = 1, deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
            params![diary_id, stamp],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, diary_id)
}

/// Clears the trashed flag and the deletion instant together.
pub fn clear_trashed(conn: &Connection, diary_id: i64, now: DateTime<Utc>) -> AppResult<()> {
    let rows_affected = conn
        .execute(
            "UPDATE diaries SET is_deleted = 0, deleted_at = NULL, updated_at = ?2 WHERE id = ?1",
            params![diary_id, to_db_timestamp(now)],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, diary_id)
}

/// Deletes the diary row itself. Owned stickers must already be gone.
pub fn delete_diary(conn: &Connection, diary_id: i64) -> AppResult<()> {
    let rows_affected = conn
        .execute("DELETE FROM diaries WHERE id = ?1", params![diary_id])
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, diary_id)
}

/// Atomically adds one like.
pub fn increment_like(conn: &Connection, diary_id: i64, now: DateTime<Utc>) -> AppResult<()> {
    let rows_affected = conn
        .execute(
            "UPDATE diaries SET like_count = like_count + 1, updated_at = ?2 WHERE id = ?1",
            params![diary_id, to_db_timestamp(now)],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, diary_id)
}

/// Atomically removes one like, stopping at zero.
pub fn decrement_like(conn: &Connection, diary_id: i64, now: DateTime<Utc>) -> AppResult<()> {
    let rows_affected = conn
        .execute(
            "UPDATE diaries SET like_count = MAX(like_count - 1, 0), updated_at = ?2 WHERE id = ?1",
            params![diary_id, to_db_timestamp(now)],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, diary_id)
}

/// Flips the public flag in place.
pub fn flip_public(conn: &Connection, diary_id: i64, now: DateTime<Utc>) -> AppResult<()> {
    let rows_affected = conn
        .execute(
            "UPDATE diaries SET is_public = 1 - is_public, updated_at = ?2 WHERE id = ?1",
            params![diary_id, to_db_timestamp(now)],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, diary_id)
}

/// A user's active diaries, newest first.
pub fn list_active(conn: &Connection, user_id: i64) -> AppResult<Vec<Diary>> {
    query_diaries(
        conn,
        &format!(
            "SELECT {} FROM diaries WHERE user_id = ?1 AND is_deleted = 0 \
             ORDER BY created_at DESC, id DESC",
            DIARY_COLUMNS
        ),
        params![user_id],
    )
}

/// A user's trashed diaries, most recently trashed first.
pub fn list_trashed(conn: &Connection, user_id: i64) -> AppResult<Vec<Diary>> {
    query_diaries(
        conn,
        &format!(
            "SELECT {} FROM diaries WHERE user_id = ?1 AND is_deleted = 1 \
             ORDER BY deleted_at DESC, id DESC",
            DIARY_COLUMNS
        ),
        params![user_id],
    )
}

/// Active diaries whose title or memo contains `keyword`, ignoring case.
pub fn search_keyword(conn: &Connection, user_id: i64, keyword: &str) -> AppResult<Vec<Diary>> {
    query_diaries(
        conn,
        &format!(
            "SELECT {} FROM diaries WHERE user_id = ?1 AND is_deleted = 0 \
             AND (instr(unicode_lower(title), unicode_lower(?2)) > 0 \
                  OR instr(unicode_lower(COALESCE(memo, '')), unicode_lower(?2)) > 0) \
             ORDER BY created_at DESC, id DESC",
            DIARY_COLUMNS
        ),
        params![user_id, keyword],
    )
}

/// Active diaries dated within `[start, end]`, latest date first.
pub fn search_date_range(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<Diary>> {
    query_diaries(
        conn,
        &format!(
            "SELECT {} FROM diaries WHERE user_id = ?1 AND is_deleted = 0 \
             AND date IS NOT NULL AND date BETWEEN ?2 AND ?3 \
             ORDER BY date DESC, id DESC",
            DIARY_COLUMNS
        ),
        params![
            user_id,
            start.format(DATE_FORMAT_ISO).to_string(),
            end.format(DATE_FORMAT_ISO).to_string()
        ],
    )
}

/// Active diaries with exactly this genre, newest first.
pub fn search_genre(conn: &Connection, user_id: i64, genre: &str) -> AppResult<Vec<Diary>> {
    query_diaries(
        conn,
        &format!(
            "SELECT {} FROM diaries WHERE user_id = ?1 AND is_deleted = 0 AND genre = ?2 \
             ORDER BY created_at DESC, id DESC",
            DIARY_COLUMNS
        ),
        params![user_id, genre],
    )
}

/// Public, active diaries across all users, newest first.
pub fn list_public(conn: &Connection, limit: u32) -> AppResult<Vec<Diary>> {
    query_diaries(
        conn,
        &format!(
            "SELECT {} FROM diaries WHERE is_public = 1 AND is_deleted = 0 \
             ORDER BY created_at DESC, id DESC LIMIT ?1",
            DIARY_COLUMNS
        ),
        params![limit],
    )
}

/// Number of a user's active diaries.
pub fn count_active(conn: &Connection, user_id: i64) -> AppResult<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM diaries WHERE user_id = ?1 AND is_deleted = 0",
        params![user_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count.max(0) as u64)
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Number of a user's active diaries created in the given UTC month.
pub fn count_active_in_month(
    conn: &Connection,
    user_id: i64,
    year: i32,
    month: u32,
) -> AppResult<u64> {
    let prefix = format!("{:04}-{:02}", year, month);
    conn.query_row(
        "SELECT COUNT(*) FROM diaries WHERE user_id = ?1 AND is_deleted = 0 \
         AND substr(created_at, 1, 7) = ?2",
        params![user_id, prefix],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count.max(0) as u64)
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::register_functions;
    use crate::db::schema::create_tables;
    use crate::errors::ErrorKind;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();
        create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (email, password_hash, nickname, created_at, updated_at)
             VALUES ('a@example.com', 'hash', 'alice', 'now', 'now')",
            [],
        )
        .unwrap();
        conn
    }

    fn fields(title: &str) -> DiaryFields {
        DiaryFields::titled(title)
    }

    #[test]
    fn test_insert_defaults() {
        let conn = setup_test_db();
        let id = insert_diary(&conn, 1, &fields("first"), Utc::now()).unwrap();

        let diary = get_diary(&conn, id).unwrap().unwrap();
        assert_eq!(diary.user_id, 1);
        assert!(!diary.is_public);
        assert!(!diary.is_deleted);
        assert!(diary.deleted_at.is_none());
        assert_eq!(diary.like_count, 0);
    }

    #[test]
    fn test_trash_and_restore_pair_flags() {
        let conn = setup_test_db();
        let id = insert_diary(&conn, 1, &fields("first"), Utc::now()).unwrap();

        mark_trashed(&conn, id, Utc::now()).unwrap();
        let diary = get_diary(&conn, id).unwrap().unwrap();
        assert!(diary.is_deleted && diary.deleted_at.is_some());

        clear_trashed(&conn, id, Utc::now()).unwrap();
        let diary = get_diary(&conn, id).unwrap().unwrap();
        assert!(!diary.is_deleted && diary.deleted_at.is_none());
    }

    #[test]
    fn test_decrement_like_saturates() {
        let conn = setup_test_db();
        let id = insert_diary(&conn, 1, &fields("first"), Utc::now()).unwrap();

        decrement_like(&conn, id, Utc::now()).unwrap();
        assert_eq!(get_diary(&conn, id).unwrap().unwrap().like_count, 0);

        increment_like(&conn, id, Utc::now()).unwrap();
        increment_like(&conn, id, Utc::now()).unwrap();
        decrement_like(&conn, id, Utc::now()).unwrap();
        assert_eq!(get_diary(&conn, id).unwrap().unwrap().like_count, 1);
    }

    #[test]
    fn test_like_count_beyond_u32_is_kept() {
        let conn = setup_test_db();
        let id = insert_diary(&conn, 1, &fields("popular"), Utc::now()).unwrap();
        conn.execute(
            "UPDATE diaries SET like_count = ?2 WHERE id = ?1",
            params![id, i64::from(u32::MAX)],
        )
        .unwrap();

        increment_like(&conn, id, Utc::now()).unwrap();
        increment_like(&conn, id, Utc::now()).unwrap();
        assert_eq!(
            get_diary(&conn, id).unwrap().unwrap().like_count,
            u64::from(u32::MAX) + 2
        );
    }

    #[test]
    fn test_keyword_folds_non_ascii_case() {
        let conn = setup_test_db();
        insert_diary(&conn, 1, &fields("École journal"), Utc::now()).unwrap();
        let mut memo = fields("plain");
        memo.memo = Some("ÜBER die Straße".to_string());
        insert_diary(&conn, 1, &memo, Utc::now()).unwrap();

        assert_eq!(search_keyword(&conn, 1, "école").unwrap().len(), 1);
        assert_eq!(search_keyword(&conn, 1, "ÉCOLE").unwrap().len(), 1);
        assert_eq!(search_keyword(&conn, 1, "über").unwrap().len(), 1);
        assert!(search_keyword(&conn, 1, "ecole").unwrap().is_empty());
    }

    #[test]
    fn test_flip_public() {
        let conn = setup_test_db();
        let id = insert_diary(&conn, 1, &fields("first"), Utc::now()).unwrap();

        flip_public(&conn, id, Utc::now()).unwrap();
        assert!(get_diary(&conn, id).unwrap().unwrap().is_public);
        flip_public(&conn, id, Utc::now()).unwrap();
        assert!(!get_diary(&conn, id).unwrap().unwrap().is_public);
    }

    #[test]
    fn test_public_lookup_excludes_private_and_trashed() {
        let conn = setup_test_db();
        let private_id = insert_diary(&conn, 1, &fields("private"), Utc::now()).unwrap();
        let mut public_fields = fields("public");
        public_fields.is_public = true;
        let public_id = insert_diary(&conn, 1, &public_fields, Utc::now()).unwrap();

        assert!(get_public_diary(&conn, private_id).unwrap().is_none());
        assert!(get_public_diary(&conn, public_id).unwrap().is_some());

        mark_trashed(&conn, public_id, Utc::now()).unwrap();
        assert!(get_public_diary(&conn, public_id).unwrap().is_none());
    }

    #[test]
    fn test_mutations_on_missing_diary_are_not_found() {
        let conn = setup_test_db();
        let now = Utc::now();
        let results = [
            update_fields(&conn, 9, &fields("x"), now),
            mark_trashed(&conn, 9, now),
            clear_trashed(&conn, 9, now),
            delete_diary(&conn, 9),
            increment_like(&conn, 9, now),
            decrement_like(&conn, 9, now),
            flip_public(&conn, 9, now),
        ];
        for result in results {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        }
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let conn = setup_test_db();
        for (title, day) in [("a", 1), ("b", 15), ("c", 31)] {
            let mut f = fields(title);
            f.date = NaiveDate::from_ymd_opt(2026, 1, day);
            insert_diary(&conn, 1, &f, Utc::now()).unwrap();
        }
        insert_diary(&conn, 1, &fields("undated"), Utc::now()).unwrap();

        let found = search_date_range(
            &conn,
            1,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
        .unwrap();
        let titles: Vec<&str> = found.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn test_count_active_in_month() {
        let conn = setup_test_db();
        let jan = DateTime::parse_from_rfc3339("2026-01-10T00:00:00Z").unwrap().with_timezone(&Utc);
        let feb = DateTime::parse_from_rfc3339("2026-02-10T00:00:00Z").unwrap().with_timezone(&Utc);
        insert_diary(&conn, 1, &fields("jan"), jan).unwrap();
        insert_diary(&conn, 1, &fields("feb"), feb).unwrap();

        assert_eq!(count_active_in_month(&conn, 1, 2026, 1).unwrap(), 1);
        assert_eq!(count_active_in_month(&conn, 1, 2026, 3).unwrap(), 0);
        assert_eq!(count_active(&conn, 1).unwrap(), 2);
    }
}
