//! Account rows.
//!
//! The `UNIQUE` constraint on `users.email` is the real guard against
//! duplicate sign-ups; a violation surfaces as `AppError::DuplicateIdentity`.

use crate::errors::{AppError, AppResult, DatabaseError};
use crate::model::{parse_db_timestamp, to_db_timestamp, ProfileUpdate, Role, Timestamps, User};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use tracing::debug;

const USER_COLUMNS: &str = "id, email, password_hash, nickname, bio, avatar_url, role, \
                            onboarding_completed, created_at, updated_at";

/// Columns needed to insert a new account.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub nickname: &'a str,
    pub role: Role,
}

pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_db_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_raw: String = row.get(6)?;
    let role = Role::parse(&role_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("unknown role '{}'", role_raw).into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        nickname: row.get(3)?,
        bio: row.get(4)?,
        avatar_url: row.get(5)?,
        role,
        onboarding_completed: row.get(7)?,
        timestamps: Timestamps {
            created_at: timestamp_column(row, 8)?,
            updated_at: timestamp_column(row, 9)?,
        },
    })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Inserts a new account and returns its id.
///
/// # Errors
///
/// Returns `AppError::DuplicateIdentity` if the email is already stored.
pub fn insert_user(conn: &Connection, user: NewUser<'_>, now: DateTime<Utc>) -> AppResult<i64> {
    debug!("Inserting user row");

    let stamp = to_db_timestamp(now);
    conn.execute(
        r#"
        INSERT INTO users (email, password_hash, nickname, role, onboarding_completed, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
        "#,
        params![user.email, user.password_hash, user.nickname, user.role.as_str(), stamp],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::DuplicateIdentity(user.email.to_string())
        } else {
            DatabaseError::Sqlite(e).into()
        }
    })?;

    Ok(conn.last_insert_rowid())
}

/// Retrieves an account by id.
///
/// Returns `Ok(None)` if no account has this id.
pub fn get_user_by_id(conn: &Connection, user_id: i64) -> AppResult<Option<User>> {
    debug!("Getting user {}", user_id);
    super::optional(conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![user_id],
        map_user_row,
    ))
}

/// Retrieves an account by exact, case-sensitive email.
pub fn get_user_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    super::optional(conn.query_row(
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
        params![email],
        map_user_row,
    ))
}

/// Whether any account uses this exact email.
pub fn email_exists(conn: &Connection, email: &str) -> AppResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        params![email],
        |row| row.get(0),
    )
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Whether an account with this id exists.
pub fn user_exists(conn: &Connection, user_id: i64) -> AppResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        params![user_id],
        |row| row.get(0),
    )
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

fn ensure_updated(rows_affected: usize, user_id: i64) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::user_not_found(user_id));
    }
    Ok(())
}

/// Applies the provided profile fields; `None` fields keep their stored value.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the account does not exist.
pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    update: &ProfileUpdate,
    now: DateTime<Utc>,
) -> AppResult<()> {
    debug!("Updating profile of user {}", user_id);

    let rows_affected = conn
        .execute(
            r#"
            UPDATE users SET
                nickname = COALESCE(?2, nickname),
                bio = COALESCE(?3, bio),
                avatar_url = COALESCE(?4, avatar_url),
                updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                user_id,
                update.nickname,
                update.bio,
                update.avatar_url,
                to_db_timestamp(now)
            ],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, user_id)
}

/// Sets the onboarding flag. A user already onboarded keeps their row as is.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the account does not exist.
pub fn mark_onboarding_completed(
    conn: &Connection,
    user_id: i64,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let rows_affected = conn
        .execute(
            r#"
            UPDATE users SET
                updated_at = CASE WHEN onboarding_completed = 1 THEN updated_at ELSE ?2 END,
                onboarding_completed = 1
            WHERE id = ?1
            "#,
            params![user_id, to_db_timestamp(now)],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, user_id)
}

/// Changes the role of an account.
pub fn update_role(conn: &Connection, user_id: i64, role: Role, now: DateTime<Utc>) -> AppResult<()> {
    let rows_affected = conn
        .execute(
            "UPDATE users SET role = ?2, updated_at = ?3 WHERE id = ?1",
            params![user_id, role.as_str(), to_db_timestamp(now)],
        )
        .map_err(DatabaseError::Sqlite)?;

    ensure_updated(rows_affected, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use crate::errors::ErrorKind;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn alice() -> NewUser<'static> {
        NewUser {
            email: "alice@example.com",
            password_hash: "hash",
            nickname: "alice",
            role: Role::User,
        }
    }

    #[test]
    fn test_insert_and_get_user() {
        let conn = setup_test_db();
        let now = Utc::now();
        let id = insert_user(&conn, alice(), now).unwrap();

        let user = get_user_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);
        assert!(!user.onboarding_completed);
        assert_eq!(user.timestamps.created_at, user.timestamps.updated_at);

        let by_email = get_user_by_email(&conn, "alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, id);
    }

    #[test]
    fn test_duplicate_email_maps_to_duplicate_identity() {
        let conn = setup_test_db();
        insert_user(&conn, alice(), Utc::now()).unwrap();

        let err = insert_user(&conn, alice(), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateIdentity);
    }

    #[test]
    fn test_email_lookup_is_case_sensitive() {
        let conn = setup_test_db();
        insert_user(&conn, alice(), Utc::now()).unwrap();

        assert!(email_exists(&conn, "alice@example.com").unwrap());
        assert!(!email_exists(&conn, "Alice@example.com").unwrap());
        assert!(get_user_by_email(&conn, "ALICE@EXAMPLE.COM").unwrap().is_none());
    }

    #[test]
    fn test_update_profile_partial() {
        let conn = setup_test_db();
        let id = insert_user(&conn, alice(), Utc::now()).unwrap();

        let update = ProfileUpdate {
            bio: Some("likes fantasy webtoons".to_string()),
            ..ProfileUpdate::default()
        };
        update_profile(&conn, id, &update, Utc::now()).unwrap();

        let user = get_user_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(user.nickname, "alice");
        assert_eq!(user.bio.as_deref(), Some("likes fantasy webtoons"));
        assert!(user.avatar_url.is_none());
    }

    #[test]
    fn test_update_missing_user_is_not_found() {
        let conn = setup_test_db();
        let err = update_profile(&conn, 99, &ProfileUpdate::default(), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = mark_onboarding_completed(&conn, 99, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_onboarding_twice_keeps_first_timestamp() {
        let conn = setup_test_db();
        let created = Utc::now();
        let id = insert_user(&conn, alice(), created).unwrap();

        let first = created + chrono::Duration::seconds(10);
        mark_onboarding_completed(&conn, id, first).unwrap();
        mark_onboarding_completed(&conn, id, first + chrono::Duration::seconds(10)).unwrap();

        let user = get_user_by_id(&conn, id).unwrap().unwrap();
        assert!(user.onboarding_completed);
        assert_eq!(to_db_timestamp(user.timestamps.updated_at), to_db_timestamp(first));
    }

    #[test]
    fn test_update_role() {
        let conn = setup_test_db();
        let id = insert_user(&conn, alice(), Utc::now()).unwrap();
        update_role(&conn, id, Role::Admin, Utc::now()).unwrap();
        assert_eq!(get_user_by_id(&conn, id).unwrap().unwrap().role, Role::Admin);
    }
}
