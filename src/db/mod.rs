//! SQLite storage for users, diaries and stickers.
//!
//! Connections are pooled via r2d2. Every mutating service operation runs in
//! a single rusqlite transaction so a diary write and its sticker set commit
//! or roll back together.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `users`: Account rows
//! - `diaries`: Diary rows, lifecycle updates and search queries
//! - `stickers`: Sticker rows owned by diaries
//!
//! # Example
//!
//! ```no_run
//! use stickerdiary::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/stickerdiary.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod diaries;
pub mod schema;
pub mod stickers;
pub mod users;

use crate::constants::{DB_BUSY_TIMEOUT_MS, DB_POOL_MAX_SIZE};
use crate::errors::{AppResult, DatabaseError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates the SQLite database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database file cannot be opened
    /// - Connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(DB_POOL_MAX_SIZE)
            .connection_customizer(Box::new(SqliteConfig))
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        // Test the connection
        let conn = pool.get().map_err(DatabaseError::Pool)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(DatabaseError::Sqlite)?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent and safe to call multiple times.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }

    /// Runs `work` inside one immediate transaction.
    ///
    /// The transaction commits only when `work` returns `Ok`; any error rolls
    /// back every write made through it.
    pub fn transaction<T, F>(&self, work: F) -> AppResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
            .map_err(DatabaseError::Sqlite)?;
        let value = work(&tx)?;
        tx.commit().map_err(DatabaseError::Sqlite)?;
        Ok(value)
    }

    /// Runs read-only `work` against a pooled connection.
    pub fn read<T, F>(&self, work: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = self.get_conn()?;
        work(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("Database")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

/// Connection customizer applied to every pooled connection.
#[derive(Debug)]
struct SqliteConfig;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for SqliteConfig {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        // Foreign keys are per-connection in SQLite
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_millis(u64::from(DB_BUSY_TIMEOUT_MS)))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        register_functions(conn)
    }

    fn on_release(&self, _conn: Connection) {}
}

/// Registers the scalar SQL functions the diary queries rely on.
///
/// `unicode_lower(text)` folds case with Unicode rules; SQLite's built-in
/// `lower()` only folds ASCII. NULL passes through unchanged.
pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
}

/// Maps `QueryReturnedNoRows` to `Ok(None)`.
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> AppResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e).into()),
    }
}
