#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
use stickerdiary::auth::TokenAuthority;
use stickerdiary::db::Database;
use stickerdiary::model::User;
use stickerdiary::service::{AccountManager, DiaryManager};
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Managers over a fresh database in a temporary directory.
pub struct TestApp {
    _dir: TempDir,
    pub db: Database,
    pub accounts: AccountManager,
    pub diaries: DiaryManager,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_token_ttls(3600, 604800)
    }

    pub fn with_token_ttls(access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let db = Database::open(&dir.path().join("stickerdiary.db")).expect("failed to open db");
        db.initialize_schema().expect("failed to create schema");

        let tokens = TokenAuthority::new(TEST_SECRET.as_bytes(), access_ttl_secs, refresh_ttl_secs);
        TestApp {
            _dir: dir,
            accounts: AccountManager::new(db.clone(), tokens),
            diaries: DiaryManager::new(db.clone()),
            db,
        }
    }

    pub fn alice(&self) -> User {
        self.accounts
            .sign_up("alice@example.com", "pw1", "alice")
            .expect("sign up alice")
    }

    pub fn bob(&self) -> User {
        self.accounts
            .sign_up("bob@example.com", "pw2", "bob")
            .expect("sign up bob")
    }
}

/// Creates a `Command` for the `stickerdiary` binary with a clean environment
/// pointing at `db_path`.
pub fn stickerdiary_command(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stickerdiary").expect("stickerdiary binary not built");
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    cmd.env("STICKERDIARY_DB", db_path)
        .env("STICKERDIARY_TOKEN_SECRET", TEST_SECRET)
        .env("STICKERDIARY_LOG_LEVEL", "error");
    cmd
}
