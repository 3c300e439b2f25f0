/*!
# stickerdiary

Backend core for a diary whose entries carry free text plus a collage of
positioned stickers. Users trash and restore diaries, share them publicly,
collect likes, and authenticate with stateless bearer tokens.

## Architecture

- `auth`: Password hashing and the token authority
- `cli`: Command-line boundary, including ownership checks
- `config`: Configuration loading and validation
- `db`: SQLite storage for users, diaries and stickers
- `errors`: Error taxonomy and external error codes
- `logging`: Tracing subscriber setup
- `model`: Domain types
- `service`: Account, diary, sticker and search operations
- `validation`: Field-level input checks

## Usage Example

```rust,no_run
use stickerdiary::auth::TokenAuthority;
use stickerdiary::db::Database;
use stickerdiary::model::{DiaryFields, StickerSpec};
use stickerdiary::service::{AccountManager, DiaryManager};
use stickerdiary::Config;

fn main() -> stickerdiary::AppResult<()> {
    let config = Config::load()?;
    let db = Database::open(&config.db_path)?;
    db.initialize_schema()?;

    let accounts = AccountManager::new(db.clone(), TokenAuthority::from_config(&config));
    let diaries = DiaryManager::new(db);

    let alice = accounts.sign_up("alice@example.com", "pw1", "alice")?;
    diaries.create(
        alice.id,
        &DiaryFields::titled("First entry"),
        &[StickerSpec::new("emoji", "sparkles.png").at(40, 60)],
    )?;
    Ok(())
}
```
*/

/// Password hashing and bearer tokens
pub mod auth;
/// Command-line interface for parsing and dispatching user commands
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Constants shared across the crate
pub mod constants;
/// SQLite storage
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Logging setup
pub mod logging;
/// Domain types
pub mod model;
/// Core operations
pub mod service;
/// Input validation
pub mod validation;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use service::{AccountManager, DiaryManager};
