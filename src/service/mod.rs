//! Core operations over accounts, diaries and stickers.
//!
//! Every operation takes the acting identity as an explicit argument. Diary
//! operations resolve the diary by id only; restricting a caller to their own
//! diaries is left to the boundary that calls in.
//!
//! # Module Structure
//!
//! - `account`: Sign-up, login, token refresh and profile changes
//! - `diary`: The diary lifecycle (create, update, trash, restore, delete, likes)
//! - `stickers`: Whole-set sticker replacement used inside diary writes
//! - `search`: Keyword, date-range and genre queries

pub mod account;
pub mod diary;
pub mod search;
pub mod stickers;

pub use account::AccountManager;
pub use diary::DiaryManager;
pub use search::{SearchCriteria, SearchQuery};
