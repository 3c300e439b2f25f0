//! Command-line interface.
//!
//! Every command prints one JSON document on stdout. Commands acting for a
//! signed-in user take an access token through `--token` or the
//! `STICKERDIARY_ACCESS_TOKEN` environment variable.

pub mod run;

use crate::constants::{APP_DESCRIPTION, APP_NAME, DATE_FORMAT_ISO, ENV_VAR_ACCESS_TOKEN};
use crate::errors::{AppError, AppResult, FieldError};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use run::run;

/// Default number of diaries returned by `diary feed`.
pub const DEFAULT_FEED_LIMIT: u32 = 20;

#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// Access token of the acting user (a leading "Bearer " is accepted)
    #[arg(long, global = true, env = ENV_VAR_ACCESS_TOKEN, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Register a new account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        nickname: String,
    },
    /// Log in and receive a token pair
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Exchange a refresh token for a new token pair
    Refresh {
        #[arg(long)]
        refresh_token: String,
    },
    /// Show the signed-in account
    Me,
    /// Update profile fields; omitted fields are left as they are
    Profile {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// Mark onboarding as completed
    Onboard,
    /// Manage diaries
    Diary {
        #[command(subcommand)]
        action: DiaryCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum DiaryCommand {
    /// Create a diary from a JSON body (use "-" for stdin)
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Show one of your diaries with its stickers
    Get { id: i64 },
    /// Show a public diary; no token needed
    Public { id: i64 },
    /// List your active diaries, newest first
    List,
    /// List your trashed diaries
    TrashList,
    /// Replace a diary's fields and stickers from a JSON body
    Update {
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    /// Move a diary to the trash
    Trash { id: i64 },
    /// Restore a diary from the trash
    Restore { id: i64 },
    /// Permanently delete a diary and its stickers
    Delete { id: i64 },
    /// Add a like
    Like { id: i64 },
    /// Remove a like
    Unlike { id: i64 },
    /// Flip a diary between public and private
    TogglePublic { id: i64 },
    /// List a diary's stickers by z-index
    Stickers { id: i64 },
    /// Search your active diaries (keyword > date range > genre)
    Search {
        #[arg(short, long)]
        keyword: Option<String>,
        /// Start of the date range (YYYY-MM-DD or YYYYMMDD)
        #[arg(long)]
        start_date: Option<String>,
        /// End of the date range (YYYY-MM-DD or YYYYMMDD)
        #[arg(long)]
        end_date: Option<String>,
        #[arg(short, long)]
        genre: Option<String>,
    },
    /// Show diary and sticker statistics (defaults to the current month)
    Stats {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// List recent public diaries of all users
    Feed {
        #[arg(long, default_value_t = DEFAULT_FEED_LIMIT)]
        limit: u32,
    },
}

impl Command {
    /// Short name used for the root tracing span.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Signup { .. } => "signup",
            Command::Login { .. } => "login",
            Command::Refresh { .. } => "refresh",
            Command::Me => "me",
            Command::Profile { .. } => "profile",
            Command::Onboard => "onboard",
            Command::Diary { .. } => "diary",
        }
    }
}

/// Parses a date given as `YYYY-MM-DD` or `YYYYMMDD`.
///
/// # Errors
///
/// Returns a validation error naming `field` if neither format matches.
pub fn parse_date(field: &str, raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT_ISO)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .map_err(|_| {
            AppError::Validation(vec![FieldError::new(
                field,
                "date must be YYYY-MM-DD or YYYYMMDD",
            )])
        })
}
