//! Dispatches parsed commands to the account and diary managers.
//!
//! This is the boundary that knows who is calling: it resolves the access
//! token to a user and refuses to act on diaries that user does not own.

use super::{parse_date, CliArgs, Command, DiaryCommand};
use crate::auth::{bearer_token, TokenAuthority};
use crate::config::Config;
use crate::db::Database;
use crate::errors::{AppError, AppResult, FieldError};
use crate::model::{Diary, DiaryFields, ProfileUpdate, StickerSpec, User};
use crate::service::{AccountManager, DiaryManager, SearchCriteria};
use chrono::{Datelike, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// JSON body accepted by `diary create` and `diary update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryBody {
    #[serde(flatten)]
    pub fields: DiaryFields,
    #[serde(default)]
    pub stickers: Vec<StickerSpec>,
}

fn read_body<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };

    serde_json::from_str(&raw)
        .map_err(|e| AppError::Validation(vec![FieldError::new("body", e.to_string())]))
}

fn to_json<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Unexpected(format!("Failed to serialize response: {}", e)))
}

struct Session {
    accounts: AccountManager,
    diaries: DiaryManager,
    token: Option<String>,
}

impl Session {
    fn caller(&self) -> AppResult<User> {
        let token = self
            .token
            .as_deref()
            .map(bearer_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::InvalidCredential("an access token is required".to_string()))?;
        self.accounts.authenticate(token)
    }

    /// Loads a diary the caller owns. Someone else's diary reads as missing.
    fn owned_diary(&self, caller: &User, diary_id: i64) -> AppResult<Diary> {
        let detail = self.diaries.get_by_id(diary_id)?;
        if detail.diary.user_id != caller.id {
            debug!("User {} denied access to diary {}", caller.id, diary_id);
            return Err(AppError::diary_not_found(diary_id));
        }
        Ok(detail.diary)
    }

    /// Likes are open to the owner and to anyone for a public, active diary.
    fn likeable_diary(&self, caller: &User, diary_id: i64) -> AppResult<()> {
        let diary = self.diaries.get_by_id(diary_id)?.diary;
        if diary.user_id == caller.id || (diary.is_public && !diary.is_deleted) {
            return Ok(());
        }
        Err(AppError::diary_not_found(diary_id))
    }

    fn account(&self, command: Command) -> AppResult<Value> {
        match command {
            Command::Signup {
                email,
                password,
                nickname,
            } => to_json(&self.accounts.sign_up(&email, &password, &nickname)?),
            Command::Login { email, password } => {
                let (user, tokens) = self
                    .accounts
                    .login(&email, &password)
                    .map_err(AppError::for_login)?;
                Ok(json!({ "user": to_json(&user)?, "tokens": to_json(&tokens)? }))
            }
            Command::Refresh { refresh_token } => {
                to_json(&self.accounts.refresh_token(bearer_token(&refresh_token))?)
            }
            Command::Me => to_json(&self.caller()?),
            Command::Profile {
                nickname,
                bio,
                avatar_url,
            } => {
                let caller = self.caller()?;
                let update = ProfileUpdate {
                    nickname,
                    bio,
                    avatar_url,
                };
                to_json(&self.accounts.update_profile(caller.id, &update)?)
            }
            Command::Onboard => {
                let caller = self.caller()?;
                to_json(&self.accounts.complete_onboarding(caller.id)?)
            }
            Command::Diary { action } => self.diary(action),
        }
    }

    fn diary(&self, action: DiaryCommand) -> AppResult<Value> {
        // Reads of public data need no caller
        match &action {
            DiaryCommand::Public { id } => return to_json(&self.diaries.get_public_by_id(*id)?),
            DiaryCommand::Feed { limit } => return to_json(&self.diaries.list_public_feed(*limit)?),
            _ => {}
        }

        let caller = self.caller()?;
        match action {
            DiaryCommand::Create { file } => {
                let body: DiaryBody = read_body(&file)?;
                to_json(&self.diaries.create(caller.id, &body.fields, &body.stickers)?)
            }
            DiaryCommand::Get { id } => {
                self.owned_diary(&caller, id)?;
                to_json(&self.diaries.get_by_id(id)?)
            }
            DiaryCommand::List => to_json(&self.diaries.list_active(caller.id)?),
            DiaryCommand::TrashList => to_json(&self.diaries.list_trashed(caller.id)?),
            DiaryCommand::Update { id, file } => {
                self.owned_diary(&caller, id)?;
                let body: DiaryBody = read_body(&file)?;
                to_json(&self.diaries.update(id, &body.fields, &body.stickers)?)
            }
            DiaryCommand::Trash { id } => {
                self.owned_diary(&caller, id)?;
                to_json(&self.diaries.move_to_trash(id)?)
            }
            DiaryCommand::Restore { id } => {
                self.owned_diary(&caller, id)?;
                to_json(&self.diaries.restore(id)?)
            }
            DiaryCommand::Delete { id } => {
                self.owned_diary(&caller, id)?;
                self.diaries.delete(id)?;
                Ok(json!({ "deleted": id }))
            }
            DiaryCommand::Like { id } => {
                self.likeable_diary(&caller, id)?;
                to_json(&self.diaries.toggle_like(id)?)
            }
            DiaryCommand::Unlike { id } => {
                self.likeable_diary(&caller, id)?;
                to_json(&self.diaries.unlike(id)?)
            }
            DiaryCommand::TogglePublic { id } => {
                self.owned_diary(&caller, id)?;
                to_json(&self.diaries.toggle_public(id)?)
            }
            DiaryCommand::Stickers { id } => {
                self.owned_diary(&caller, id)?;
                to_json(&self.diaries.list_stickers(id)?)
            }
            DiaryCommand::Search {
                keyword,
                start_date,
                end_date,
                genre,
            } => {
                let criteria = SearchCriteria {
                    keyword,
                    start_date: start_date
                        .map(|raw| parse_date("startDate", &raw))
                        .transpose()?,
                    end_date: end_date.map(|raw| parse_date("endDate", &raw)).transpose()?,
                    genre,
                };
                to_json(&self.diaries.search(caller.id, &criteria)?)
            }
            DiaryCommand::Stats { year, month } => {
                let today = Utc::now().date_naive();
                let year = year.unwrap_or_else(|| today.year());
                let month = month.unwrap_or_else(|| today.month());
                to_json(&self.diaries.stats(caller.id, year, month)?)
            }
            DiaryCommand::Public { .. } | DiaryCommand::Feed { .. } => {
                Err(AppError::Unexpected("public command reached caller dispatch".to_string()))
            }
        }
    }
}

/// Opens the database, runs one command and returns its JSON output.
///
/// # Errors
///
/// Returns whatever the command fails with. Login failures are already
/// normalised so an unknown email and a wrong password look the same.
pub fn run(args: CliArgs, config: &Config) -> AppResult<Value> {
    let db = Database::open(&config.db_path)?;
    db.initialize_schema()?;

    let session = Session {
        accounts: AccountManager::new(db.clone(), TokenAuthority::from_config(config)),
        diaries: DiaryManager::new(db),
        token: args.token,
    };
    session.account(args.command)
}
