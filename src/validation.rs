//! Field-level input checks.
//!
//! Each check collects every problem it finds rather than stopping at the
//! first, so a caller can report all offending fields at once.

use crate::constants::{
    MAX_BIO_LEN, MAX_EMAIL_LEN, MAX_GENRE_LEN, MAX_NICKNAME_LEN, MAX_STICKER_SRC_LEN,
    MAX_STICKER_TYPE_LEN, MAX_TITLE_LEN, MIN_NICKNAME_LEN,
};
use crate::errors::{AppError, AppResult, FieldError};
use crate::model::{DiaryFields, ProfileUpdate, StickerSpec};

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn finish(errors: Vec<FieldError>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn check_nickname(nickname: &str, errors: &mut Vec<FieldError>) {
    let len = char_len(nickname.trim());
    if !(MIN_NICKNAME_LEN..=MAX_NICKNAME_LEN).contains(&len) {
        errors.push(FieldError::new(
            "nickname",
            format!(
                "nickname must be between {} and {} characters",
                MIN_NICKNAME_LEN, MAX_NICKNAME_LEN
            ),
        ));
    }
}

/// Whether `email` looks like `local@domain.tld` with no whitespace.
pub fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.ends_with('.'),
        None => false,
    }
}

/// Checks sign-up input.
pub fn validate_sign_up(email: &str, password: &str, nickname: &str) -> AppResult<()> {
    let mut errors = Vec::new();

    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    } else if !is_well_formed_email(email) {
        errors.push(FieldError::new("email", "email is malformed"));
    } else if char_len(email) > MAX_EMAIL_LEN {
        errors.push(FieldError::new(
            "email",
            format!("email must be at most {} characters", MAX_EMAIL_LEN),
        ));
    }

    if password.trim().is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }

    check_nickname(nickname, &mut errors);
    finish(errors)
}

/// Checks a partial profile update. Absent fields are not checked.
pub fn validate_profile_update(update: &ProfileUpdate) -> AppResult<()> {
    let mut errors = Vec::new();

    if let Some(nickname) = &update.nickname {
        check_nickname(nickname, &mut errors);
    }
    if let Some(bio) = &update.bio {
        if char_len(bio) > MAX_BIO_LEN {
            errors.push(FieldError::new(
                "bio",
                format!("bio must be at most {} characters", MAX_BIO_LEN),
            ));
        }
    }

    finish(errors)
}

fn check_stickers(stickers: &[StickerSpec], errors: &mut Vec<FieldError>) {
    for (i, sticker) in stickers.iter().enumerate() {
        if sticker.sticker_type.trim().is_empty() {
            errors.push(FieldError::new(
                format!("stickers[{}].type", i),
                "sticker type is required",
            ));
        } else if char_len(&sticker.sticker_type) > MAX_STICKER_TYPE_LEN {
            errors.push(FieldError::new(
                format!("stickers[{}].type", i),
                format!("sticker type must be at most {} characters", MAX_STICKER_TYPE_LEN),
            ));
        }

        if sticker.src.trim().is_empty() {
            errors.push(FieldError::new(
                format!("stickers[{}].src", i),
                "sticker source is required",
            ));
        } else if char_len(&sticker.src) > MAX_STICKER_SRC_LEN {
            errors.push(FieldError::new(
                format!("stickers[{}].src", i),
                format!("sticker source must be at most {} characters", MAX_STICKER_SRC_LEN),
            ));
        }

        if !sticker.rotation.is_finite() {
            errors.push(FieldError::new(
                format!("stickers[{}].rotation", i),
                "rotation must be a finite number",
            ));
        }
    }
}

/// Checks diary fields together with the sticker set written alongside them.
pub fn validate_diary(fields: &DiaryFields, stickers: &[StickerSpec]) -> AppResult<()> {
    let mut errors = Vec::new();

    if fields.title.trim().is_empty() {
        errors.push(FieldError::new("title", "title is required"));
    } else if char_len(&fields.title) > MAX_TITLE_LEN {
        errors.push(FieldError::new(
            "title",
            format!("title must be at most {} characters", MAX_TITLE_LEN),
        ));
    }

    if let Some(genre) = &fields.genre {
        if char_len(genre) > MAX_GENRE_LEN {
            errors.push(FieldError::new(
                "genre",
                format!("genre must be at most {} characters", MAX_GENRE_LEN),
            ));
        }
    }

    check_stickers(stickers, &mut errors);
    finish(errors)
}
