//! Search over a user's active diaries.
//!
//! A request may name several criteria but only one mode runs. Precedence is
//! keyword, then a complete date range, then genre, and with none of those
//! the plain newest-first listing.

use crate::db::diaries;
use crate::errors::{AppError, AppResult, FieldError};
use crate::model::Diary;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;

/// Caller-supplied search criteria, any of which may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub keyword: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub genre: Option<String>,
}

/// The single query mode a [`SearchCriteria`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Case-insensitive substring of title or memo.
    Keyword(String),
    /// Inclusive date bounds, latest date first.
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Exact genre, newest first.
    Genre(String),
    /// Every active diary, newest first.
    All,
}

/// The value as given, unless it is absent or only whitespace.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl SearchCriteria {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }

    pub fn genre(genre: impl Into<String>) -> Self {
        Self {
            genre: Some(genre.into()),
            ..Self::default()
        }
    }

    /// Picks the query mode by precedence.
    ///
    /// A lone start or end date does not form a range and is ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the chosen range ends before it starts.
    pub fn resolve(&self) -> AppResult<SearchQuery> {
        if let Some(keyword) = non_blank(&self.keyword) {
            return Ok(SearchQuery::Keyword(keyword.to_string()));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(AppError::Validation(vec![FieldError::new(
                    "endDate",
                    "end date must not be before start date",
                )]));
            }
            return Ok(SearchQuery::DateRange { start, end });
        }

        if let Some(genre) = non_blank(&self.genre) {
            return Ok(SearchQuery::Genre(genre.to_string()));
        }

        Ok(SearchQuery::All)
    }
}

impl SearchQuery {
    /// Runs the query against `user_id`'s active diaries.
    pub fn execute(&self, conn: &Connection, user_id: i64) -> AppResult<Vec<Diary>> {
        match self {
            SearchQuery::Keyword(keyword) => diaries::search_keyword(conn, user_id, keyword),
            SearchQuery::DateRange { start, end } => {
                diaries::search_date_range(conn, user_id, *start, *end)
            }
            SearchQuery::Genre(genre) => diaries::search_genre(conn, user_id, genre),
            SearchQuery::All => diaries::list_active(conn, user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_keyword_wins_over_everything() {
        let criteria = SearchCriteria {
            keyword: Some("  rofan ".to_string()),
            start_date: Some(day(1)),
            end_date: Some(day(31)),
            genre: Some("Fantasy".to_string()),
        };
        assert_eq!(criteria.resolve().unwrap(), SearchQuery::Keyword("  rofan ".to_string()));
    }

    #[test]
    fn test_genre_is_carried_untrimmed() {
        assert_eq!(
            SearchCriteria::genre(" Fantasy ").resolve().unwrap(),
            SearchQuery::Genre(" Fantasy ".to_string())
        );
    }

    #[test]
    fn test_blank_keyword_falls_through_to_range() {
        let criteria = SearchCriteria {
            keyword: Some("   ".to_string()),
            genre: Some("Fantasy".to_string()),
            ..SearchCriteria::date_range(day(1), day(31))
        };
        assert_eq!(
            criteria.resolve().unwrap(),
            SearchQuery::DateRange { start: day(1), end: day(31) }
        );
    }

    #[test]
    fn test_half_range_falls_through_to_genre() {
        let criteria = SearchCriteria {
            start_date: Some(day(1)),
            ..SearchCriteria::genre("Fantasy")
        };
        assert_eq!(criteria.resolve().unwrap(), SearchQuery::Genre("Fantasy".to_string()));
    }

    #[test]
    fn test_nothing_means_all() {
        assert_eq!(SearchCriteria::default().resolve().unwrap(), SearchQuery::All);
        assert_eq!(SearchCriteria::genre(" ").resolve().unwrap(), SearchQuery::All);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = SearchCriteria::date_range(day(31), day(1)).resolve().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
