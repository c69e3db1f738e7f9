//! SQLite FTS5 match-expression building for note search.
//!
//! # Invariants
//! - User text is never passed to FTS5 unescaped.
//! - Every term must match (AND) and matches as a prefix, so the grid can
//!   filter while the user is still typing.
//! - Blank text, or text without any searchable characters, yields no
//!   expression; callers then fall back to the unfiltered listing.
//! - A character counts as searchable when `char::is_alphanumeric` says so.
//!   The `notes_fts` tokenizer treats letters, numbers and combining marks
//!   as word characters, so every kept term yields at least one token.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search helpers.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for query parsing and DB interaction.
#[derive(Debug)]
pub enum SearchError {
    /// Built expression was rejected by the FTS5 parser.
    InvalidQuery { query: String, message: String },
    Db(DbError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery { .. } => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Builds an FTS5 expression from free search-bar text.
///
/// `"buy mi"` becomes `"buy"* AND "mi"*`.
pub fn build_match_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"*")
}

/// Maps a query failure to `InvalidQuery` when FTS5 rejected the syntax.
pub fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    if is_match_syntax_error(&err) {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    SearchError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}
