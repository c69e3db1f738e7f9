//! Full-text search support for the note grid's search bar.
//!
//! # Responsibility
//! - Turn free user text into safe SQLite FTS5 match expressions.
//! - Classify FTS5 query failures.

pub mod fts;
