//! Core domain logic for Notecards.
//! This crate is the single source of truth for note persistence and the
//! editing policy the UI layer drives.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{
    now_epoch_ms, pick_color, ColorKey, Note, NoteId, PALETTE, PICKER_COLORS,
};
pub use repo::note_repo::{NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use search::fts::{build_match_expression, SearchError};
pub use service::editor::{
    CloseOutcome, Disposition, EditorError, EditorResult, EditorState, NoteEditor,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
