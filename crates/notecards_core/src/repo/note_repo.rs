//! Note store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist, list, look up and delete note cards.
//! - Commit explicit local copies through `save`.
//!
//! # Invariants
//! - Listing order is `date_created DESC`, ties by insertion order (newest
//!   insert first).
//! - `delete` is benign for ids that are already gone.
//! - Save failures are logged and surfaced, never swallowed.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::note::{ColorKey, Note, NoteId};
use crate::search::fts::{build_match_expression, map_query_error, SearchError};
use log::{debug, error, info};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    notes.id AS id,
    notes.title AS title,
    notes.content AS content,
    notes.color_key AS color_key,
    notes.date_created AS date_created
FROM notes";

const NOTE_ORDER_SQL: &str = " ORDER BY notes.date_created DESC, notes.seq DESC";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy for note persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Database could not be opened or migrated. Fatal at startup.
    StorageUnavailable(DbError),
    /// Committing a note's fields failed.
    SaveFailed { note_id: NoteId, source: DbError },
    NotFound(NoteId),
    DuplicateId(NoteId),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
    Search(SearchError),
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "note storage unavailable: {err}"),
            Self::SaveFailed { note_id, source } => {
                write!(f, "failed to save note {note_id}: {source}")
            }
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateId(id) => write!(f, "note already exists: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Search(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::SaveFailed { source, .. } => Some(source),
            Self::Search(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::DuplicateId(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SearchError> for StoreError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

/// Persistence contract for note cards.
pub trait NoteStore {
    /// Returns every persisted note, newest first.
    fn list_all(&self) -> StoreResult<Vec<Note>>;
    /// Gets one note by id.
    fn get(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Inserts a new note and returns the stored record.
    fn insert(&mut self, note: &Note) -> StoreResult<Note>;
    /// Deletes by id. Returns `false` when nothing was removed.
    fn delete(&mut self, id: NoteId) -> StoreResult<bool>;
    /// Commits title, content and color of a local copy.
    fn save(&mut self, note: &Note) -> StoreResult<Note>;
    /// Lists notes matching all terms of `text`, newest first.
    ///
    /// Blank text behaves like [`NoteStore::list_all`].
    fn search(&self, text: &str) -> StoreResult<Vec<Note>>;
}

/// SQLite-backed note store owning its connection.
pub struct SqliteNoteStore {
    conn: Connection,
}

impl SqliteNoteStore {
    /// Opens (or creates) a note database file.
    ///
    /// # Errors
    /// - `StorageUnavailable` when the file cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path).map_err(StoreError::StorageUnavailable)?;
        Self::try_new(conn)
    }

    /// Opens a fresh in-memory note database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(StoreError::StorageUnavailable)?;
        Self::try_new(conn)
    }

    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NoteStore for SqliteNoteStore {
    fn list_all(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL}{NOTE_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE notes.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn insert(&mut self, note: &Note) -> StoreResult<Note> {
        let result = self.conn.execute(
            "INSERT INTO notes (id, title, content, color_key, date_created)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.color.as_str(),
                note.date_created,
            ],
        );

        if let Err(err) = result {
            if is_constraint_violation(&err) {
                error!(
                    "event=note_insert module=repo status=error note_id={} error_code=duplicate_id",
                    note.id
                );
                return Err(StoreError::DuplicateId(note.id));
            }
            error!(
                "event=note_insert module=repo status=error note_id={} error={}",
                note.id, err
            );
            return Err(err.into());
        }

        info!(
            "event=note_insert module=repo status=ok note_id={} color={}",
            note.id, note.color
        );
        self.get(note.id)?.ok_or(StoreError::NotFound(note.id))
    }

    fn delete(&mut self, id: NoteId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            debug!("event=note_delete module=repo status=noop note_id={id}");
            return Ok(false);
        }
        info!("event=note_delete module=repo status=ok note_id={id}");
        Ok(true)
    }

    fn save(&mut self, note: &Note) -> StoreResult<Note> {
        let changed = self
            .conn
            .execute(
                "UPDATE notes
                 SET
                    title = ?2,
                    content = ?3,
                    color_key = ?4
                 WHERE id = ?1;",
                params![
                    note.id.to_string(),
                    note.title.as_str(),
                    note.content.as_str(),
                    note.color.as_str(),
                ],
            )
            .map_err(|err| {
                error!(
                    "event=note_save module=repo status=error note_id={} error={}",
                    note.id, err
                );
                StoreError::SaveFailed {
                    note_id: note.id,
                    source: DbError::Sqlite(err),
                }
            })?;

        if changed == 0 {
            error!(
                "event=note_save module=repo status=error note_id={} error_code=not_found",
                note.id
            );
            return Err(StoreError::NotFound(note.id));
        }

        info!("event=note_save module=repo status=ok note_id={}", note.id);
        self.get(note.id)?.ok_or(StoreError::NotFound(note.id))
    }

    fn search(&self, text: &str) -> StoreResult<Vec<Note>> {
        let Some(match_expr) = build_match_expression(text) else {
            return self.list_all();
        };

        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             JOIN notes_fts ON notes_fts.rowid = notes.seq
             WHERE notes_fts MATCH ?1{NOTE_ORDER_SQL};"
        ))?;
        let mut rows = stmt
            .query([match_expr.as_str()])
            .map_err(|err| map_query_error(err, &match_expr))?;
        let mut notes = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| map_query_error(err, &match_expr))?
        {
            notes.push(parse_note_row(row)?);
        }

        debug!(
            "event=note_search module=repo status=ok terms={} hits={}",
            match_expr.matches(" AND ").count() + 1,
            notes.len()
        );
        Ok(notes)
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{id_text}` in notes.id")))?;

    let color_text: String = row.get("color_key")?;
    let color = ColorKey::parse(&color_text).ok_or_else(|| {
        StoreError::InvalidData(format!("unknown color key `{color_text}` in notes.color_key"))
    })?;

    Ok(Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        color,
        date_created: row.get("date_created")?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    for table in ["notes", "notes_fts"] {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    for column in ["seq", "id", "title", "content", "color_key", "date_created"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{NoteStore, SqliteNoteStore, StoreError};
    use crate::model::note::{ColorKey, Note};
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteNoteStore::try_new(conn)
            .err()
            .expect("raw connection must be rejected");
        assert!(matches!(err, StoreError::MissingRequiredTable("notes")));
    }

    #[test]
    fn stored_row_with_unknown_color_is_reported_as_invalid_data() {
        let mut store = SqliteNoteStore::open_in_memory().unwrap();
        let note = store.insert(&Note::new_empty(ColorKey::Note1)).unwrap();
        store
            .connection()
            .execute(
                "UPDATE notes SET color_key = 'Mauve' WHERE id = ?1;",
                [note.id.to_string()],
            )
            .unwrap();

        let err = store.get(note.id).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
