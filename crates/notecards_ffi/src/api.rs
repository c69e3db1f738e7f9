//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note grid listing and editor transitions to Dart via FRB.
//! - Hold the single process-wide editing session.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in response envelopes, never thrown.
//! - Only one editing session exists per process.

use log::{error, info, warn};
use notecards_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CloseOutcome, ColorKey, CoreConfig, EditorState, Note, NoteEditor, SqliteNoteStore,
    PICKER_COLORS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

type Session = NoteEditor<SqliteNoteStore, StdRng>;

static SESSION: OnceLock<Mutex<Option<Session>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note card as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note ID in string form.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Palette key, e.g. `Note 3`. Doubles as the color asset name.
    pub color_key: String,
    pub date_created_ms: i64,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title,
            content: note.content,
            color_key: note.color.as_str().to_string(),
            date_created_ms: note.date_created,
        }
    }
}

/// Grid listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    /// Notes sorted newest first.
    pub items: Vec<NoteItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Editor transition envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorResponse {
    /// Whether the transition was applied.
    pub ok: bool,
    /// Selected note after the transition, or the note just closed.
    pub note: Option<NoteItem>,
    /// `idle | editing | closing`.
    pub state: String,
    pub message: String,
}

/// Lists notes for the grid, filtered by search-bar text.
///
/// Blank `query` lists every note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(query: String) -> NotesListResponse {
    let result = with_session(|editor| editor.search(query.as_str()))
        .and_then(|found| found.map_err(|err| err.to_string()));
    match result {
        Ok(notes) => NotesListResponse {
            message: format!("Found {} note(s).", notes.len()),
            items: notes.into_iter().map(NoteItem::from).collect(),
        },
        Err(message) => NotesListResponse {
            items: Vec::new(),
            message: format!("notes_list failed: {message}"),
        },
    }
}

/// Colors offered by the editor's color picker.
#[flutter_rust_bridge::frb(sync)]
pub fn note_picker_colors() -> Vec<String> {
    PICKER_COLORS
        .iter()
        .map(|color| color.as_str().to_string())
        .collect()
}

/// Creates an empty note with a random color and opens it.
///
/// Ignored (`ok=false`) while another note is open.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create() -> EditorResponse {
    respond("note_create", |editor| Ok(editor.create_note()?.is_some()))
}

/// Opens a persisted note. Ignored while another note is open.
#[flutter_rust_bridge::frb(sync)]
pub fn note_select(id: String) -> EditorResponse {
    respond("note_select", |editor| {
        let note_id = Uuid::parse_str(id.trim()).map_err(|_| format!("invalid note id `{id}`"))?;
        Ok(editor.select(note_id)?)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_set_title(title: String) -> EditorResponse {
    respond("note_set_title", |editor| {
        editor.set_title(title)?;
        Ok(true)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_set_content(content: String) -> EditorResponse {
    respond("note_set_content", |editor| {
        editor.set_content(content)?;
        Ok(true)
    })
}

/// Changes the open note's color. `color_key` must be a palette key.
#[flutter_rust_bridge::frb(sync)]
pub fn note_set_color(color_key: String) -> EditorResponse {
    respond("note_set_color", |editor| {
        let color = ColorKey::parse(color_key.trim())
            .ok_or_else(|| format!("unknown color key `{color_key}`"))?;
        editor.set_color(color)?;
        Ok(true)
    })
}

/// Persists the open note without closing it.
#[flutter_rust_bridge::frb(sync)]
pub fn note_save() -> EditorResponse {
    respond("note_save", |editor| {
        editor.save()?;
        Ok(true)
    })
}

/// Starts closing the open note; call before the collapse animation.
#[flutter_rust_bridge::frb(sync)]
pub fn note_begin_close() -> EditorResponse {
    respond("note_begin_close", |editor| {
        editor.begin_close()?;
        Ok(true)
    })
}

/// Starts deleting the open note; call before the collapse animation.
#[flutter_rust_bridge::frb(sync)]
pub fn note_begin_delete() -> EditorResponse {
    respond("note_begin_delete", |editor| {
        editor.begin_delete()?;
        Ok(true)
    })
}

/// Applies the pending keep/discard once the collapse animation finished.
#[flutter_rust_bridge::frb(sync)]
pub fn note_finish_close() -> EditorResponse {
    finish("note_finish_close", |editor| Ok(editor.finish_close()?))
}

/// Closes the open note in one step.
#[flutter_rust_bridge::frb(sync)]
pub fn note_close() -> EditorResponse {
    finish("note_close", |editor| Ok(editor.close()?))
}

/// Deletes the open note in one step.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete() -> EditorResponse {
    finish("note_delete", |editor| {
        editor.begin_delete()?;
        Ok(editor.finish_close()?)
    })
}

type OpResult<T> = Result<T, Box<dyn std::error::Error>>;

fn respond(op: &'static str, f: impl FnOnce(&mut Session) -> OpResult<bool>) -> EditorResponse {
    with_session(|editor| {
        let result = f(editor);
        let (state, note) = snapshot(editor);
        match result {
            Ok(applied) => EditorResponse {
                ok: applied,
                note,
                message: if applied {
                    format!("{op} applied.")
                } else {
                    format!("{op} ignored: another note is open.")
                },
                state,
            },
            Err(err) => failed(op, err.to_string(), state, note),
        }
    })
    .unwrap_or_else(|message| failed(op, message, "idle".to_string(), None))
}

fn finish(
    op: &'static str,
    f: impl FnOnce(&mut Session) -> OpResult<CloseOutcome>,
) -> EditorResponse {
    with_session(|editor| {
        let result = f(editor);
        let (state, note) = snapshot(editor);
        match result {
            Ok(CloseOutcome::Kept(kept)) => EditorResponse {
                ok: true,
                note: Some(kept.into()),
                state,
                message: "Note kept.".to_string(),
            },
            Ok(CloseOutcome::Discarded { id, .. }) => EditorResponse {
                ok: true,
                note: None,
                state,
                message: format!("Note {id} discarded."),
            },
            Err(err) => failed(op, err.to_string(), state, note),
        }
    })
    .unwrap_or_else(|message| failed(op, message, "idle".to_string(), None))
}

fn failed(
    op: &'static str,
    message: String,
    state: String,
    note: Option<NoteItem>,
) -> EditorResponse {
    EditorResponse {
        ok: false,
        note,
        state,
        message: format!("{op} failed: {message}"),
    }
}

fn snapshot(editor: &Session) -> (String, Option<NoteItem>) {
    let state = match editor.state() {
        EditorState::Idle => "idle",
        EditorState::Editing { .. } => "editing",
        EditorState::Closing { .. } => "closing",
    };
    (state.to_string(), editor.selected().cloned().map(NoteItem::from))
}

/// Runs `f` against the process session, opening it on first use.
///
/// Errors only when the session cannot be opened or its lock is poisoned.
fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> Result<T, String> {
    let lock = SESSION.get_or_init(|| Mutex::new(None));
    let mut guard = lock.lock().map_err(|_| {
        error!("event=ffi_session module=ffi status=error error_code=lock_poisoned");
        "editor session lock poisoned".to_string()
    })?;

    if guard.is_none() {
        *guard = Some(open_session()?);
    }

    let editor = guard
        .as_mut()
        .ok_or_else(|| "editor session unavailable".to_string())?;
    Ok(f(editor))
}

fn open_session() -> Result<Session, String> {
    let config = CoreConfig::from_env();
    if let Err(err) = config.init_logging() {
        // An earlier `init_logging` call may already own the logger.
        warn!(
            "event=ffi_session module=ffi status=error error_code=logging_init_failed error={err}"
        );
    }

    let store = SqliteNoteStore::open(&config.db_path).map_err(|err| {
        error!(
            "event=ffi_session module=ffi status=error error_code=store_open_failed error={err}"
        );
        err.to_string()
    })?;
    let rng = StdRng::try_from_os_rng().map_err(|err| {
        error!("event=ffi_session module=ffi status=error error_code=rng_unavailable error={err}");
        format!("random source unavailable: {err}")
    })?;
    info!("event=ffi_session module=ffi status=ok");
    Ok(NoteEditor::new(store, rng))
}
