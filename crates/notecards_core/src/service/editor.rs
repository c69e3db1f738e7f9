//! Note editing controller.
//!
//! # Responsibility
//! - Own the selection state machine driven by the grid/detail UI.
//! - Apply the empty-note discard policy on close.
//! - Edit a local copy of the selected note and commit it explicitly.
//!
//! # Invariants
//! - At most one note is selected at a time. Selecting or creating while a
//!   note is selected (or closing) leaves the state unchanged.
//! - Field mutations are only accepted while `Editing`.
//! - Closing is two-phase: `begin_close`/`begin_delete` disable interaction,
//!   `finish_close` performs the store mutation.
//! - A failed `finish_close` keeps the `Closing` state so nothing is lost.

use crate::model::note::{pick_color, ColorKey, Note, NoteId, PALETTE};
use crate::repo::note_repo::{NoteStore, StoreError};
use log::{debug, error, info};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EditorResult<T> = Result<T, EditorError>;

/// Controller error for editing transitions.
#[derive(Debug)]
pub enum EditorError {
    /// Operation needs a selected note but the editor is idle.
    NoSelection,
    /// Selected note is closing and no longer accepts input.
    NotInteractive,
    /// `finish_close` called without a pending close.
    NotClosing,
    /// No colors to pick from when creating a note.
    EmptyPalette,
    Store(StoreError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no note is selected"),
            Self::NotInteractive => write!(f, "selected note is closing and not interactive"),
            Self::NotClosing => write!(f, "no close is pending"),
            Self::EmptyPalette => write!(f, "color palette is empty"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// What happens to the selected note once its close completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Keep,
    Discard,
}

/// Selection state of the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    /// Local copy of the selected note, open for mutation.
    Editing { note: Note },
    /// Interaction disabled, store mutation pending.
    Closing { note: Note, disposition: Disposition },
}

/// Result of a completed close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Note was persisted with its latest fields.
    Kept(Note),
    /// Note was deleted. `removed` is `false` if it was already gone.
    Discarded { id: NoteId, removed: bool },
}

/// Editing controller over a note store.
pub struct NoteEditor<S: NoteStore, R: Rng> {
    store: S,
    rng: R,
    palette: Vec<ColorKey>,
    state: EditorState,
}

impl<S: NoteStore, R: Rng> NoteEditor<S, R> {
    /// Creates an idle editor that assigns colors from the full palette.
    pub fn new(store: S, rng: R) -> Self {
        Self::with_palette(store, rng, PALETTE.to_vec())
    }

    /// Creates an idle editor with a custom color palette for new notes.
    pub fn with_palette(store: S, rng: R, palette: Vec<ColorKey>) -> Self {
        Self {
            store,
            rng,
            palette,
            state: EditorState::Idle,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The selected note's local copy, if any.
    pub fn selected(&self) -> Option<&Note> {
        match &self.state {
            EditorState::Idle => None,
            EditorState::Editing { note } | EditorState::Closing { note, .. } => Some(note),
        }
    }

    /// Whether the selected note currently accepts input.
    pub fn is_interactive(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// All persisted notes, newest first.
    pub fn notes(&self) -> EditorResult<Vec<Note>> {
        Ok(self.store.list_all()?)
    }

    /// Persisted notes matching the search-bar text, newest first.
    pub fn search(&self, text: &str) -> EditorResult<Vec<Note>> {
        Ok(self.store.search(text)?)
    }

    /// Opens a persisted note for editing.
    ///
    /// Returns `Ok(false)` without touching state when a note is already
    /// selected.
    pub fn select(&mut self, id: NoteId) -> EditorResult<bool> {
        if !matches!(self.state, EditorState::Idle) {
            debug!("event=editor_select module=editor status=ignored note_id={id}");
            return Ok(false);
        }

        let note = self.store.get(id)?.ok_or(StoreError::NotFound(id))?;
        info!("event=editor_select module=editor status=ok note_id={id}");
        self.state = EditorState::Editing { note };
        Ok(true)
    }

    /// Inserts an empty note with a random palette color and selects it.
    ///
    /// Returns `Ok(None)` without touching state when a note is already
    /// selected.
    pub fn create_note(&mut self) -> EditorResult<Option<Note>> {
        if !matches!(self.state, EditorState::Idle) {
            debug!("event=editor_create module=editor status=ignored");
            return Ok(None);
        }

        let color = pick_color(&self.palette, &mut self.rng).ok_or(EditorError::EmptyPalette)?;
        let stored = self.store.insert(&Note::new_empty(color))?;
        info!(
            "event=editor_create module=editor status=ok note_id={} color={}",
            stored.id, stored.color
        );
        self.state = EditorState::Editing {
            note: stored.clone(),
        };
        Ok(Some(stored))
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> EditorResult<()> {
        self.editing_note_mut()?.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> EditorResult<()> {
        self.editing_note_mut()?.content = content.into();
        Ok(())
    }

    pub fn set_color(&mut self, color: ColorKey) -> EditorResult<()> {
        self.editing_note_mut()?.color = color;
        Ok(())
    }

    /// Commits the local copy without leaving the editor.
    pub fn save(&mut self) -> EditorResult<Note> {
        let note = self.editing_note_mut()?.clone();
        let saved = self.store.save(&note).map_err(|err| {
            error!(
                "event=editor_save module=editor status=error note_id={} error={}",
                note.id, err
            );
            EditorError::from(err)
        })?;
        Ok(saved)
    }

    /// First phase of closing: disables interaction and decides whether the
    /// note is kept or discarded.
    pub fn begin_close(&mut self) -> EditorResult<Disposition> {
        let note = self.take_editing_note()?;
        let disposition = if note.is_blank() {
            Disposition::Discard
        } else {
            Disposition::Keep
        };
        debug!(
            "event=editor_close module=editor status=start note_id={} disposition={:?}",
            note.id, disposition
        );
        self.state = EditorState::Closing { note, disposition };
        Ok(disposition)
    }

    /// First phase of the destructive delete action.
    pub fn begin_delete(&mut self) -> EditorResult<()> {
        let note = self.take_editing_note()?;
        debug!(
            "event=editor_delete module=editor status=start note_id={}",
            note.id
        );
        self.state = EditorState::Closing {
            note,
            disposition: Disposition::Discard,
        };
        Ok(())
    }

    /// Second phase of closing: applies the pending store mutation.
    ///
    /// On failure the editor stays in `Closing` and the error is returned.
    pub fn finish_close(&mut self) -> EditorResult<CloseOutcome> {
        let EditorState::Closing { note, disposition } = &self.state else {
            return Err(EditorError::NotClosing);
        };

        let result = match disposition {
            Disposition::Discard => self
                .store
                .delete(note.id)
                .map(|removed| CloseOutcome::Discarded {
                    id: note.id,
                    removed,
                }),
            Disposition::Keep => self.store.save(note).map(CloseOutcome::Kept),
        };

        match result {
            Ok(outcome) => {
                info!(
                    "event=editor_close module=editor status=ok note_id={} disposition={:?}",
                    note.id, disposition
                );
                self.state = EditorState::Idle;
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "event=editor_close module=editor status=error note_id={} disposition={:?} error={}",
                    note.id, disposition, err
                );
                Err(err.into())
            }
        }
    }

    /// Closes the selected note in one step.
    pub fn close(&mut self) -> EditorResult<CloseOutcome> {
        self.begin_close()?;
        self.finish_close()
    }

    /// Drops any selection without touching the store.
    ///
    /// Escape hatch for a close that keeps failing.
    pub fn reset(&mut self) -> Option<Note> {
        match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Idle => None,
            EditorState::Editing { note } | EditorState::Closing { note, .. } => {
                info!(
                    "event=editor_reset module=editor status=ok note_id={}",
                    note.id
                );
                Some(note)
            }
        }
    }

    fn editing_note_mut(&mut self) -> EditorResult<&mut Note> {
        match &mut self.state {
            EditorState::Editing { note } => Ok(note),
            EditorState::Closing { .. } => Err(EditorError::NotInteractive),
            EditorState::Idle => Err(EditorError::NoSelection),
        }
    }

    fn take_editing_note(&mut self) -> EditorResult<Note> {
        match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Editing { note } => Ok(note),
            EditorState::Idle => Err(EditorError::NoSelection),
            closing @ EditorState::Closing { .. } => {
                self.state = closing;
                Err(EditorError::NotInteractive)
            }
        }
    }
}
