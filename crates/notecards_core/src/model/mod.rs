//! Domain model for color-coded note cards.
//!
//! # Responsibility
//! - Define the canonical note record used by the store and the editor.
//! - Own the fixed color palette and the random color pick.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - `date_created` is assigned once and never rewritten.

pub mod note;
