//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note store contract used by the editor controller.
//! - Isolate SQLite query details from controller orchestration.
//!
//! # Invariants
//! - Store APIs return semantic errors (`NotFound`, `DuplicateId`,
//!   `SaveFailed`) in addition to DB transport errors.
//! - Store writes never rewrite `id` or `date_created`.

pub mod note_repo;
