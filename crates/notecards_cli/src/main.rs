//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notecards_core` linkage.
//! - Drive one create/edit/close cycle against an in-memory store.

use notecards_core::{NoteEditor, SqliteNoteStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notecards_core ping={}", notecards_core::ping());
    println!("notecards_core version={}", notecards_core::core_version());

    match smoke_cycle() {
        Ok(count) => {
            println!("notecards_core smoke=ok notes={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("notecards_core smoke=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_cycle() -> Result<usize, Box<dyn std::error::Error>> {
    let store = SqliteNoteStore::open_in_memory()?;
    let mut editor = NoteEditor::new(store, StdRng::try_from_os_rng()?);

    editor.create_note()?;
    editor.set_title("smoke")?;
    editor.close()?;

    // Discarded on close: stays out of the listing.
    editor.create_note()?;
    editor.close()?;

    Ok(editor.notes()?.len())
}
