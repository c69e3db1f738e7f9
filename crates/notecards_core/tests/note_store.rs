use notecards_core::{ColorKey, Note, NoteStore, SqliteNoteStore, StoreError, PALETTE};
use std::collections::HashSet;
use uuid::Uuid;

fn store() -> SqliteNoteStore {
    SqliteNoteStore::open_in_memory().unwrap()
}

fn note_at(date_created: i64) -> Note {
    Note::with_id(Uuid::new_v4(), ColorKey::Note1, date_created)
}

#[test]
fn insert_returns_stored_record() {
    let mut store = store();
    let mut note = Note::new_empty(ColorKey::Note5);
    note.title = "title".to_string();

    let stored = store.insert(&note).unwrap();
    assert_eq!(stored, note);
    assert_eq!(store.get(note.id).unwrap(), Some(note));
}

#[test]
fn insert_rejects_duplicate_id() {
    let mut store = store();
    let note = note_at(1_000);
    store.insert(&note).unwrap();

    let err = store.insert(&note).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId(id) if id == note.id));
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn list_all_sorts_by_date_created_descending() {
    let mut store = store();
    let old = store.insert(&note_at(1_000)).unwrap();
    let newest = store.insert(&note_at(3_000)).unwrap();
    let middle = store.insert(&note_at(2_000)).unwrap();

    let ids = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![newest.id, middle.id, old.id]);
}

#[test]
fn equal_timestamps_list_later_insert_first() {
    let mut store = store();
    let first = store.insert(&note_at(5_000)).unwrap();
    let second = store.insert(&note_at(5_000)).unwrap();

    let ids = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn delete_removes_note_and_is_benign_when_absent() {
    let mut store = store();
    let note = store.insert(&note_at(1_000)).unwrap();

    assert!(store.delete(note.id).unwrap());
    assert!(!store.delete(note.id).unwrap());
    assert!(!store.delete(Uuid::new_v4()).unwrap());
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn list_all_matches_live_set_after_mixed_operations() {
    let mut store = store();
    let mut live: Vec<Note> = Vec::new();

    for step in 0..40_i64 {
        if step % 3 == 2 && !live.is_empty() {
            let victim = live.remove((step as usize * 7) % live.len());
            assert!(store.delete(victim.id).unwrap());
        } else {
            let created_at = (step * 37) % 11;
            live.push(store.insert(&note_at(created_at)).unwrap());
        }
    }

    let listed = store.list_all().unwrap();
    assert_eq!(listed.len(), live.len());
    let listed_ids = listed.iter().map(|note| note.id).collect::<HashSet<_>>();
    let live_ids = live.iter().map(|note| note.id).collect::<HashSet<_>>();
    assert_eq!(listed_ids, live_ids);
    assert!(listed
        .windows(2)
        .all(|pair| pair[0].date_created >= pair[1].date_created));
}

#[test]
fn save_commits_mutable_fields_and_keeps_creation_time() {
    let mut store = store();
    let created = store.insert(&note_at(1_234)).unwrap();

    let mut copy = created.clone();
    copy.title = "Groceries".to_string();
    copy.content = "eggs".to_string();
    copy.color = ColorKey::Note6;
    copy.date_created = 9_999;

    let saved = store.save(&copy).unwrap();
    assert_eq!(saved.title, "Groceries");
    assert_eq!(saved.content, "eggs");
    assert_eq!(saved.color, ColorKey::Note6);
    assert_eq!(saved.date_created, 1_234);
}

#[test]
fn save_of_missing_note_is_surfaced() {
    let mut store = store();
    let err = store.save(&note_at(1)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn save_failure_in_storage_is_reported_as_save_failed() {
    let mut store = store();
    let note = store.insert(&note_at(1)).unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_note_updates BEFORE UPDATE ON notes BEGIN
                SELECT RAISE(ABORT, 'read only');
             END;",
        )
        .unwrap();

    let err = store.save(&note).unwrap_err();
    assert!(matches!(err, StoreError::SaveFailed { note_id, .. } if note_id == note.id));
}

#[test]
fn every_palette_color_survives_storage() {
    let mut store = store();
    for color in PALETTE {
        let note = Note::new_empty(color);
        assert_eq!(store.insert(&note).unwrap().color, color);
    }
}

#[test]
fn note_serializes_with_color_key_string() {
    let note = Note::with_id(Uuid::nil(), ColorKey::Note2, 42);
    let json = serde_json::to_value(&note).unwrap();
    assert_eq!(json["colorKey"], "Note 2");
    assert_eq!(json["dateCreated"], 42);

    let back: Note = serde_json::from_value(json).unwrap();
    assert_eq!(back, note);
}
