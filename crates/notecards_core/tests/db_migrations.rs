use notecards_core::db::migrations::{apply_migrations, apply_migrations_to, latest_version};
use notecards_core::db::{open_db, open_db_in_memory, DbError};
use notecards_core::{ColorKey, Note, NoteStore, SqliteNoteStore, StoreError};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
    assert_table_exists(&conn, "notes_fts");
}

#[test]
fn reopening_file_database_keeps_notes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notecards.db");

    let created = {
        let mut store = SqliteNoteStore::open(&path).unwrap();
        let mut note = Note::new_empty(ColorKey::Note3);
        note.title = "persisted".to_string();
        store.insert(&note).unwrap()
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let store = SqliteNoteStore::try_new(conn).unwrap();
    let listed = store.list_all().unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_open_maps_bootstrap_failure_to_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = SqliteNoteStore::open(&path).err().expect("open must fail");
    assert!(matches!(
        err,
        StoreError::StorageUnavailable(DbError::UnsupportedSchemaVersion { .. })
    ));
}

#[test]
fn notes_table_has_exactly_the_persisted_columns() {
    let conn = open_db_in_memory().unwrap();

    let mut stmt = conn.prepare("PRAGMA table_info(notes);").unwrap();
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(
        columns,
        vec!["seq", "id", "title", "content", "color_key", "date_created"]
    );
}

#[test]
fn search_index_migration_covers_notes_written_before_it() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations_to(&mut conn, 1).unwrap();
    assert_eq!(schema_version(&conn), 1);
    assert_table_exists(&conn, "notes");
    assert!(!table_exists(&conn, "notes_fts"));

    let legacy_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO notes (id, title, content, color_key, date_created)
         VALUES (?1, 'Legacy groceries', 'oat milk', 'Note 4', 10);",
        [legacy_id.to_string()],
    )
    .unwrap();

    apply_migrations(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes_fts");

    let mut store = SqliteNoteStore::try_new(conn).unwrap();
    let hits = store.search("oat").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, legacy_id);
    assert_eq!(hits[0].color, ColorKey::Note4);

    let mut fresh = Note::new_empty(ColorKey::Note1);
    fresh.title = "fresh".to_string();
    let fresh = store.insert(&fresh).unwrap();
    let ids = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![fresh.id, legacy_id]);
}

#[test]
fn migration_target_is_clamped_and_reruns_are_no_ops() {
    let mut conn = Connection::open_in_memory().unwrap();

    apply_migrations_to(&mut conn, latest_version() + 5).unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    apply_migrations_to(&mut conn, 1).unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(table_exists(conn, table_name), "table {table_name} does not exist");
}

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
