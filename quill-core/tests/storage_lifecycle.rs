//! Storage lifecycle: schema setup, key-value access, and a full
//! create/edit/persist/reopen/restore round trip through the background writer.

use std::sync::Arc;

use quill_core::persist::spawn_writer;
use quill_core::schema;
use quill_core::storage::{self, PersistedState, ACTIVE_BUFFER_KEY, BUFFERS_KEY};
use quill_core::types::Language;
use quill_core::{BufferStore, EditorWidget, Session, SessionConfig};
use tokio::sync::mpsc;

mod common;
use common::{FakeService, FakeWidget};

fn temp_db_path() -> String {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.keep().join("quill.db");
    path.to_string_lossy().to_string()
}

#[tokio::test]
async fn fresh_database_is_migrated_and_empty() {
    let path = temp_db_path();
    let conn = storage::open_db(&path).await.unwrap();

    let version: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT MAX(version) FROM schema_version",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(version, schema::latest_version());

    let journal: String = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row("PRAGMA journal_mode", [], |r| r.get(0))?)
        })
        .await
        .unwrap();
    assert_eq!(journal, "wal");

    let state = storage::load_state(&conn).await.unwrap();
    assert_eq!(state, PersistedState::default());
}

#[tokio::test]
async fn reopening_does_not_rerun_migrations() {
    let path = temp_db_path();
    {
        let conn = storage::open_db(&path).await.unwrap();
        storage::put_value(&conn, "k", "v").await.unwrap();
        drop(conn);
    }

    let conn = storage::open_db(&path).await.unwrap();
    let rows: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT COUNT(*) FROM schema_version",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(rows, schema::latest_version());
    assert_eq!(storage::get_value(&conn, "k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn put_value_overwrites() {
    let conn = storage::open_db(&temp_db_path()).await.unwrap();

    assert_eq!(storage::get_value(&conn, ACTIVE_BUFFER_KEY).await.unwrap(), None);
    storage::put_value(&conn, ACTIVE_BUFFER_KEY, "a").await.unwrap();
    storage::put_value(&conn, ACTIVE_BUFFER_KEY, "b").await.unwrap();
    assert_eq!(
        storage::get_value(&conn, ACTIVE_BUFFER_KEY).await.unwrap().as_deref(),
        Some("b")
    );
}

#[tokio::test]
async fn edits_survive_a_restart() {
    let path = temp_db_path();

    let (created_id, expected_text) = {
        let conn = storage::open_db(&path).await.unwrap();
        let handle = spawn_writer(conn);
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session: Session<FakeWidget> = Session::new(
            BufferStore::default(),
            Arc::new(FakeService::default()),
            tx,
            SessionConfig::default(),
        )
        .with_persistence(handle);

        let id = session.create_buffer();
        assert!(session.on_mount(&id, FakeWidget::default()));
        session.set_language(Language::JavaScript);
        let text = "const x = 1;\nconsole.log(x);\n";
        session.widget_mut(&id).unwrap().set_value(text);
        session.on_text_changed(&id);
        session.flush().await;
        (id, text.to_owned())
    };

    let conn = storage::open_db(&path).await.unwrap();
    let state = storage::load_state(&conn).await.unwrap();
    assert_eq!(state.active_id.as_deref(), Some(created_id.as_str()));

    let restored = BufferStore::restore(&state);
    assert_eq!(restored.buffers().len(), 2);
    assert_eq!(restored.active_id(), created_id);
    let buffer = restored.active();
    assert_eq!(buffer.text, expected_text);
    assert_eq!(buffer.language, Language::JavaScript);
    assert!(!buffer.generation_in_flight);
    assert_eq!(restored.selected_language(), Language::JavaScript);
}

#[tokio::test]
async fn malformed_state_falls_back_to_default() {
    let conn = storage::open_db(&temp_db_path()).await.unwrap();
    storage::put_value(&conn, BUFFERS_KEY, "{not json").await.unwrap();
    storage::put_value(&conn, ACTIVE_BUFFER_KEY, "missing").await.unwrap();

    let restored = BufferStore::restore(&storage::load_state(&conn).await.unwrap());
    assert_eq!(restored.buffers().len(), 1);
    assert_eq!(restored.active().language, Language::Python);
    assert_eq!(restored.active_id(), restored.buffers()[0].id);
}
