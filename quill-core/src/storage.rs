use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

/// Key holding the JSON array of every open buffer.
pub const BUFFERS_KEY: &str = "editors";

/// Key holding the active buffer id as plain text.
pub const ACTIVE_BUFFER_KEY: &str = "activeEditorId";

/// Raw persisted editor state, exactly as stored.
///
/// Both values are optional and uninterpreted; the buffer store decides what a
/// missing or malformed value means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub buffers_json: Option<String>,
    pub active_id: Option<String>,
}

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations.
///
/// `busy_timeout` is set through the `Connection` method rather than a PRAGMA
/// string so it survives pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        // Fold any WAL left behind by an unclean exit back into the main file.
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        crate::schema::migrate(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Reads the value stored under `key`, or `None` when the key was never written.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn get_value(
    conn: &Connection,
    key: &str,
) -> Result<Option<String>, tokio_rusqlite::Error> {
    let key = key.to_owned();

    conn.call(move |db| {
        db.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            rusqlite::params![&key],
            |r| r.get::<_, String>(0),
        )
        .optional()
    })
    .await
}

/// Writes `value` under `key`, replacing any previous value.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the upsert transaction fails.
pub async fn put_value(
    conn: &Connection,
    key: &str,
    value: &str,
) -> Result<(), tokio_rusqlite::Error> {
    let entries = vec![(key.to_owned(), value.to_owned())];
    put_values(conn, entries).await
}

/// Writes several key-value pairs in one `BEGIN IMMEDIATE` transaction.
///
/// Used by the persistence writer so the buffer list and the active id never
/// land in the database half-updated.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the upsert transaction fails.
pub async fn put_values(
    conn: &Connection,
    entries: Vec<(String, String)>,
) -> Result<(), tokio_rusqlite::Error> {
    conn.call(move |db| {
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        for (key, value) in &entries {
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key)
                 DO UPDATE SET value = excluded.value,
                               updated_at = excluded.updated_at",
                rusqlite::params![key, value, now],
            )?;
        }
        tx.commit()?;
        Ok::<_, rusqlite::Error>(())
    })
    .await
}

/// Loads both persisted editor-state entries.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if either read fails. Callers at startup
/// treat an error the same as absent state.
pub async fn load_state(conn: &Connection) -> Result<PersistedState, tokio_rusqlite::Error> {
    let buffers_json = get_value(conn, BUFFERS_KEY).await?;
    let active_id = get_value(conn, ACTIVE_BUFFER_KEY).await?;
    Ok(PersistedState { buffers_json, active_id })
}
