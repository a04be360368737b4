/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the v1 schema: a single key-value table.
///
/// Editor state is stored as opaque text values under fixed keys (see
/// `storage::BUFFERS_KEY` and `storage::ACTIVE_BUFFER_KEY`). Interpreting the
/// values is the buffer store's job, which lets a malformed value degrade to
/// defaults instead of failing a typed column read.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS kv_store (
        key         TEXT    PRIMARY KEY,
        value       TEXT    NOT NULL,
        updated_at  INTEGER NOT NULL
    ) STRICT;
";

/// Ordered migrations; entry `i` upgrades the database to version `i + 1`.
const MIGRATIONS: &[&str] = &[SCHEMA_V1_SQL];

/// Latest schema version this build knows how to produce.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

/// Brings the database up to [`latest_version`], applying each pending
/// migration in its own `BEGIN IMMEDIATE` transaction.
///
/// Idempotent: already-applied versions are skipped, so this runs on every open.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be written.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let current: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    for (idx, ddl) in MIGRATIONS.iter().enumerate() {
        let target = idx as i64 + 1;
        if target <= current {
            continue;
        }
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(ddl)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            rusqlite::params![target],
        )?;
        tx.commit()?;
    }

    Ok(())
}
