//! Schema migrations, tracked via `PRAGMA user_version`.

use recomp_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::sqe;

/// Schema version this build writes.
pub const SCHEMA_VERSION: u32 = 1;

const V1_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;
"#;

/// Bring a connection up to `SCHEMA_VERSION`. Idempotent.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let version = get_schema_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(StorageError::RecordCorrupt {
            details: format!(
                "store schema version {version} is newer than supported version {SCHEMA_VERSION}"
            ),
        });
    }
    if version < 1 {
        conn.execute_batch(V1_SCHEMA_SQL).map_err(sqe)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(sqe)?;
        tracing::debug!(from = version, to = SCHEMA_VERSION, "store schema migrated");
    }
    Ok(())
}

/// Schema version recorded in the database, 0 when never migrated.
pub fn get_schema_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(sqe)
}
