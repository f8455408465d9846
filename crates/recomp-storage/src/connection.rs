//! SQLite connection setup.

use std::path::Path;

use recomp_core::errors::StorageError;
use rusqlite::Connection;

use crate::migrations::run_migrations;

/// Pragmas applied to every store connection.
const STORE_PRAGMAS: &str = "
    PRAGMA busy_timeout = 5000;
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA cache_size = -8000;
    PRAGMA temp_store = MEMORY;
";

/// Open (creating if needed) a file-backed store database and migrate it.
pub fn open_store_db(path: &Path) -> Result<Connection, StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }
    let conn = Connection::open(path).map_err(sqe)?;
    conn.execute_batch(STORE_PRAGMAS).map_err(sqe)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open a private in-memory database (tests, throwaway local caches).
pub fn open_in_memory_db() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory().map_err(sqe)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Map a SQLite failure to `StorageError::SqliteError`.
pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
