//! `SqliteKeyValueStore`: `IKeyValueStore` over one SQLite table.
//!
//! One connection per store, guarded by a mutex for in-process callers and
//! by a `StoreLock` file for other build processes sharing the same file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use recomp_core::errors::StorageError;
use recomp_core::traits::storage::{IKeyValueStore, ValueFactory};
use rusqlite::{params, Connection, OptionalExtension};

use crate::connection::{open_in_memory_db, open_store_db, sqe};
use crate::lock::StoreLock;

struct Inner {
    conn: Connection,
    /// `None` for in-memory stores, which no other process can see.
    lock: Option<StoreLock>,
}

/// Key-value store in one SQLite database file.
pub struct SqliteKeyValueStore {
    inner: Mutex<Inner>,
    path: Option<PathBuf>,
}

impl SqliteKeyValueStore {
    /// Open a file-backed store. The lock file lives beside the database
    /// as `<name>.lock`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = open_store_db(path)?;
        let lock = StoreLock::new(&path.with_extension("lock"))?;
        tracing::debug!(path = %path.display(), "opened key-value store");
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                lock: Some(lock),
            }),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            inner: Mutex::new(Inner {
                conn: open_in_memory_db()?,
                lock: None,
            }),
            path: None,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the underlying connection, surfacing any error SQLite reports.
    pub fn close(self) -> Result<(), StorageError> {
        let inner = self
            .inner
            .into_inner()
            .map_err(|_| poisoned())?;
        inner.conn.close().map_err(|(_, e)| sqe(e))
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner.lock().map_err(|_| poisoned())
    }
}

fn poisoned() -> StorageError {
    StorageError::Locked {
        message: "store mutex poisoned by a panicking writer".to_string(),
    }
}

fn select_value(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
    conn.query_row(
        "SELECT value FROM entries WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqe)
}

fn upsert_value(conn: &Connection, key: &str, value: &[u8]) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO entries (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(sqe)?;
    Ok(())
}

impl IKeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let mut guard = self.lock_inner()?;
        let Inner { conn, lock } = &mut *guard;
        let _file_lock = match lock {
            Some(lock) => Some(lock.read()?),
            None => None,
        };
        select_value(conn, key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut guard = self.lock_inner()?;
        let Inner { conn, lock } = &mut *guard;
        let _file_lock = match lock {
            Some(lock) => Some(lock.write()?),
            None => None,
        };
        upsert_value(conn, key, value)
    }

    fn get_or_insert_with(
        &self,
        key: &str,
        factory: &mut ValueFactory<'_>,
    ) -> Result<Vec<u8>, StorageError> {
        let mut guard = self.lock_inner()?;
        let Inner { conn, lock } = &mut *guard;
        let _file_lock = match lock {
            Some(lock) => Some(lock.write()?),
            None => None,
        };
        if let Some(existing) = select_value(conn, key)? {
            tracing::trace!(key, "store hit");
            return Ok(existing);
        }
        let value = factory()?;
        upsert_value(conn, key, &value)?;
        tracing::trace!(key, bytes = value.len(), "store insert");
        Ok(value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.lock_inner()?;
        let Inner { conn, lock } = &mut *guard;
        let _file_lock = match lock {
            Some(lock) => Some(lock.write()?),
            None => None,
        };
        conn.execute("DELETE FROM entries WHERE key = ?1", params![key])
            .map_err(sqe)?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut guard = self.lock_inner()?;
        let Inner { conn, lock } = &mut *guard;
        let _file_lock = match lock {
            Some(lock) => Some(lock.read()?),
            None => None,
        };
        let mut stmt = conn
            .prepare(
                "SELECT key FROM entries WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
            )
            .map_err(sqe)?;
        let rows = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))
            .map_err(sqe)?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(sqe)?);
        }
        Ok(keys)
    }

    fn len(&self) -> Result<u64, StorageError> {
        let guard = self.lock_inner()?;
        let count: i64 = guard
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            .map_err(sqe)?;
        Ok(count.max(0) as u64)
    }
}
