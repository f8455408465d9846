//! Cross-process store locking via fd-lock.
//! Shared read locks allow concurrent lookups from many build processes.
//! Exclusive write locks serialize inserts and get-or-insert transactions.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use recomp_core::errors::StorageError;

/// Advisory lock file guarding one store database.
pub struct StoreLock {
    lock_file: RwLock<File>,
    lock_path: PathBuf,
}

impl StoreLock {
    /// Create (or reuse) the lock file next to the store database.
    pub fn new(lock_path: &Path) -> Result<Self, StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| StorageError::Io {
                path: lock_path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            lock_file: RwLock::new(file),
            lock_path: lock_path.to_path_buf(),
        })
    }

    /// Acquire the shared lock, blocking while another process writes.
    pub fn read(&mut self) -> Result<RwLockReadGuard<'_, File>, StorageError> {
        self.lock_file.read().map_err(|e| StorageError::Locked {
            message: format!("shared lock on {} failed: {e}", self.lock_path.display()),
        })
    }

    /// Acquire the exclusive lock, blocking until every other holder releases.
    pub fn write(&mut self) -> Result<RwLockWriteGuard<'_, File>, StorageError> {
        let path = self.lock_path.display().to_string();
        self.lock_file.write().map_err(|e| StorageError::Locked {
            message: format!("exclusive lock on {path} failed: {e}"),
        })
    }

    /// Location of the lock file.
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}
