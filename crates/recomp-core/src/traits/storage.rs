//! `IKeyValueStore` trait: durable, string-keyed byte store.
//!
//! Implemented by `recomp-storage::SqliteKeyValueStore`. Records written by
//! the snapshot cache are content-addressed and never updated; per-task
//! records are replaced wholesale on every successful compile.

use std::sync::Arc;

use crate::errors::StorageError;

/// Factory invoked by `get_or_insert_with` on a miss.
pub type ValueFactory<'a> = dyn FnMut() -> Result<Vec<u8>, StorageError> + 'a;

pub trait IKeyValueStore: Send + Sync {
    /// The value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Insert or replace the value under `key`.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Return the stored value, or run `factory`, store its result and return it.
    ///
    /// Implementations hold an exclusive lock across lookup, factory and
    /// write, so a key is computed at most once across threads and processes.
    /// Every other call on the same store, for any key, waits until the
    /// factory returns. Keep factories to one bounded computation and never
    /// call back into the store from one: that deadlocks.
    fn get_or_insert_with(
        &self,
        key: &str,
        factory: &mut ValueFactory<'_>,
    ) -> Result<Vec<u8>, StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Every key starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Number of stored entries.
    fn len(&self) -> Result<u64, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl<T: IKeyValueStore + ?Sized> IKeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn get_or_insert_with(
        &self,
        key: &str,
        factory: &mut ValueFactory<'_>,
    ) -> Result<Vec<u8>, StorageError> {
        (**self).get_or_insert_with(key, factory)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).keys_with_prefix(prefix)
    }

    fn len(&self) -> Result<u64, StorageError> {
        (**self).len()
    }
}
