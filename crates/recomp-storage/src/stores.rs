//! The two stores a compile needs, opened from config.
//!
//! - the machine-wide jar snapshot store, keyed by jar content hash and
//!   shared by every build on the machine;
//! - the per-project task-state store holding each compile task's previous
//!   compilation records.

use std::path::Path;
use std::sync::Arc;

use recomp_core::config::CacheConfig;
use recomp_core::errors::StorageError;

use crate::store::SqliteKeyValueStore;

pub const GLOBAL_STORE_FILE: &str = "jar-snapshots.db";
pub const TASK_STORE_FILE: &str = "compile-state.db";

/// The machine-wide snapshot store and one project's task store.
pub struct CacheStores {
    pub global: Arc<SqliteKeyValueStore>,
    pub tasks: Arc<SqliteKeyValueStore>,
}

impl CacheStores {
    /// Open both stores: the global one under `config`'s global dir, the task
    /// one under `project_state_dir`.
    pub fn open(config: &CacheConfig, project_state_dir: &Path) -> Result<Self, StorageError> {
        let global = SqliteKeyValueStore::open(&config.effective_global_dir().join(GLOBAL_STORE_FILE))?;
        let tasks = SqliteKeyValueStore::open(&project_state_dir.join(TASK_STORE_FILE))?;
        Ok(Self {
            global: Arc::new(global),
            tasks: Arc::new(tasks),
        })
    }

    /// Fresh in-memory stores, for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            global: Arc::new(SqliteKeyValueStore::open_in_memory()?),
            tasks: Arc::new(SqliteKeyValueStore::open_in_memory()?),
        })
    }
}
