//! In-memory jar snapshot tier (Moka, time-to-idle expiry).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use recomp_core::config::CacheConfig;
use recomp_core::errors::AnalysisError;
use recomp_core::ContentHash;

use super::{JarSnapshotCache, SnapshotFactory};
use crate::jar::JarSnapshot;

/// Fastest tier; lost on process exit.
///
/// Concurrent misses for one hash may both run the factory. Both results
/// describe the same bytes, so whichever is stored last is equally valid.
pub struct InMemoryJarSnapshotCache {
    inner: Cache<ContentHash, JarSnapshot>,
    backing: Option<Arc<dyn JarSnapshotCache>>,
}

impl InMemoryJarSnapshotCache {
    /// A cache holding at most `capacity` snapshots, each for `expiry` after last access.
    pub fn new(capacity: u64, expiry: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(expiry)
                .build(),
            backing: None,
        }
    }

    /// A cache sized and timed by `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.effective_memory_capacity(),
            config.effective_memory_expiry(),
        )
    }

    /// Consult `backing` on misses instead of running the factory directly.
    pub fn backed_by(mut self, backing: Arc<dyn JarSnapshotCache>) -> Self {
        self.backing = Some(backing);
        self
    }

    /// Number of snapshots currently held.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    /// Drop every held snapshot.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl JarSnapshotCache for InMemoryJarSnapshotCache {
    fn get(
        &self,
        jar: &Path,
        hash: ContentHash,
        factory: &mut SnapshotFactory<'_>,
    ) -> Result<JarSnapshot, AnalysisError> {
        if let Some(hit) = self.inner.get(&hash) {
            tracing::trace!(jar = %jar.display(), %hash, "memory snapshot hit");
            return Ok(hit);
        }
        let snapshot = match &self.backing {
            Some(backing) => backing.get(jar, hash, factory)?,
            None => factory()?,
        };
        self.inner.insert(hash, snapshot.clone());
        Ok(snapshot)
    }

    fn get_jar_snapshots(
        &self,
        jar_hashes: &BTreeMap<PathBuf, ContentHash>,
    ) -> Result<BTreeMap<PathBuf, JarSnapshot>, AnalysisError> {
        let mut found = BTreeMap::new();
        let mut missing = BTreeMap::new();
        for (jar, hash) in jar_hashes {
            match self.inner.get(hash) {
                Some(snapshot) => {
                    found.insert(jar.clone(), snapshot);
                }
                None => {
                    missing.insert(jar.clone(), *hash);
                }
            }
        }
        if missing.is_empty() {
            return Ok(found);
        }
        let Some(backing) = &self.backing else {
            return match missing.into_iter().next() {
                Some((path, hash)) => Err(AnalysisError::MissingJarSnapshot { path, hash }),
                None => Ok(found),
            };
        };
        for (jar, snapshot) in backing.get_jar_snapshots(&missing)? {
            self.inner.insert(snapshot.hash(), snapshot.clone());
            found.insert(jar, snapshot);
        }
        Ok(found)
    }
}
