//! Routes jars between a machine-wide and a project-local tier.
//!
//! Resolved artifacts live under content-addressed caches and never change
//! in place, so their snapshots are worth sharing machine-wide. Project
//! output jars change on every build and would only pollute the global store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use recomp_core::errors::AnalysisError;
use recomp_core::ContentHash;

use super::{JarSnapshotCache, SnapshotFactory};
use crate::jar::JarSnapshot;

/// Routes each jar to the global or the local tier by location.
pub struct SplitJarSnapshotCache {
    immutable_roots: Vec<PathBuf>,
    global: Arc<dyn JarSnapshotCache>,
    local: Arc<dyn JarSnapshotCache>,
}

impl SplitJarSnapshotCache {
    /// Route jars under `immutable_roots` to `global`, all others to `local`.
    pub fn new(
        immutable_roots: Vec<PathBuf>,
        global: Arc<dyn JarSnapshotCache>,
        local: Arc<dyn JarSnapshotCache>,
    ) -> Self {
        Self {
            immutable_roots,
            global,
            local,
        }
    }

    /// True when `jar` lives under one of the immutable roots.
    pub fn is_immutable(&self, jar: &Path) -> bool {
        self.immutable_roots.iter().any(|root| jar.starts_with(root))
    }

    fn tier(&self, jar: &Path) -> &dyn JarSnapshotCache {
        if self.is_immutable(jar) {
            self.global.as_ref()
        } else {
            self.local.as_ref()
        }
    }
}

impl JarSnapshotCache for SplitJarSnapshotCache {
    fn get(
        &self,
        jar: &Path,
        hash: ContentHash,
        factory: &mut SnapshotFactory<'_>,
    ) -> Result<JarSnapshot, AnalysisError> {
        self.tier(jar).get(jar, hash, factory)
    }

    fn get_jar_snapshots(
        &self,
        jar_hashes: &BTreeMap<PathBuf, ContentHash>,
    ) -> Result<BTreeMap<PathBuf, JarSnapshot>, AnalysisError> {
        let (immutable, local): (BTreeMap<_, _>, BTreeMap<_, _>) = jar_hashes
            .iter()
            .map(|(jar, hash)| (jar.clone(), *hash))
            .partition(|(jar, _)| self.is_immutable(jar));

        let mut snapshots = self.global.get_jar_snapshots(&immutable)?;
        snapshots.extend(self.local.get_jar_snapshots(&local)?);
        Ok(snapshots)
    }
}
