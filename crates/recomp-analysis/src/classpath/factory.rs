//! Builds a `JarClasspathSnapshot` for an ordered classpath.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use recomp_core::errors::AnalysisError;
use recomp_core::{FxHashSet, JarClasspathSnapshotData};

use super::snapshot::JarClasspathSnapshot;
use crate::cache::JarSnapshotCache;
use crate::jar::{JarArchive, JarSnapshotter};

pub struct JarClasspathSnapshotFactory {
    snapshotter: JarSnapshotter,
    cache: Arc<dyn JarSnapshotCache>,
    detect_duplicates: bool,
}

impl JarClasspathSnapshotFactory {
    /// Snapshot jars with `snapshotter`, memoized through `cache`.
    pub fn new(snapshotter: JarSnapshotter, cache: Arc<dyn JarSnapshotCache>) -> Self {
        Self {
            snapshotter,
            cache,
            detect_duplicates: true,
        }
    }

    /// Toggle recording of classes defined by more than one jar.
    pub fn with_duplicate_detection(mut self, enabled: bool) -> Self {
        self.detect_duplicates = enabled;
        self
    }

    /// Snapshot every jar of `classpath`, in order.
    ///
    /// Entries that are missing or are not regular files are skipped; a path
    /// listed twice is snapshotted once. Only store failures and unreadable
    /// jar files are errors.
    pub fn create_snapshot(&self, classpath: &[PathBuf]) -> Result<JarClasspathSnapshot, AnalysisError> {
        let mut jar_hashes = Vec::with_capacity(classpath.len());
        let mut snapshots = BTreeMap::new();
        let mut seen_classes: FxHashSet<&str> = FxHashSet::default();
        let mut duplicates = BTreeSet::new();

        for jar in classpath {
            if !jar.is_file() || snapshots.contains_key(jar) {
                continue;
            }
            let archive = JarArchive::new(jar.clone());
            let hash = archive.content_hash()?;
            let snapshot = self.cache.get(jar, hash, &mut || {
                Ok(self.snapshotter.create_snapshot(hash, &archive))
            })?;
            jar_hashes.push((jar.clone(), hash));
            snapshots.insert(jar.clone(), snapshot);
        }

        if self.detect_duplicates {
            for (jar, _) in &jar_hashes {
                let Some(snapshot) = snapshots.get(jar) else {
                    continue;
                };
                for class_name in snapshot.class_names() {
                    if !seen_classes.insert(class_name.as_str()) {
                        duplicates.insert(class_name.clone());
                    }
                }
            }
        }

        tracing::debug!(
            jars = jar_hashes.len(),
            duplicates = duplicates.len(),
            "classpath snapshotted"
        );
        Ok(JarClasspathSnapshot::new(
            JarClasspathSnapshotData::new(jar_hashes, duplicates),
            snapshots,
        ))
    }
}
