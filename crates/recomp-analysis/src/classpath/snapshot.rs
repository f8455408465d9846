//! `JarClasspathSnapshot`: the snapshots of one compile classpath.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use recomp_core::JarClasspathSnapshotData;

use crate::jar::JarSnapshot;

/// A classpath's persisted record plus the snapshot of every jar on it.
#[derive(Debug, Clone)]
pub struct JarClasspathSnapshot {
    data: JarClasspathSnapshotData,
    snapshots: BTreeMap<PathBuf, JarSnapshot>,
}

impl JarClasspathSnapshot {
    /// Pair the persisted record with the resolved jar snapshots.
    pub fn new(data: JarClasspathSnapshotData, snapshots: BTreeMap<PathBuf, JarSnapshot>) -> Self {
        Self { data, snapshots }
    }

    /// The persisted part: jar hashes in classpath order plus duplicates.
    pub fn data(&self) -> &JarClasspathSnapshotData {
        &self.data
    }

    /// Snapshot of `jar`, if it is on this classpath.
    pub fn snapshot_for(&self, jar: &Path) -> Option<&JarSnapshot> {
        self.snapshots.get(jar)
    }

    /// Jars in classpath order.
    pub fn jars(&self) -> impl Iterator<Item = &Path> {
        self.data.jar_hashes.iter().map(|(path, _)| path.as_path())
    }

    /// True when `class_name` is defined by more than one jar.
    pub fn is_duplicate(&self, class_name: &str) -> bool {
        self.data.duplicate_classes.contains(class_name)
    }

    /// True when any class of `snapshot` also appears in another jar.
    pub fn is_any_class_duplicated(&self, snapshot: &JarSnapshot) -> bool {
        if self.data.duplicate_classes.is_empty() {
            return false;
        }
        snapshot.class_names().any(|c| self.is_duplicate(c))
    }
}
