//! Jar and classpath snapshot records.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::analysis::ClassSetAnalysisData;
use super::hash::ContentHash;

/// Everything known about one distinct jar content.
///
/// Identity is `hash`: two jars with identical bytes share one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarSnapshotData {
    pub hash: ContentHash,
    /// Class name → content hash of its `.class` entry.
    pub hashes: BTreeMap<String, ContentHash>,
    pub analysis: ClassSetAnalysisData,
}

impl JarSnapshotData {
    /// A snapshot of the jar with content `hash`.
    pub fn new(
        hash: ContentHash,
        hashes: BTreeMap<String, ContentHash>,
        analysis: ClassSetAnalysisData,
    ) -> Self {
        Self {
            hash,
            hashes,
            analysis,
        }
    }
}

/// Per-classpath aggregate persisted with each compile task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarClasspathSnapshotData {
    /// Jar path → content hash, in classpath order.
    pub jar_hashes: Vec<(PathBuf, ContentHash)>,
    /// Class names present in two or more jars of the classpath.
    pub duplicate_classes: BTreeSet<String>,
}

impl JarClasspathSnapshotData {
    /// A classpath snapshot with jars in classpath order.
    pub fn new(jar_hashes: Vec<(PathBuf, ContentHash)>, duplicate_classes: BTreeSet<String>) -> Self {
        Self {
            jar_hashes,
            duplicate_classes,
        }
    }

    /// Content hash recorded for `jar`, if it was on the classpath.
    pub fn hash_of(&self, jar: &Path) -> Option<ContentHash> {
        self.jar_hashes
            .iter()
            .find(|(path, _)| path == jar)
            .map(|(_, hash)| *hash)
    }

    /// Jar → hash lookup map, as consumed by `get_jar_snapshots`.
    pub fn jar_hash_map(&self) -> BTreeMap<PathBuf, ContentHash> {
        self.jar_hashes.iter().cloned().collect()
    }

    /// Classes defined by more than one jar.
    pub fn duplicate_classes(&self) -> &BTreeSet<String> {
        &self.duplicate_classes
    }
}
