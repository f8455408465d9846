//! Jar snapshotter: hashes and analyzes every class of a jar.

use std::collections::BTreeMap;
use std::sync::Arc;

use recomp_core::ContentHash;
use recomp_core::JarSnapshotData;

use super::archive::JarArchive;
use super::snapshot::JarSnapshot;
use crate::accumulator::ClassDependentsAccumulator;
use crate::classfile::ClassDependencyAnalyzer;

/// Produces `JarSnapshot`s. Stateless apart from the analyzer, so the same
/// content always yields the same snapshot.
#[derive(Clone)]
pub struct JarSnapshotter {
    analyzer: Arc<dyn ClassDependencyAnalyzer>,
}

impl JarSnapshotter {
    /// Snapshot jars using `analyzer` for each class entry.
    pub fn new(analyzer: Arc<dyn ClassDependencyAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Snapshot `jar`, whose content hash is `hash`.
    ///
    /// Never fails: an entry that cannot be read or analyzed marks the whole
    /// jar as needing a full rebuild and the walk continues.
    pub fn create_snapshot(&self, hash: ContentHash, jar: &JarArchive) -> JarSnapshot {
        let mut hashes = BTreeMap::new();
        let mut accumulator = ClassDependentsAccumulator::new();
        let jar_name = jar.display_name();

        let walked = jar.visit_class_entries(|entry, bytes| {
            let bytes = match bytes {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!(jar = %jar_name, entry, error = %e, "unreadable class entry");
                    accumulator.full_rebuild_needed(format!(
                        "{entry} in {jar_name} could not be read"
                    ));
                    return;
                }
            };
            let class_hash = ContentHash::of_bytes(bytes);
            match self.analyzer.analyze(class_hash, bytes) {
                Ok(analysis) => {
                    hashes.insert(analysis.class_name.clone(), class_hash);
                    accumulator.add_class(entry, &analysis);
                }
                Err(e) => {
                    tracing::debug!(jar = %jar_name, entry, error = %e, "class analysis failed");
                    // Keep the hash so a later change to this entry is still seen.
                    hashes.insert(class_name_from_entry(entry), class_hash);
                    accumulator.full_rebuild_needed(format!(
                        "{entry} in {jar_name} could not be analyzed"
                    ));
                }
            }
        });

        if let Err(e) = walked {
            tracing::debug!(jar = %jar_name, error = %e, "jar could not be opened");
            accumulator.full_rebuild_needed(format!("{jar_name} could not be read"));
        }

        tracing::trace!(jar = %jar_name, %hash, classes = hashes.len(), "jar snapshotted");
        JarSnapshot::new(JarSnapshotData::new(hash, hashes, accumulator.into_analysis()))
    }
}

/// `com/x/Foo$Bar.class` → `com.x.Foo$Bar`.
pub fn class_name_from_entry(entry: &str) -> String {
    entry
        .strip_suffix(".class")
        .unwrap_or(entry)
        .replace('/', ".")
}
