//! Per-task persistence of the previous compilation.
//!
//! Two records per task identity: the local class-set analysis and the jar
//! classpath snapshot. Jar snapshots themselves live in the snapshot cache.

use std::collections::BTreeSet;
use std::sync::Arc;

use recomp_core::codec::BinaryRecord;
use recomp_core::errors::{AnalysisError, StorageError};
use recomp_core::traits::storage::IKeyValueStore;
use recomp_core::{ClassSetAnalysisData, ContentHash, JarClasspathSnapshotData};

use super::previous::PreviousCompilation;
use crate::cache::JarSnapshotCache;

const ANALYSIS_PREFIX: &str = "class-analysis/";
const CLASSPATH_PREFIX: &str = "jar-classpath/";

fn analysis_key(task: &str) -> String {
    format!("{ANALYSIS_PREFIX}{task}")
}

fn classpath_key(task: &str) -> String {
    format!("{CLASSPATH_PREFIX}{task}")
}

/// Loads and saves each task's previous compilation.
pub struct PreviousCompilationStore {
    store: Arc<dyn IKeyValueStore>,
}

impl PreviousCompilationStore {
    /// Keep per-task records in `store`.
    pub fn new(store: Arc<dyn IKeyValueStore>) -> Self {
        Self { store }
    }

    /// The previous compilation of `task`, or `None` when either record is
    /// absent (first build, or an interrupted save).
    pub fn load(
        &self,
        task: &str,
        cache: Arc<dyn JarSnapshotCache>,
    ) -> Result<Option<PreviousCompilation>, AnalysisError> {
        let Some(analysis) = self.store.get(&analysis_key(task))? else {
            tracing::debug!(task, "no previous class analysis");
            return Ok(None);
        };
        let Some(classpath) = self.store.get(&classpath_key(task))? else {
            tracing::debug!(task, "no previous jar classpath");
            return Ok(None);
        };
        Ok(Some(PreviousCompilation::new(
            ClassSetAnalysisData::from_record_bytes(&analysis)?,
            JarClasspathSnapshotData::from_record_bytes(&classpath)?,
            cache,
        )))
    }

    /// Replace both records of `task`.
    pub fn save(
        &self,
        task: &str,
        analysis: &ClassSetAnalysisData,
        classpath: &JarClasspathSnapshotData,
    ) -> Result<(), StorageError> {
        // The analysis record goes last: `load` treats a missing one as no baseline.
        self.store.remove(&analysis_key(task))?;
        self.store
            .put(&classpath_key(task), &classpath.to_record_bytes())?;
        self.store
            .put(&analysis_key(task), &analysis.to_record_bytes())?;
        tracing::debug!(task, "previous compilation saved");
        Ok(())
    }

    /// Drop both records of `task`; its next build starts over.
    pub fn remove(&self, task: &str) -> Result<(), StorageError> {
        self.store.remove(&analysis_key(task))?;
        self.store.remove(&classpath_key(task))
    }

    /// Hash of every jar on any task's recorded classpath.
    pub fn referenced_jar_hashes(&self) -> Result<BTreeSet<ContentHash>, AnalysisError> {
        let mut hashes = BTreeSet::new();
        for key in self.store.keys_with_prefix(CLASSPATH_PREFIX)? {
            // removed since listed: nothing to keep for it
            let Some(bytes) = self.store.get(&key)? else {
                continue;
            };
            let classpath = JarClasspathSnapshotData::from_record_bytes(&bytes)?;
            hashes.extend(classpath.jar_hashes.iter().map(|(_, hash)| *hash));
        }
        Ok(hashes)
    }
}
