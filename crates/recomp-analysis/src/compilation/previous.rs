//! `PreviousCompilation`: read-only baseline for one compile task.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use recomp_core::errors::AnalysisError;
use recomp_core::{ClassSetAnalysisData, DependentsSet, JarClasspathSnapshotData};

use crate::cache::JarSnapshotCache;
use crate::class_set::ClassSetAnalysis;
use crate::jar::JarSnapshot;

/// What the last successful compile of a task saw.
pub struct PreviousCompilation {
    analysis: ClassSetAnalysis,
    classpath: JarClasspathSnapshotData,
    cache: Arc<dyn JarSnapshotCache>,
    jar_snapshots: OnceLock<BTreeMap<PathBuf, JarSnapshot>>,
}

impl PreviousCompilation {
    /// A baseline whose jar snapshots resolve lazily through `cache`.
    pub fn new(
        analysis: ClassSetAnalysisData,
        classpath: JarClasspathSnapshotData,
        cache: Arc<dyn JarSnapshotCache>,
    ) -> Self {
        Self {
            analysis: ClassSetAnalysis::new(analysis),
            classpath,
            cache,
            jar_snapshots: OnceLock::new(),
        }
    }

    /// Analysis of the classes compiled last time.
    pub fn analysis(&self) -> &ClassSetAnalysis {
        &self.analysis
    }

    /// Classpath the last compile ran against.
    pub fn classpath(&self) -> &JarClasspathSnapshotData {
        &self.classpath
    }

    /// Snapshot of `jar` as it was on the previous classpath, or `None` when
    /// the jar was not on it.
    ///
    /// The first call resolves every previous jar at once; a hash no cache
    /// tier holds any more is `MissingJarSnapshot`.
    pub fn jar_snapshot(&self, jar: &Path) -> Result<Option<JarSnapshot>, AnalysisError> {
        if self.classpath.hash_of(jar).is_none() {
            return Ok(None);
        }
        Ok(self.jar_snapshots()?.get(jar).cloned())
    }

    fn jar_snapshots(&self) -> Result<&BTreeMap<PathBuf, JarSnapshot>, AnalysisError> {
        if let Some(loaded) = self.jar_snapshots.get() {
            return Ok(loaded);
        }
        let loaded = self.cache.get_jar_snapshots(&self.classpath.jar_hash_map())?;
        Ok(self.jar_snapshots.get_or_init(|| loaded))
    }

    /// Transitive local dependents of `classes`, narrowed by removed constants.
    pub fn dependents_of_classes(
        &self,
        classes: &BTreeSet<String>,
        removed_constants: &BTreeSet<i32>,
    ) -> DependentsSet {
        self.analysis
            .relevant_dependents_of_all(classes, removed_constants)
    }

    /// Transitive local dependents of one class, narrowed by removed constants.
    pub fn dependents_of_class(
        &self,
        class_name: &str,
        removed_constants: &BTreeSet<i32>,
    ) -> DependentsSet {
        self.analysis.relevant_dependents(class_name, removed_constants)
    }

    /// Class compiled to `file_path`, relative to the classes directory.
    pub fn class_name_for_file(&self, file_path: &str) -> Option<&str> {
        self.analysis.class_name_for_file(file_path)
    }

    /// Constants `class_name` embedded when last compiled.
    pub fn constants_of(&self, class_name: &str) -> BTreeSet<i32> {
        self.analysis.constants_of(class_name)
    }
}
