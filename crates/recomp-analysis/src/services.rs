//! `CompileCaches`: explicitly constructed wiring of analyzer, snapshot
//! cache tiers and the previous-compilation store.
//!
//! One instance per build process. Stores are injected so tests can run on
//! fresh in-memory stores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use recomp_core::errors::AnalysisError;
use recomp_core::traits::storage::IKeyValueStore;
use recomp_core::RecompConfig;

use crate::cache::{
    InMemoryJarSnapshotCache, JarSnapshotCache, PersistentJarSnapshotCache, SplitJarSnapshotCache,
};
use crate::classfile::caching::CachingClassDependencyAnalyzer;
use crate::classfile::{ClassDependencyAnalyzer, ClassFileAnalyzer};
use crate::classpath::{classpath_changes, JarClasspathSnapshot, JarClasspathSnapshotFactory};
use crate::compilation::{LocalClassSetAnalyzer, PreviousCompilation, PreviousCompilationStore};
use crate::jar::JarSnapshotter;
use crate::processor::{InputChange, RecompilationSpec, RecompilationSpecProvider};

/// Analyzer, snapshot cache tiers and baseline store for one build process.
pub struct CompileCaches {
    analyzer: Arc<dyn ClassDependencyAnalyzer>,
    snapshot_cache: Arc<dyn JarSnapshotCache>,
    /// Persistent half of the local tier, pruned after every recorded build.
    local_snapshots: Arc<PersistentJarSnapshotCache>,
    previous_store: PreviousCompilationStore,
    detect_duplicates: bool,
}

impl CompileCaches {
    /// `global_store` is shared machine-wide; `task_store` belongs to one
    /// project. They must be distinct stores: snapshots in `task_store` that
    /// no recorded classpath references are deleted.
    pub fn new(
        config: &RecompConfig,
        global_store: Arc<dyn IKeyValueStore>,
        task_store: Arc<dyn IKeyValueStore>,
    ) -> Self {
        let analyzer: Arc<dyn ClassDependencyAnalyzer> = Arc::new(CachingClassDependencyAnalyzer::new(
            Arc::new(ClassFileAnalyzer::new(&config.analysis)),
            config.cache.effective_class_analysis_capacity(),
        ));

        let global = InMemoryJarSnapshotCache::from_config(&config.cache)
            .backed_by(Arc::new(PersistentJarSnapshotCache::new(global_store)));
        let local_snapshots = Arc::new(PersistentJarSnapshotCache::new(task_store.clone()));
        let local = InMemoryJarSnapshotCache::from_config(&config.cache)
            .backed_by(local_snapshots.clone());
        let snapshot_cache: Arc<dyn JarSnapshotCache> = Arc::new(SplitJarSnapshotCache::new(
            config.cache.immutable_root_paths(),
            Arc::new(global),
            Arc::new(local),
        ));

        tracing::debug!(
            immutable_roots = config.cache.immutable_roots.len(),
            "compile caches ready"
        );
        Self {
            analyzer,
            snapshot_cache,
            local_snapshots,
            previous_store: PreviousCompilationStore::new(task_store),
            detect_duplicates: config.analysis.effective_detect_duplicates(),
        }
    }

    /// The shared, memoizing class analyzer.
    pub fn analyzer(&self) -> Arc<dyn ClassDependencyAnalyzer> {
        self.analyzer.clone()
    }

    /// The tiered jar snapshot cache.
    pub fn snapshot_cache(&self) -> Arc<dyn JarSnapshotCache> {
        self.snapshot_cache.clone()
    }

    /// A jar snapshotter over the shared analyzer.
    pub fn snapshotter(&self) -> JarSnapshotter {
        JarSnapshotter::new(self.analyzer.clone())
    }

    /// A classpath snapshot factory over the tiered cache.
    pub fn classpath_snapshot_factory(&self) -> JarClasspathSnapshotFactory {
        JarClasspathSnapshotFactory::new(self.snapshotter(), self.snapshot_cache.clone())
            .with_duplicate_detection(self.detect_duplicates)
    }

    /// An analyzer for a task's compiled output directory.
    pub fn local_analyzer(&self) -> LocalClassSetAnalyzer {
        LocalClassSetAnalyzer::new(self.analyzer.clone())
    }

    /// A spec provider for the classes compiled into `classes_dir`.
    pub fn spec_provider(&self, classes_dir: impl Into<PathBuf>) -> RecompilationSpecProvider {
        RecompilationSpecProvider::new(self.analyzer.clone(), classes_dir)
    }

    /// The recorded baseline of `task`, if there is one.
    pub fn load_previous(&self, task: &str) -> Result<Option<PreviousCompilation>, AnalysisError> {
        self.previous_store.load(task, self.snapshot_cache.clone())
    }

    /// Persist the baseline after a successful compile of `task`, then drop
    /// local snapshots that no task's baseline references any more.
    pub fn record_compilation(
        &self,
        task: &str,
        classes_dir: &Path,
        classpath: &JarClasspathSnapshot,
    ) -> Result<(), AnalysisError> {
        let analysis = self.local_analyzer().analyze_dir(classes_dir)?;
        self.previous_store.save(task, &analysis, classpath.data())?;
        self.prune_local_snapshots()
    }

    /// Forget the baseline of `task`; its next build is a full rebuild.
    pub fn forget(&self, task: &str) -> Result<(), AnalysisError> {
        self.previous_store.remove(task)?;
        self.prune_local_snapshots()
    }

    fn prune_local_snapshots(&self) -> Result<(), AnalysisError> {
        let referenced = self.previous_store.referenced_jar_hashes()?;
        let removed = self.local_snapshots.retain(&referenced)?;
        if removed > 0 {
            tracing::debug!(removed, kept = referenced.len(), "pruned local jar snapshots");
        }
        Ok(())
    }

    /// Snapshot `classpath`, diff it against the previous compilation of
    /// `task`, and compute what to recompile for `class_changes`.
    ///
    /// The classpath snapshot is returned so the caller can record it after
    /// the compiler succeeds.
    pub fn recompilation_spec(
        &self,
        task: &str,
        classpath: &[PathBuf],
        classes_dir: &Path,
        class_changes: &[InputChange],
    ) -> Result<(RecompilationSpec, JarClasspathSnapshot), AnalysisError> {
        let current = self.classpath_snapshot_factory().create_snapshot(classpath)?;
        let previous = self.load_previous(task)?;
        let jar_changes = previous
            .as_ref()
            .map(|p| classpath_changes(p.classpath(), current.data()))
            .unwrap_or_default();
        let spec = self.spec_provider(classes_dir).provide_or_full_rebuild(
            previous.as_ref(),
            &current,
            &jar_changes,
            class_changes,
        )?;
        Ok((spec, current))
    }
}
