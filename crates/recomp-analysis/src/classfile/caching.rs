//! Memoizing analyzer: the same class bytes (same content hash) are analyzed
//! once per process, no matter how many jars or builds contain them.

use std::sync::Arc;

use moka::sync::Cache;
use recomp_core::errors::AnalysisError;
use recomp_core::{ClassAnalysis, ContentHash};

use super::ClassDependencyAnalyzer;

/// Memoizes another analyzer's results by class content hash.
pub struct CachingClassDependencyAnalyzer {
    delegate: Arc<dyn ClassDependencyAnalyzer>,
    cache: Cache<ContentHash, ClassAnalysis>,
}

impl CachingClassDependencyAnalyzer {
    /// Memoize up to `capacity` results of `delegate`, keyed by content hash.
    pub fn new(delegate: Arc<dyn ClassDependencyAnalyzer>, capacity: u64) -> Self {
        Self {
            delegate,
            cache: Cache::new(capacity),
        }
    }

    /// Number of memoized analyses.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl ClassDependencyAnalyzer for CachingClassDependencyAnalyzer {
    fn analyze(&self, hash: ContentHash, bytes: &[u8]) -> Result<ClassAnalysis, AnalysisError> {
        if let Some(hit) = self.cache.get(&hash) {
            return Ok(hit);
        }
        // Failures are not cached; the caller demotes the unit anyway.
        let analysis = self.delegate.analyze(hash, bytes)?;
        self.cache.insert(hash, analysis.clone());
        Ok(analysis)
    }
}
