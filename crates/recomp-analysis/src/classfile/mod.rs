//! Class dependency analysis: extracts a `ClassAnalysis` from class-file bytes.

pub mod analyzer;
mod bytecode;
pub mod caching;
pub mod descriptors;
pub mod reader;

use recomp_core::errors::AnalysisError;
use recomp_core::{ClassAnalysis, ContentHash};

pub use analyzer::ClassFileAnalyzer;
pub use caching::CachingClassDependencyAnalyzer;

/// Produces the dependency analysis of one compiled class.
///
/// `hash` is the content hash of `bytes`, so implementations may memoize.
pub trait ClassDependencyAnalyzer: Send + Sync {
    fn analyze(&self, hash: ContentHash, bytes: &[u8]) -> Result<ClassAnalysis, AnalysisError>;
}

impl<T: ClassDependencyAnalyzer + ?Sized> ClassDependencyAnalyzer for std::sync::Arc<T> {
    fn analyze(&self, hash: ContentHash, bytes: &[u8]) -> Result<ClassAnalysis, AnalysisError> {
        (**self).analyze(hash, bytes)
    }
}
