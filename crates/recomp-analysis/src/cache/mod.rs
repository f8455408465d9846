//! Tiered jar snapshot cache.
//!
//! - `InMemoryJarSnapshotCache`: moka, access-expiring, optional backing tier.
//! - `PersistentJarSnapshotCache`: content-addressed records in an `IKeyValueStore`.
//! - `SplitJarSnapshotCache`: routes immutable artifact jars to the global
//!   tier and everything else to a project-local tier.

pub mod memory;
pub mod persistent;
pub mod split;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use recomp_core::errors::AnalysisError;
use recomp_core::ContentHash;

use crate::jar::JarSnapshot;

pub use memory::InMemoryJarSnapshotCache;
pub use persistent::PersistentJarSnapshotCache;
pub use split::SplitJarSnapshotCache;

/// Computes a snapshot on a cache miss.
pub type SnapshotFactory<'a> = dyn FnMut() -> Result<JarSnapshot, AnalysisError> + 'a;

/// Content-addressed store of jar snapshots.
pub trait JarSnapshotCache: Send + Sync {
    /// The snapshot stored under `hash`, or the factory's result, stored.
    /// `jar` is only used for routing and diagnostics.
    fn get(
        &self,
        jar: &Path,
        hash: ContentHash,
        factory: &mut SnapshotFactory<'_>,
    ) -> Result<JarSnapshot, AnalysisError>;

    /// Resolve a whole classpath's snapshots. A hash with no stored snapshot
    /// is `AnalysisError::MissingJarSnapshot`.
    fn get_jar_snapshots(
        &self,
        jar_hashes: &BTreeMap<PathBuf, ContentHash>,
    ) -> Result<BTreeMap<PathBuf, JarSnapshot>, AnalysisError>;
}

impl<T: JarSnapshotCache + ?Sized> JarSnapshotCache for Arc<T> {
    fn get(
        &self,
        jar: &Path,
        hash: ContentHash,
        factory: &mut SnapshotFactory<'_>,
    ) -> Result<JarSnapshot, AnalysisError> {
        (**self).get(jar, hash, factory)
    }

    fn get_jar_snapshots(
        &self,
        jar_hashes: &BTreeMap<PathBuf, ContentHash>,
    ) -> Result<BTreeMap<PathBuf, JarSnapshot>, AnalysisError> {
        (**self).get_jar_snapshots(jar_hashes)
    }
}
