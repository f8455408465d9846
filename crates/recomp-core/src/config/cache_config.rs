//! Snapshot cache configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the tiered jar snapshot cache.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds an in-memory snapshot survives without being accessed. Default: 300.
    pub memory_expiry_secs: Option<u64>,
    /// Maximum in-memory jar snapshots. Default: 10_000.
    pub memory_capacity: Option<u64>,
    /// Maximum memoized per-class analyses. Default: 50_000.
    pub class_analysis_capacity: Option<u64>,
    /// Directory of the machine-wide snapshot store. Default: `$HOME/.recomp/caches`.
    pub global_dir: Option<String>,
    /// Absolute directories whose jars never change in place (artifact caches).
    /// Jars under these roots are snapshotted into the global cache.
    #[serde(default)]
    pub immutable_roots: Vec<String>,
}

impl CacheConfig {
    /// Returns the in-memory access expiry, defaulting to five minutes.
    pub fn effective_memory_expiry(&self) -> Duration {
        Duration::from_secs(self.memory_expiry_secs.unwrap_or(300))
    }

    /// Jar snapshots held per in-memory tier.
    pub fn effective_memory_capacity(&self) -> u64 {
        self.memory_capacity.unwrap_or(10_000)
    }

    /// Class analyses memoized in memory.
    pub fn effective_class_analysis_capacity(&self) -> u64 {
        self.class_analysis_capacity.unwrap_or(50_000)
    }

    /// Returns the global store directory, falling back to `$HOME/.recomp/caches`
    /// and finally to a directory under the system temp dir.
    pub fn effective_global_dir(&self) -> PathBuf {
        if let Some(dir) = &self.global_dir {
            return PathBuf::from(dir);
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".recomp").join("caches"),
            None => std::env::temp_dir().join("recomp-caches"),
        }
    }

    /// `immutable_roots` as paths.
    pub fn immutable_root_paths(&self) -> Vec<PathBuf> {
        self.immutable_roots.iter().map(PathBuf::from).collect()
    }
}
