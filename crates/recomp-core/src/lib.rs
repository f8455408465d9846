//! # recomp-core
//!
//! Foundation crate for the recomp incremental compilation engine.
//! Defines the snapshot data model, content hashing, the binary record codec,
//! errors, config, tracing, and the storage traits.
//! Every other crate in the workspace depends on this.

pub mod codec;
pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::RecompConfig;
pub use errors::error_code::RecompErrorCode;
pub use types::analysis::{ClassAnalysis, ClassSetAnalysisData, DependentsSet};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::hash::ContentHash;
pub use types::snapshot::{JarClasspathSnapshotData, JarSnapshotData};
