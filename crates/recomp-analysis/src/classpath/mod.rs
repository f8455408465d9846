//! Classpath-level aggregation of jar snapshots.

pub mod changes;
pub mod factory;
pub mod snapshot;

pub use changes::classpath_changes;
pub use factory::JarClasspathSnapshotFactory;
pub use snapshot::JarClasspathSnapshot;
