//! Jar archives, jar snapshots, and the snapshotter that produces them.

pub mod archive;
pub mod snapshot;
pub mod snapshotter;

pub use archive::JarArchive;
pub use snapshot::{AffectedClasses, JarSnapshot};
pub use snapshotter::JarSnapshotter;
