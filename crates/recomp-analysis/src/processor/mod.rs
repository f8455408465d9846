//! Change processors: turn changed inputs into a `RecompilationSpec`.

pub mod class_change;
pub mod jar_change;
pub mod provider;
pub mod spec;

use std::path::PathBuf;

pub use class_change::ClassChangeProcessor;
pub use jar_change::JarChangeProcessor;
pub use provider::RecompilationSpecProvider;
pub use spec::{FullRebuild, RecompilationSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One changed input file: a classpath jar or a compiled local class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl InputChange {
    /// A change of `kind` to the file at `path`.
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// A file that did not exist before.
    pub fn added(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Added)
    }

    /// A file whose content changed.
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Modified)
    }

    /// A file that no longer exists.
    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Removed)
    }
}
