//! `RecompilationSpec`: accumulated result of change analysis.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRebuild {
    pub cause: String,
    pub file: Option<PathBuf>,
}

/// Either a set of classes to recompile or a full rebuild directive.
/// Once a full rebuild is set it is never cleared or replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecompilationSpec {
    classes_to_compile: BTreeSet<String>,
    full_rebuild: Option<FullRebuild>,
}

impl RecompilationSpec {
    /// An empty, incremental spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule one class for recompilation.
    pub fn add_class(&mut self, class_name: impl Into<String>) {
        self.classes_to_compile.insert(class_name.into());
    }

    /// Schedule every class in `classes` for recompilation.
    pub fn add_classes<I, S>(&mut self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes_to_compile
            .extend(classes.into_iter().map(Into::into));
    }

    /// Request a full rebuild. The first cause wins.
    pub fn set_full_rebuild(&mut self, cause: impl Into<String>, file: Option<&Path>) {
        if self.full_rebuild.is_some() {
            return;
        }
        let cause = cause.into();
        tracing::info!(
            cause = %cause,
            file = ?file.map(Path::display),
            "full recompilation required"
        );
        self.full_rebuild = Some(FullRebuild {
            cause,
            file: file.map(Path::to_path_buf),
        });
    }

    /// True once any cause demanded a full rebuild.
    pub fn is_full_rebuild(&self) -> bool {
        self.full_rebuild.is_some()
    }

    /// The first recorded full-rebuild cause, with the file that triggered it.
    pub fn full_rebuild(&self) -> Option<&FullRebuild> {
        self.full_rebuild.as_ref()
    }

    /// Message of the first full-rebuild cause.
    pub fn full_rebuild_cause(&self) -> Option<&str> {
        self.full_rebuild.as_ref().map(|f| f.cause.as_str())
    }

    /// Classes to recompile; meaningless once a full rebuild is required.
    pub fn classes_to_compile(&self) -> &BTreeSet<String> {
        &self.classes_to_compile
    }
}
