//! Decides what a changed local class file means for its dependents.

use std::collections::BTreeSet;
use std::path::Path;

use recomp_core::{ClassAnalysis, ContentHash, DependentsSet};

use super::spec::RecompilationSpec;
use super::{ChangeKind, InputChange};
use crate::classfile::ClassDependencyAnalyzer;
use crate::compilation::local::relative_key;
use crate::compilation::PreviousCompilation;

pub struct ClassChangeProcessor<'a> {
    previous: &'a PreviousCompilation,
    analyzer: &'a dyn ClassDependencyAnalyzer,
    classes_dir: &'a Path,
}

impl<'a> ClassChangeProcessor<'a> {
    /// Process changes to class files under `classes_dir`.
    pub fn new(
        previous: &'a PreviousCompilation,
        analyzer: &'a dyn ClassDependencyAnalyzer,
        classes_dir: &'a Path,
    ) -> Self {
        Self {
            previous,
            analyzer,
            classes_dir,
        }
    }

    /// Fold one class file change into `spec`.
    ///
    /// Dependents are transitive. Classes that inlined a constant the changed
    /// class no longer declares are added too; when the current class cannot
    /// be analyzed every previous constant counts as removed.
    pub fn process_change(&self, change: &InputChange, spec: &mut RecompilationSpec) {
        if spec.is_full_rebuild() {
            return;
        }
        let path = change.path.as_path();
        let key = relative_key(self.classes_dir, path).unwrap_or_else(|| path.display().to_string());

        let current = match change.kind {
            ChangeKind::Removed => None,
            ChangeKind::Added | ChangeKind::Modified => match self.analyze(path) {
                Ok(analysis) => Some(analysis),
                Err(cause) => {
                    spec.set_full_rebuild(format!("{key} {cause}"), Some(path));
                    return;
                }
            },
        };

        let class_name = match (self.previous.class_name_for_file(&key), &current) {
            (Some(name), _) => name.to_string(),
            (None, Some(analysis)) => analysis.class_name.clone(),
            (None, None) => {
                tracing::debug!(file = %key, "removed file unknown to previous compilation");
                return;
            }
        };

        if current.as_ref().is_some_and(|a| a.dependency_to_all) {
            spec.set_full_rebuild(
                format!("{class_name} is a dependency to all other classes"),
                Some(path),
            );
            return;
        }

        let previous_constants = self.previous.constants_of(&class_name);
        let removed_constants: BTreeSet<i32> = match &current {
            Some(analysis) => previous_constants
                .difference(&analysis.constants)
                .copied()
                .collect(),
            None => previous_constants,
        };

        match self.previous.dependents_of_class(&class_name, &removed_constants) {
            DependentsSet::Affected(dependents) => spec.add_classes(dependents),
            DependentsSet::DependencyToAll { reason } => {
                spec.set_full_rebuild(reason, Some(path));
                return;
            }
        }
        if change.kind != ChangeKind::Removed {
            spec.add_class(class_name);
        }
    }

    fn analyze(&self, path: &Path) -> Result<ClassAnalysis, &'static str> {
        let bytes = std::fs::read(path).map_err(|e| {
            tracing::debug!(file = %path.display(), error = %e, "unreadable class file");
            "could not be read"
        })?;
        self.analyzer
            .analyze(ContentHash::of_bytes(&bytes), &bytes)
            .map_err(|e| {
                tracing::debug!(file = %path.display(), error = %e, "class analysis failed");
                "could not be analyzed"
            })
    }
}
