//! Decides what a changed classpath jar means for the local classes.

use std::collections::BTreeSet;
use std::path::Path;

use recomp_core::errors::AnalysisError;
use recomp_core::DependentsSet;

use super::spec::RecompilationSpec;
use super::{ChangeKind, InputChange};
use crate::classpath::JarClasspathSnapshot;
use crate::compilation::PreviousCompilation;
use crate::jar::JarSnapshot;

pub struct JarChangeProcessor<'a> {
    previous: &'a PreviousCompilation,
    classpath: &'a JarClasspathSnapshot,
}

impl<'a> JarChangeProcessor<'a> {
    /// Process jar changes against `previous` and the current `classpath`.
    pub fn new(previous: &'a PreviousCompilation, classpath: &'a JarClasspathSnapshot) -> Self {
        Self {
            previous,
            classpath,
        }
    }

    /// Fold one jar change into `spec`. Does nothing once `spec` is a full
    /// rebuild. Errors only on missing previous snapshot data or store failure.
    pub fn process_change(
        &self,
        change: &InputChange,
        spec: &mut RecompilationSpec,
    ) -> Result<(), AnalysisError> {
        if spec.is_full_rebuild() {
            return Ok(());
        }
        let jar = change.path.as_path();
        let current = match change.kind {
            ChangeKind::Removed => None,
            ChangeKind::Added | ChangeKind::Modified => self.classpath.snapshot_for(jar),
        };

        match (change.kind, current) {
            (ChangeKind::Added, Some(current)) => {
                self.check_duplicates(jar, current, spec);
                Ok(())
            }
            // Added but not on the classpath snapshot: nothing compiled against it.
            (ChangeKind::Added, None) => Ok(()),
            (_, None) => self.process_removed(jar, spec),
            (_, Some(current)) => self.process_modified(jar, current, spec),
        }
    }

    fn check_duplicates(&self, jar: &Path, current: &JarSnapshot, spec: &mut RecompilationSpec) -> bool {
        if self.classpath.is_any_class_duplicated(current) {
            spec.set_full_rebuild(
                format!(
                    "at least one of the classes of '{}' is already present in the classpath",
                    display_name(jar)
                ),
                Some(jar),
            );
            return true;
        }
        false
    }

    fn previous_snapshot(
        &self,
        jar: &Path,
        spec: &mut RecompilationSpec,
    ) -> Result<Option<JarSnapshot>, AnalysisError> {
        let previous = self.previous.jar_snapshot(jar)?;
        if previous.is_none() {
            spec.set_full_rebuild(
                format!("missing jar snapshot of '{}' from previous build", display_name(jar)),
                Some(jar),
            );
        }
        Ok(previous)
    }

    fn process_removed(&self, jar: &Path, spec: &mut RecompilationSpec) -> Result<(), AnalysisError> {
        let Some(previous) = self.previous_snapshot(jar, spec)? else {
            return Ok(());
        };
        let classes = match previous.all_classes() {
            DependentsSet::Affected(classes) => classes,
            DependentsSet::DependencyToAll { reason } => {
                spec.set_full_rebuild(reason, Some(jar));
                return Ok(());
            }
        };
        let removed_constants: BTreeSet<i32> = previous
            .analysis()
            .class_to_constants
            .values()
            .flatten()
            .copied()
            .collect();
        self.add_local_dependents(jar, &classes, &removed_constants, spec);
        Ok(())
    }

    fn process_modified(
        &self,
        jar: &Path,
        current: &JarSnapshot,
        spec: &mut RecompilationSpec,
    ) -> Result<(), AnalysisError> {
        if self.check_duplicates(jar, current, spec) {
            return Ok(());
        }
        let Some(previous) = self.previous_snapshot(jar, spec)? else {
            return Ok(());
        };
        let affected = current.affected_classes_since(&previous);
        let altered = match affected.altered {
            DependentsSet::Affected(classes) => classes,
            DependentsSet::DependencyToAll { reason } => {
                spec.set_full_rebuild(reason, Some(jar));
                return Ok(());
            }
        };
        tracing::debug!(
            jar = %display_name(jar),
            altered = altered.len(),
            added = affected.added.len(),
            "jar changed"
        );
        self.add_local_dependents(jar, &altered, &affected.removed_constants, spec);
        Ok(())
    }

    fn add_local_dependents(
        &self,
        jar: &Path,
        classes: &BTreeSet<String>,
        removed_constants: &BTreeSet<i32>,
        spec: &mut RecompilationSpec,
    ) {
        match self.previous.dependents_of_classes(classes, removed_constants) {
            DependentsSet::Affected(dependents) => spec.add_classes(dependents),
            DependentsSet::DependencyToAll { reason } => spec.set_full_rebuild(reason, Some(jar)),
        }
    }
}

fn display_name(jar: &Path) -> String {
    jar.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| jar.display().to_string())
}
