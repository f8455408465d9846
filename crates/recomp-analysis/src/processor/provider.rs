//! Runs all changes of one compile invocation through the processors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use recomp_core::errors::AnalysisError;

use super::class_change::ClassChangeProcessor;
use super::jar_change::JarChangeProcessor;
use super::spec::RecompilationSpec;
use super::InputChange;
use crate::classfile::ClassDependencyAnalyzer;
use crate::classpath::JarClasspathSnapshot;
use crate::compilation::PreviousCompilation;

pub struct RecompilationSpecProvider {
    analyzer: Arc<dyn ClassDependencyAnalyzer>,
    classes_dir: PathBuf,
}

impl RecompilationSpecProvider {
    /// Provide specs for the classes compiled into `classes_dir`.
    pub fn new(analyzer: Arc<dyn ClassDependencyAnalyzer>, classes_dir: impl Into<PathBuf>) -> Self {
        Self {
            analyzer,
            classes_dir: classes_dir.into(),
        }
    }

    /// Directory holding the compiled classes.
    pub fn classes_dir(&self) -> &Path {
        &self.classes_dir
    }

    /// Jar changes first, then class changes, stopping at the first full
    /// rebuild. Without a previous compilation everything is rebuilt.
    pub fn provide(
        &self,
        previous: Option<&PreviousCompilation>,
        classpath: &JarClasspathSnapshot,
        jar_changes: &[InputChange],
        class_changes: &[InputChange],
    ) -> Result<RecompilationSpec, AnalysisError> {
        let mut spec = RecompilationSpec::new();
        let Some(previous) = previous else {
            spec.set_full_rebuild("no previous compilation", None);
            return Ok(spec);
        };

        let jars = JarChangeProcessor::new(previous, classpath);
        for change in jar_changes {
            if spec.is_full_rebuild() {
                break;
            }
            jars.process_change(change, &mut spec)?;
        }

        let classes = ClassChangeProcessor::new(previous, self.analyzer.as_ref(), &self.classes_dir);
        for change in class_changes {
            if spec.is_full_rebuild() {
                break;
            }
            classes.process_change(change, &mut spec);
        }

        tracing::debug!(
            full_rebuild = spec.is_full_rebuild(),
            classes = spec.classes_to_compile().len(),
            "recompilation spec computed"
        );
        Ok(spec)
    }

    /// `provide`, with an unusable baseline turned into a full rebuild
    /// instead of an error. Store failures still propagate.
    pub fn provide_or_full_rebuild(
        &self,
        previous: Option<&PreviousCompilation>,
        classpath: &JarClasspathSnapshot,
        jar_changes: &[InputChange],
        class_changes: &[InputChange],
    ) -> Result<RecompilationSpec, AnalysisError> {
        match self.provide(previous, classpath, jar_changes, class_changes) {
            Err(e @ AnalysisError::MissingJarSnapshot { .. }) => {
                let mut spec = RecompilationSpec::new();
                spec.set_full_rebuild(format!("previous compilation is unusable: {e}"), None);
                Ok(spec)
            }
            other => other,
        }
    }
}
