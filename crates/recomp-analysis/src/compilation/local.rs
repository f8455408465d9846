//! Analysis of a task's compiled output directory.

use std::path::Path;
use std::sync::Arc;

use recomp_core::errors::AnalysisError;
use recomp_core::{ClassSetAnalysisData, ContentHash};

use crate::accumulator::ClassDependentsAccumulator;
use crate::classfile::ClassDependencyAnalyzer;

pub struct LocalClassSetAnalyzer {
    analyzer: Arc<dyn ClassDependencyAnalyzer>,
}

impl LocalClassSetAnalyzer {
    /// Analyze class files with `analyzer`.
    pub fn new(analyzer: Arc<dyn ClassDependencyAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Accumulate every `.class` file under `classes_dir`.
    ///
    /// File keys are `/`-separated paths relative to `classes_dir`. A class
    /// that cannot be read or analyzed demotes the whole directory. A missing
    /// directory yields an empty analysis.
    pub fn analyze_dir(&self, classes_dir: &Path) -> Result<ClassSetAnalysisData, AnalysisError> {
        let mut accumulator = ClassDependentsAccumulator::new();
        if !classes_dir.is_dir() {
            return Ok(accumulator.into_analysis());
        }

        let mut builder = ignore::WalkBuilder::new(classes_dir);
        builder.standard_filters(false).follow_links(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(dir = %classes_dir.display(), error = %e, "walk error");
                    accumulator.full_rebuild_needed(format!(
                        "{} could not be fully listed",
                        classes_dir.display()
                    ));
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("class") {
                continue;
            }
            files.push(entry.into_path());
        }
        files.sort();

        for path in files {
            let Some(relative) = relative_key(classes_dir, &path) else {
                continue;
            };
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!(file = %relative, error = %e, "unreadable class file");
                    accumulator.full_rebuild_needed(format!("{relative} could not be read"));
                    continue;
                }
            };
            match self.analyzer.analyze(ContentHash::of_bytes(&bytes), &bytes) {
                Ok(analysis) => accumulator.add_class(&relative, &analysis),
                Err(e) => {
                    tracing::debug!(file = %relative, error = %e, "class analysis failed");
                    accumulator.full_rebuild_needed(format!("{relative} could not be analyzed"));
                }
            }
        }
        Ok(accumulator.into_analysis())
    }
}

/// `root/com/x/A.class` → `com/x/A.class`.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
