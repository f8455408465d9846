//! Class dependents accumulator: inverts per-class reference lists into a
//! dependents index while a jar or output directory is scanned.

use recomp_core::{ClassAnalysis, ClassSetAnalysisData};

/// Write-once builder of `ClassSetAnalysisData`. Nothing is ever removed.
#[derive(Debug, Default)]
pub struct ClassDependentsAccumulator {
    data: ClassSetAnalysisData,
}

impl ClassDependentsAccumulator {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one analyzed class found at `file`.
    pub fn add_class(&mut self, file: &str, analysis: &ClassAnalysis) {
        let name = &analysis.class_name;
        self.data
            .file_path_to_class_name
            .insert(file.to_string(), name.clone());

        for dependency in &analysis.class_dependencies {
            if dependency != name {
                self.data
                    .dependents
                    .entry(dependency.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }

        if !analysis.constants.is_empty() {
            self.data
                .class_to_constants
                .entry(name.clone())
                .or_default()
                .extend(analysis.constants.iter().copied());
        }

        if analysis.dependency_to_all {
            self.data.dependency_to_all.insert(name.clone());
        }
    }

    /// Part of the unit could not be analyzed: every later lookup against the
    /// resulting data reports dependency-to-all. The first reason wins.
    pub fn full_rebuild_needed(&mut self, reason: impl Into<String>) {
        if self.data.full_rebuild_cause.is_none() {
            self.data.full_rebuild_cause = Some(reason.into());
        }
    }

    /// True once a full rebuild has been requested.
    pub fn is_full_rebuild_needed(&self) -> bool {
        self.data.full_rebuild_cause.is_some()
    }

    /// Finish accumulating and return the analysis.
    pub fn into_analysis(self) -> ClassSetAnalysisData {
        self.data
    }
}
