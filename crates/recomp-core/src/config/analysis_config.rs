//! Class analysis configuration.

use serde::{Deserialize, Serialize};

/// Knobs for the class dependency analyzer and change processors.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Treat `package-info` classes as dependency-to-all. Default: true.
    pub package_info_dependency_to_all: Option<bool>,
    /// Treat annotation types with `@Retention(SOURCE)` as dependency-to-all. Default: true.
    pub source_retention_dependency_to_all: Option<bool>,
    /// Force a full rebuild when a changed jar duplicates classes already on
    /// the classpath. Default: true.
    pub detect_duplicates: Option<bool>,
}

impl AnalysisConfig {
    /// Whether `package-info` and `module-info` are dependencies to all (default true).
    pub fn effective_package_info_dependency_to_all(&self) -> bool {
        self.package_info_dependency_to_all.unwrap_or(true)
    }

    /// Whether source-retained annotation types are dependencies to all (default true).
    pub fn effective_source_retention_dependency_to_all(&self) -> bool {
        self.source_retention_dependency_to_all.unwrap_or(true)
    }

    /// Whether jars duplicating classpath classes force a full rebuild (default true).
    pub fn effective_detect_duplicates(&self) -> bool {
        self.detect_duplicates.unwrap_or(true)
    }
}
