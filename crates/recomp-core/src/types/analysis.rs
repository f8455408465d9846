//! Per-class and per-class-set dependency analysis records.

use std::collections::{BTreeMap, BTreeSet};

// ─── ClassAnalysis ──────────────────────────────────────────────────

/// What the class dependency analyzer extracts from one class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAnalysis {
    pub class_name: String,
    /// Every class this class's bytecode references (self excluded).
    pub class_dependencies: BTreeSet<String>,
    /// Any change to this class forces a full rebuild.
    pub dependency_to_all: bool,
    /// Numeric constant values embedded in the bytecode.
    pub constants: BTreeSet<i32>,
}

impl ClassAnalysis {
    /// An analysis of `class_name` with no dependencies or constants yet.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            class_dependencies: BTreeSet::new(),
            dependency_to_all: false,
            constants: BTreeSet::new(),
        }
    }

    /// Add a class this one references.
    pub fn with_dependency(mut self, class_name: impl Into<String>) -> Self {
        self.class_dependencies.insert(class_name.into());
        self
    }

    /// Add a constant value this class embeds.
    pub fn with_constant(mut self, value: i32) -> Self {
        self.constants.insert(value);
        self
    }

    /// Mark this class as a dependency to all others.
    pub fn with_dependency_to_all(mut self) -> Self {
        self.dependency_to_all = true;
        self
    }
}

// ─── DependentsSet ──────────────────────────────────────────────────

/// Answer to "who is affected if this changes".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependentsSet {
    /// A concrete, enumerable set of affected classes.
    Affected(BTreeSet<String>),
    /// The change cannot be scoped; everything must be recompiled.
    DependencyToAll { reason: String },
}

impl DependentsSet {
    /// No dependents.
    pub fn empty() -> Self {
        Self::Affected(BTreeSet::new())
    }

    /// Everything depends on it, for `reason`.
    pub fn dependency_to_all(reason: impl Into<String>) -> Self {
        Self::DependencyToAll {
            reason: reason.into(),
        }
    }

    /// True for the dependency-to-all variant.
    pub fn is_dependency_to_all(&self) -> bool {
        matches!(self, Self::DependencyToAll { .. })
    }

    /// The enumerated classes, or `None` for a dependency-to-all result.
    pub fn dependent_classes(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Affected(classes) => Some(classes),
            Self::DependencyToAll { .. } => None,
        }
    }

    /// Why everything depends on it, for the dependency-to-all variant.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Affected(_) => None,
            Self::DependencyToAll { reason } => Some(reason),
        }
    }
}

// ─── ClassSetAnalysisData ───────────────────────────────────────────

/// Aggregate analysis of a set of classes (one jar, or one compile output).
///
/// Edges are stored in dependents direction: `dependents["A"]` holds every
/// class that references `A`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSetAnalysisData {
    pub file_path_to_class_name: BTreeMap<String, String>,
    pub dependents: BTreeMap<String, BTreeSet<String>>,
    pub class_to_constants: BTreeMap<String, BTreeSet<i32>>,
    pub dependency_to_all: BTreeSet<String>,
    /// Set when part of the unit could not be analyzed. Every lookup against
    /// this data then reports dependency-to-all.
    pub full_rebuild_cause: Option<String>,
}

impl ClassSetAnalysisData {
    /// Direct (one level) dependents of `class_name`.
    pub fn dependents_of(&self, class_name: &str) -> DependentsSet {
        if let Some(cause) = &self.full_rebuild_cause {
            return DependentsSet::dependency_to_all(cause.clone());
        }
        if self.dependency_to_all.contains(class_name) {
            return DependentsSet::dependency_to_all(format!(
                "{class_name} is a dependency to all other classes"
            ));
        }
        DependentsSet::Affected(self.dependents.get(class_name).cloned().unwrap_or_default())
    }

    /// Constants embedded by `class_name`; empty when unknown.
    pub fn constants_of(&self, class_name: &str) -> BTreeSet<i32> {
        self.class_to_constants
            .get(class_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Class compiled to `file_path`, relative to the classes directory.
    pub fn class_name_for_file(&self, file_path: &str) -> Option<&str> {
        self.file_path_to_class_name
            .get(file_path)
            .map(String::as_str)
    }

    /// Classes whose bytecode embeds any of `values`, excluding `except`.
    pub fn classes_embedding<'a>(
        &'a self,
        values: &'a BTreeSet<i32>,
        except: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.class_to_constants
            .iter()
            .filter(move |(name, constants)| {
                name.as_str() != except && !constants.is_disjoint(values)
            })
            .map(|(name, _)| name.as_str())
    }

    /// True when `class_name` is recorded as a dependency to all.
    pub fn is_dependency_to_all(&self, class_name: &str) -> bool {
        self.full_rebuild_cause.is_some() || self.dependency_to_all.contains(class_name)
    }
}
