//! Queries over a finished `ClassSetAnalysisData`.

use std::collections::BTreeSet;

use recomp_core::{ClassSetAnalysisData, DependentsSet, FxHashSet};

/// Read-only view answering "what must be recompiled if this class changes".
#[derive(Debug, Clone, Default)]
pub struct ClassSetAnalysis {
    data: ClassSetAnalysisData,
}

impl ClassSetAnalysis {
    /// Wrap recorded analysis data.
    pub fn new(data: ClassSetAnalysisData) -> Self {
        Self { data }
    }

    /// The underlying record.
    pub fn data(&self) -> &ClassSetAnalysisData {
        &self.data
    }

    /// Unwrap into the underlying record.
    pub fn into_data(self) -> ClassSetAnalysisData {
        self.data
    }

    /// One level of dependents.
    pub fn dependents_of(&self, class_name: &str) -> DependentsSet {
        self.data.dependents_of(class_name)
    }

    /// Transitive dependents of `class_name`.
    ///
    /// `removed_constants` are values the class no longer carries. Classes
    /// that inlined one of them do not reference the class in their bytecode,
    /// so they are found through their embedded constants instead. Classes
    /// embedding only values that are still present are left out.
    ///
    /// Any dependency-to-all class reached makes the whole result
    /// dependency-to-all.
    pub fn relevant_dependents(
        &self,
        class_name: &str,
        removed_constants: &BTreeSet<i32>,
    ) -> DependentsSet {
        let direct = match self.dependents_of(class_name) {
            DependentsSet::Affected(classes) => classes,
            dta @ DependentsSet::DependencyToAll { .. } => return dta,
        };

        let mut pending: Vec<String> = direct.into_iter().collect();
        if !removed_constants.is_empty() {
            pending.extend(
                self.data
                    .classes_embedding(removed_constants, class_name)
                    .map(str::to_string),
            );
        }

        let mut visited = FxHashSet::default();
        let mut result = BTreeSet::new();
        while let Some(dependent) = pending.pop() {
            if !visited.insert(dependent.clone()) {
                continue;
            }
            match self.dependents_of(&dependent) {
                DependentsSet::Affected(next) => {
                    pending.extend(next.into_iter().filter(|c| !visited.contains(c)));
                }
                DependentsSet::DependencyToAll { reason } => {
                    return DependentsSet::dependency_to_all(format!(
                        "{dependent} depends on {class_name}: {reason}"
                    ));
                }
            }
            result.insert(dependent);
        }
        result.remove(class_name);
        DependentsSet::Affected(result)
    }

    /// Union of `relevant_dependents` over `classes`, stopping at the first
    /// dependency-to-all.
    pub fn relevant_dependents_of_all<'a>(
        &self,
        classes: impl IntoIterator<Item = &'a String>,
        removed_constants: &BTreeSet<i32>,
    ) -> DependentsSet {
        let mut result = BTreeSet::new();
        for class_name in classes {
            match self.relevant_dependents(class_name, removed_constants) {
                DependentsSet::Affected(classes) => result.extend(classes),
                dta => return dta,
            }
        }
        DependentsSet::Affected(result)
    }

    /// Class compiled to `file_path`, relative to the classes directory.
    pub fn class_name_for_file(&self, file_path: &str) -> Option<&str> {
        self.data.class_name_for_file(file_path)
    }

    /// Constants `class_name` embeds; empty for unknown classes.
    pub fn constants_of(&self, class_name: &str) -> BTreeSet<i32> {
        self.data.constants_of(class_name)
    }
}

impl From<ClassSetAnalysisData> for ClassSetAnalysis {
    fn from(data: ClassSetAnalysisData) -> Self {
        Self::new(data)
    }
}
