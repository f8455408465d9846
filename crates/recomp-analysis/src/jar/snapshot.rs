//! `JarSnapshot`: queryable, cheaply cloned view of a `JarSnapshotData`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use recomp_core::{ClassSetAnalysisData, ContentHash, DependentsSet, JarSnapshotData};

/// Result of comparing a jar snapshot against an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedClasses {
    /// Changed or removed classes plus their direct in-jar dependents.
    pub altered: DependentsSet,
    /// Classes present now but not before.
    pub added: BTreeSet<String>,
    /// Constant values the altered classes carried before and no longer do.
    pub removed_constants: BTreeSet<i32>,
}

/// Shared handle to one jar's snapshot.
#[derive(Debug, Clone)]
pub struct JarSnapshot {
    data: Arc<JarSnapshotData>,
}

impl JarSnapshot {
    /// Wrap a snapshot record.
    pub fn new(data: JarSnapshotData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// The underlying record.
    pub fn data(&self) -> &JarSnapshotData {
        &self.data
    }

    /// Content hash of the whole jar.
    pub fn hash(&self) -> ContentHash {
        self.data.hash
    }

    /// Content hash of each class, by binary name.
    pub fn hashes(&self) -> &BTreeMap<String, ContentHash> {
        &self.data.hashes
    }

    /// Dependency analysis of the jar's classes.
    pub fn analysis(&self) -> &ClassSetAnalysisData {
        &self.data.analysis
    }

    /// Binary names of every class in the jar.
    pub fn class_names(&self) -> impl Iterator<Item = &String> {
        self.data.hashes.keys()
    }

    /// True when the jar defines `class_name`.
    pub fn contains_class(&self, class_name: &str) -> bool {
        self.data.hashes.contains_key(class_name)
    }

    /// True when both handles share one cached record.
    pub fn is_same_instance(&self, other: &JarSnapshot) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Every class in the jar, or dependency-to-all when any of them is one
    /// (or the jar could not be fully analyzed).
    pub fn all_classes(&self) -> DependentsSet {
        let analysis = &self.data.analysis;
        if let Some(cause) = &analysis.full_rebuild_cause {
            return DependentsSet::dependency_to_all(cause.clone());
        }
        if let Some(class_name) = analysis.dependency_to_all.iter().next() {
            return DependentsSet::dependency_to_all(format!(
                "{class_name} is a dependency to all other classes"
            ));
        }
        DependentsSet::Affected(self.data.hashes.keys().cloned().collect())
    }

    /// Classes present now that `previous` did not have.
    pub fn added_classes_since(&self, previous: &JarSnapshot) -> BTreeSet<String> {
        self.data
            .hashes
            .keys()
            .filter(|name| !previous.contains_class(name))
            .cloned()
            .collect()
    }

    /// Classes of `previous` that changed or disappeared, with one level of
    /// their dependents as recorded in `previous`.
    pub fn affected_classes_since(&self, previous: &JarSnapshot) -> AffectedClasses {
        let added = self.added_classes_since(previous);
        let mut removed_constants = BTreeSet::new();
        let altered = self.altered_since(previous, &added, &mut removed_constants);
        AffectedClasses {
            altered,
            added,
            removed_constants,
        }
    }

    fn altered_since(
        &self,
        previous: &JarSnapshot,
        added: &BTreeSet<String>,
        removed_constants: &mut BTreeSet<i32>,
    ) -> DependentsSet {
        if self.hash() == previous.hash() {
            return DependentsSet::empty();
        }
        let current = &self.data.analysis;
        let before = &previous.data.analysis;

        if let Some(cause) = &current.full_rebuild_cause {
            return DependentsSet::dependency_to_all(cause.clone());
        }
        if let Some(class_name) = added.iter().find(|c| current.is_dependency_to_all(c)) {
            return DependentsSet::dependency_to_all(format!(
                "added class {class_name} is a dependency to all other classes"
            ));
        }

        let mut affected = BTreeSet::new();
        for (class_name, previous_hash) in previous.hashes() {
            if self.data.hashes.get(class_name) == Some(previous_hash) {
                continue;
            }
            if current.is_dependency_to_all(class_name) {
                return DependentsSet::dependency_to_all(format!(
                    "{class_name} is a dependency to all other classes"
                ));
            }
            let dependents = match before.dependents_of(class_name) {
                DependentsSet::Affected(dependents) => dependents,
                dta => return dta,
            };
            if let Some(dependent) = dependents.iter().find(|d| before.is_dependency_to_all(d)) {
                return DependentsSet::dependency_to_all(format!(
                    "{dependent} depends on {class_name} and is a dependency to all other classes"
                ));
            }
            affected.extend(dependents);
            removed_constants.extend(
                before
                    .constants_of(class_name)
                    .difference(&current.constants_of(class_name))
                    .copied(),
            );
            affected.insert(class_name.clone());
        }
        DependentsSet::Affected(affected)
    }
}

impl From<JarSnapshotData> for JarSnapshot {
    fn from(data: JarSnapshotData) -> Self {
        Self::new(data)
    }
}

impl PartialEq for JarSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_instance(other) || self.data == other.data
    }
}

impl Eq for JarSnapshot {}
