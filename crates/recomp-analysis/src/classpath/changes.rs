//! Diff of two classpath snapshots as per-jar input changes.

use recomp_core::JarClasspathSnapshotData;

use crate::processor::InputChange;

/// Jars added or modified in `current` (in its classpath order), followed by
/// jars of `previous` that are gone.
pub fn classpath_changes(
    previous: &JarClasspathSnapshotData,
    current: &JarClasspathSnapshotData,
) -> Vec<InputChange> {
    let mut changes = Vec::new();
    for (jar, hash) in &current.jar_hashes {
        match previous.hash_of(jar) {
            None => changes.push(InputChange::added(jar.clone())),
            Some(before) if before != *hash => changes.push(InputChange::modified(jar.clone())),
            Some(_) => {}
        }
    }
    for (jar, _) in &previous.jar_hashes {
        if current.hash_of(jar).is_none() {
            changes.push(InputChange::removed(jar.clone()));
        }
    }
    changes
}
