//! Jar snapshotting and snapshot comparison over real jars on disk.

mod common;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use common::{write_class_jar, write_jar, ClassFileBuilder};
use recomp_analysis::{ClassFileAnalyzer, JarArchive, JarSnapshot, JarSnapshotter};
use recomp_core::codec::BinaryRecord;
use recomp_core::DependentsSet;
use tempfile::TempDir;

fn snapshot(path: &Path) -> JarSnapshot {
    let archive = JarArchive::new(path);
    let hash = archive.content_hash().unwrap();
    JarSnapshotter::new(Arc::new(ClassFileAnalyzer::default())).create_snapshot(hash, &archive)
}

fn jar(dir: &TempDir, name: &str, classes: &[ClassFileBuilder]) -> JarSnapshot {
    let path = dir.path().join(name);
    write_class_jar(&path, classes).unwrap();
    snapshot(&path)
}

fn names(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn a() -> ClassFileBuilder {
    ClassFileBuilder::new("com.x.A")
}

fn b() -> ClassFileBuilder {
    ClassFileBuilder::new("com.x.B").depends_on("com.x.A")
}

fn c() -> ClassFileBuilder {
    ClassFileBuilder::new("com.x.C")
}

// ─── Snapshot content ───────────────────────────────────────────────

#[test]
fn snapshot_records_classes_and_dependents() {
    let dir = TempDir::new().unwrap();
    let snap = jar(&dir, "lib.jar", &[a(), b(), c()]);

    assert_eq!(snap.class_names().cloned().collect::<BTreeSet<_>>(), names(&["com.x.A", "com.x.B", "com.x.C"]));
    assert_eq!(
        snap.analysis().dependents_of("com.x.A"),
        DependentsSet::Affected(names(&["com.x.B"]))
    );
    assert_eq!(
        snap.analysis().class_name_for_file("com/x/B.class"),
        Some("com.x.B")
    );
    assert!(snap.analysis().full_rebuild_cause.is_none());
}

#[test]
fn snapshotting_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lib.jar");
    write_class_jar(&path, &[a(), b(), c()]).unwrap();
    let copy = dir.path().join("copy.jar");
    std::fs::copy(&path, &copy).unwrap();

    let first = snapshot(&path);
    let second = snapshot(&path);
    let elsewhere = snapshot(&copy);

    assert_eq!(first, second);
    assert_eq!(first.data().to_record_bytes(), second.data().to_record_bytes());
    assert_eq!(first.hash(), elsewhere.hash());
    assert_eq!(first.data(), elsewhere.data());
}

#[test]
fn non_class_and_meta_inf_entries_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lib.jar");
    write_jar(
        &path,
        &[
            ("META-INF/MANIFEST.MF".to_string(), b"Manifest-Version: 1.0\n".to_vec()),
            (
                "META-INF/versions/11/com/x/A.class".to_string(),
                a().int_constant(11).build(),
            ),
            ("com/x/A.class".to_string(), a().build()),
            ("com/x/messages.properties".to_string(), b"k=v".to_vec()),
        ],
    )
    .unwrap();

    let snap = snapshot(&path);
    assert_eq!(snap.class_names().cloned().collect::<BTreeSet<_>>(), names(&["com.x.A"]));
    assert!(snap.analysis().constants_of("com.x.A").is_empty());
}

#[test]
fn unanalyzable_entry_demotes_the_jar_but_keeps_scanning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lib.jar");
    write_jar(
        &path,
        &[
            ("com/x/Bad.class".to_string(), b"junk".to_vec()),
            ("com/x/A.class".to_string(), a().build()),
        ],
    )
    .unwrap();

    let snap = snapshot(&path);
    assert!(snap.analysis().full_rebuild_cause.is_some());
    assert!(snap.contains_class("com.x.A"));
    assert!(snap.contains_class("com.x.Bad"));
    assert!(snap.all_classes().is_dependency_to_all());
}

#[test]
fn unreadable_archive_yields_demoted_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.jar");
    std::fs::write(&path, b"this is not a zip file").unwrap();

    let snap = snapshot(&path);
    assert!(snap.hashes().is_empty());
    assert!(snap.analysis().full_rebuild_cause.is_some());
}

// ─── Comparison ─────────────────────────────────────────────────────

#[test]
fn unchanged_jar_has_nothing_affected() {
    let dir = TempDir::new().unwrap();
    let snap = jar(&dir, "lib.jar", &[a(), b(), c()]);

    let affected = snap.affected_classes_since(&snap);
    assert_eq!(affected.altered, DependentsSet::empty());
    assert!(affected.added.is_empty());
    assert!(affected.removed_constants.is_empty());
}

#[test]
fn changed_class_affects_itself_and_its_dependents() {
    let dir = TempDir::new().unwrap();
    let before = jar(&dir, "v1.jar", &[a(), b(), c()]);
    let after = jar(&dir, "v2.jar", &[a().int_constant(1), b(), c()]);

    let affected = after.affected_classes_since(&before);
    assert_eq!(
        affected.altered,
        DependentsSet::Affected(names(&["com.x.A", "com.x.B"]))
    );
    assert!(affected.added.is_empty());
}

#[test]
fn changed_dependency_to_all_class_is_reported_as_such() {
    let dir = TempDir::new().unwrap();
    let marker = || ClassFileBuilder::new("com.x.Marker").annotation().source_retention();
    let user = ClassFileBuilder::new("com.x.User").depends_on("com.x.Marker");
    let before = jar(&dir, "v1.jar", &[marker(), user.clone(), c()]);
    let after = jar(&dir, "v2.jar", &[marker().int_constant(3), user, c()]);

    assert!(after
        .affected_classes_since(&before)
        .altered
        .is_dependency_to_all());
}

#[test]
fn removed_class_and_removed_constants_are_tracked() {
    let dir = TempDir::new().unwrap();
    let before = jar(&dir, "v1.jar", &[a().int_constant(5), b(), c()]);
    let after = jar(&dir, "v2.jar", &[a().int_constant(6), b()]);

    let affected = after.affected_classes_since(&before);
    assert_eq!(
        affected.altered,
        DependentsSet::Affected(names(&["com.x.A", "com.x.B", "com.x.C"]))
    );
    assert_eq!(affected.removed_constants, BTreeSet::from([5]));
}

#[test]
fn added_classes_are_reported_separately() {
    let dir = TempDir::new().unwrap();
    let before = jar(&dir, "v1.jar", &[a(), b()]);
    let after = jar(&dir, "v2.jar", &[a(), b(), ClassFileBuilder::new("com.x.D")]);

    let affected = after.affected_classes_since(&before);
    assert_eq!(affected.added, names(&["com.x.D"]));
    assert_eq!(affected.altered, DependentsSet::empty());
}

#[test]
fn added_dependency_to_all_class_is_reported_as_such() {
    let dir = TempDir::new().unwrap();
    let before = jar(&dir, "v1.jar", &[a()]);
    let after = jar(&dir, "v2.jar", &[a(), ClassFileBuilder::new("com.x.package-info")]);

    assert!(after
        .affected_classes_since(&before)
        .altered
        .is_dependency_to_all());
}
