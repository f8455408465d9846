//! End-to-end change processing: a project with one library jar and a
//! compiled output directory, compiled once, then changed.
//!
//! Library: `Api` (embeds 10) <- `Helper`, and `Other`.
//! Local:   `Main` -> `Api`, `Caller` -> `Main`, `Util` -> `Other`,
//!          `Limits` inlines 10 with `bipush`, `Consts` declares 42 and
//!          `UsesConst` inlines it with `bipush`.

mod common;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use common::{write_class_file, write_class_jar, ClassFileBuilder};
use recomp_analysis::cache::InMemoryJarSnapshotCache;
use recomp_analysis::compilation::PreviousCompilationStore;
use recomp_analysis::{CompileCaches, InputChange, RecompilationSpec};
use recomp_core::errors::AnalysisError;
use recomp_core::traits::storage::IKeyValueStore;
use recomp_core::{ClassSetAnalysisData, JarClasspathSnapshotData, RecompConfig};
use recomp_storage::{CacheStores, SqliteKeyValueStore};
use tempfile::TempDir;

const TASK: &str = ":app:compileJava";

fn lib_classes(api_constant: i32) -> Vec<ClassFileBuilder> {
    vec![
        ClassFileBuilder::new("com.lib.Api").int_constant(api_constant),
        ClassFileBuilder::new("com.lib.Helper").depends_on("com.lib.Api"),
        ClassFileBuilder::new("com.lib.Other"),
    ]
}

fn local_classes() -> Vec<ClassFileBuilder> {
    vec![
        ClassFileBuilder::new("com.app.Main").depends_on("com.lib.Api"),
        ClassFileBuilder::new("com.app.Caller").depends_on("com.app.Main"),
        ClassFileBuilder::new("com.app.Util").depends_on("com.lib.Other"),
        ClassFileBuilder::new("com.app.Limits").returns_int("limit", 10),
        ClassFileBuilder::new("com.app.Consts").int_constant(42),
        ClassFileBuilder::new("com.app.UsesConst").returns_int("answer", 42),
    ]
}

fn names(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

struct Project {
    dir: TempDir,
    lib: PathBuf,
    classes: PathBuf,
    config: RecompConfig,
}

impl Project {
    fn new() -> Self {
        Self::with_lib(&lib_classes(10))
    }

    fn with_lib(lib_classes: &[ClassFileBuilder]) -> Self {
        let dir = TempDir::new().unwrap();
        let artifacts = dir.path().join("artifacts");
        std::fs::create_dir_all(&artifacts).unwrap();
        let lib = artifacts.join("lib-1.0.jar");
        write_class_jar(&lib, lib_classes).unwrap();

        let classes = dir.path().join("classes");
        for class in local_classes() {
            write_class_file(&classes, &class).unwrap();
        }

        let mut config = RecompConfig::default();
        config.cache.immutable_roots = vec![artifacts.to_string_lossy().into_owned()];
        config.cache.global_dir = Some(dir.path().join("global").to_string_lossy().into_owned());
        Self {
            dir,
            lib,
            classes,
            config,
        }
    }

    fn caches(&self, stores: &CacheStores) -> CompileCaches {
        CompileCaches::new(&self.config, stores.global.clone(), stores.tasks.clone())
    }

    fn spec(&self, caches: &CompileCaches, classpath: &[PathBuf], changes: &[InputChange]) -> RecompilationSpec {
        caches
            .recompilation_spec(TASK, classpath, &self.classes, changes)
            .unwrap()
            .0
    }

    /// Run a build over the current inputs and record it as the baseline.
    fn compile(&self, caches: &CompileCaches, classpath: &[PathBuf]) {
        let (_, snapshot) = caches
            .recompilation_spec(TASK, classpath, &self.classes, &[])
            .unwrap();
        caches
            .record_compilation(TASK, &self.classes, &snapshot)
            .unwrap();
    }

    fn class_file(&self, name: &str) -> PathBuf {
        self.classes.join(format!("{}.class", name.replace('.', "/")))
    }

    fn jar(&self, name: &str, classes: &[ClassFileBuilder]) -> PathBuf {
        let path = self.dir.path().join(name);
        write_class_jar(&path, classes).unwrap();
        path
    }
}

fn compiled() -> (Project, CacheStores, CompileCaches) {
    let project = Project::new();
    let stores = CacheStores::open_in_memory().unwrap();
    let caches = project.caches(&stores);
    project.compile(&caches, &[project.lib.clone()]);
    (project, stores, caches)
}

// ─── Baseline ───────────────────────────────────────────────────────

#[test]
fn first_build_is_a_full_rebuild() {
    let project = Project::new();
    let stores = CacheStores::open_in_memory().unwrap();
    let caches = project.caches(&stores);

    let spec = project.spec(&caches, &[project.lib.clone()], &[]);
    assert_eq!(spec.full_rebuild_cause(), Some("no previous compilation"));
}

#[test]
fn unchanged_inputs_recompile_nothing() {
    let (project, _stores, caches) = compiled();
    let spec = project.spec(&caches, &[project.lib.clone()], &[]);
    assert!(!spec.is_full_rebuild());
    assert!(spec.classes_to_compile().is_empty());
}

// ─── Jar changes ────────────────────────────────────────────────────

#[test]
fn modified_jar_recompiles_local_dependents_of_changed_classes() {
    let (project, _stores, caches) = compiled();
    write_class_jar(&project.lib, &lib_classes(11)).unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[]);
    assert!(!spec.is_full_rebuild());
    assert_eq!(
        spec.classes_to_compile(),
        &names(&["com.app.Caller", "com.app.Limits", "com.app.Main"])
    );
}

#[test]
fn jar_constant_inlined_by_bytecode_recompiles_the_inlining_class() {
    let (project, _stores, caches) = compiled();
    let previous = caches.load_previous(TASK).unwrap().unwrap();
    assert!(previous.constants_of("com.app.Limits").contains(&10));
    let by_reference = previous.dependents_of_class("com.lib.Api", &BTreeSet::new());
    assert!(!by_reference
        .dependent_classes()
        .unwrap()
        .contains("com.app.Limits"));

    write_class_jar(&project.lib, &lib_classes(11)).unwrap();
    let spec = project.spec(&caches, &[project.lib.clone()], &[]);
    assert!(spec.classes_to_compile().contains("com.app.Limits"));
    assert!(!spec.classes_to_compile().contains("com.app.Util"));
}

#[test]
fn changed_dependency_to_all_jar_class_forces_full_rebuild() {
    let package_info = || ClassFileBuilder::new("com.lib.package-info");
    let mut v1 = lib_classes(10);
    v1.push(package_info());
    let project = Project::with_lib(&v1);
    let stores = CacheStores::open_in_memory().unwrap();
    let caches = project.caches(&stores);
    project.compile(&caches, &[project.lib.clone()]);

    let mut v2 = lib_classes(10);
    v2.push(package_info().int_constant(1));
    write_class_jar(&project.lib, &v2).unwrap();

    let spec = project.spec(
        &caches,
        &[project.lib.clone()],
        &[InputChange::modified(project.class_file("com.app.Util"))],
    );
    assert!(spec.is_full_rebuild());
    assert!(spec.full_rebuild_cause().unwrap().contains("package-info"));
    assert_eq!(spec.full_rebuild().unwrap().file.as_deref(), Some(project.lib.as_path()));
    assert!(spec.classes_to_compile().is_empty());
}

#[test]
fn added_jar_duplicating_a_class_forces_full_rebuild() {
    let (project, _stores, caches) = compiled();
    let dup = project.jar("dup.jar", &[ClassFileBuilder::new("com.lib.Api")]);

    let spec = project.spec(&caches, &[project.lib.clone(), dup], &[]);
    assert!(spec
        .full_rebuild_cause()
        .unwrap()
        .contains("is already present in the classpath"));
}

#[test]
fn added_jar_with_new_classes_recompiles_nothing() {
    let (project, _stores, caches) = compiled();
    let extra = project.jar("extra.jar", &[ClassFileBuilder::new("com.extra.New")]);

    let spec = project.spec(&caches, &[project.lib.clone(), extra], &[]);
    assert!(!spec.is_full_rebuild());
    assert!(spec.classes_to_compile().is_empty());
}

#[test]
fn removed_jar_recompiles_everything_that_used_it() {
    let (project, _stores, caches) = compiled();

    let spec = project.spec(&caches, &[], &[]);
    assert!(!spec.is_full_rebuild());
    assert_eq!(
        spec.classes_to_compile(),
        &names(&["com.app.Caller", "com.app.Limits", "com.app.Main", "com.app.Util"])
    );
}

// ─── Class changes ──────────────────────────────────────────────────

#[test]
fn removed_constant_recompiles_classes_that_inlined_it() {
    let (project, _stores, caches) = compiled();
    let consts = ClassFileBuilder::new("com.app.Consts").int_constant(43);
    let path = write_class_file(&project.classes, &consts).unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[InputChange::modified(path)]);
    assert_eq!(
        spec.classes_to_compile(),
        &names(&["com.app.Consts", "com.app.UsesConst"])
    );
}

#[test]
fn kept_constants_do_not_widen_the_set() {
    let (project, _stores, caches) = compiled();
    let consts = ClassFileBuilder::new("com.app.Consts")
        .int_constant(42)
        .int_constant(7);
    let path = write_class_file(&project.classes, &consts).unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[InputChange::modified(path)]);
    assert_eq!(spec.classes_to_compile(), &names(&["com.app.Consts"]));
}

#[test]
fn removed_class_recompiles_dependents_only() {
    let (project, _stores, caches) = compiled();
    let path = project.class_file("com.app.Main");
    std::fs::remove_file(&path).unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[InputChange::removed(path)]);
    assert_eq!(spec.classes_to_compile(), &names(&["com.app.Caller"]));
}

#[test]
fn added_class_is_compiled() {
    let (project, _stores, caches) = compiled();
    let class = ClassFileBuilder::new("com.app.Fresh").depends_on("com.app.Main");
    let path = write_class_file(&project.classes, &class).unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[InputChange::added(path)]);
    assert_eq!(spec.classes_to_compile(), &names(&["com.app.Fresh"]));
}

#[test]
fn added_dependency_to_all_class_forces_full_rebuild() {
    let (project, _stores, caches) = compiled();
    let class = ClassFileBuilder::new("com.app.Marker").annotation().source_retention();
    let path = write_class_file(&project.classes, &class).unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[InputChange::added(path)]);
    assert!(spec.is_full_rebuild());
}

#[test]
fn unreadable_class_forces_full_rebuild() {
    let (project, _stores, caches) = compiled();
    let path = project.class_file("com.app.Util");
    std::fs::write(&path, b"corrupt").unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[InputChange::modified(path)]);
    assert!(spec.full_rebuild_cause().unwrap().contains("could not be analyzed"));
}

// ─── Baseline integrity ─────────────────────────────────────────────

#[test]
fn missing_previous_jar_snapshot_degrades_to_full_rebuild() {
    let (project, stores, _caches) = compiled();
    // Global snapshot store wiped, task records still present.
    let wiped = Arc::new(SqliteKeyValueStore::open_in_memory().unwrap());
    let caches = CompileCaches::new(&project.config, wiped, stores.tasks.clone());
    write_class_jar(&project.lib, &lib_classes(11)).unwrap();

    let spec = project.spec(&caches, &[project.lib.clone()], &[]);
    assert!(spec.full_rebuild_cause().unwrap().contains("unusable"));

    let previous = caches.load_previous(TASK).unwrap().unwrap();
    let classpath = caches
        .classpath_snapshot_factory()
        .create_snapshot(&[project.lib.clone()])
        .unwrap();
    let err = caches
        .spec_provider(&project.classes)
        .provide(
            Some(&previous),
            &classpath,
            &[InputChange::modified(project.lib.clone())],
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MissingJarSnapshot { .. }));
}

#[test]
fn baseline_survives_a_new_process() {
    let project = Project::new();
    let state = project.dir.path().join("state");
    {
        let stores = CacheStores::open(&project.config.cache, &state).unwrap();
        project.compile(&project.caches(&stores), &[project.lib.clone()]);
    }

    write_class_jar(&project.lib, &lib_classes(11)).unwrap();
    let stores = CacheStores::open(&project.config.cache, &state).unwrap();
    let spec = project.spec(&project.caches(&stores), &[project.lib.clone()], &[]);
    assert!(!spec.is_full_rebuild());
    assert_eq!(
        spec.classes_to_compile(),
        &names(&["com.app.Caller", "com.app.Limits", "com.app.Main"])
    );
}

#[test]
fn forgotten_task_starts_over() {
    let (project, _stores, caches) = compiled();
    caches.forget(TASK).unwrap();
    assert!(caches.load_previous(TASK).unwrap().is_none());
    let spec = project.spec(&caches, &[project.lib.clone()], &[]);
    assert!(spec.is_full_rebuild());
}

// ─── Local snapshot retention ───────────────────────────────────────

fn local_snapshot_count(stores: &CacheStores) -> usize {
    stores.tasks.keys_with_prefix("jar-snapshot/").unwrap().len()
}

#[test]
fn rebuilt_project_jar_keeps_one_local_snapshot() {
    let project = Project::new();
    let stores = CacheStores::open_in_memory().unwrap();
    let caches = project.caches(&stores);
    for version in 0..5 {
        let out = project.jar(
            "project-out.jar",
            &[ClassFileBuilder::new("com.out.Generated").int_constant(1000 + version)],
        );
        project.compile(&caches, &[project.lib.clone(), out]);
    }
    // the current project jar's snapshot plus the task's two records
    assert_eq!(local_snapshot_count(&stores), 1);
    assert_eq!(stores.tasks.len().unwrap(), 3);
    assert_eq!(stores.global.keys_with_prefix("jar-snapshot/").unwrap().len(), 1);
}

#[test]
fn pruning_keeps_snapshots_other_tasks_reference() {
    const TEST_TASK: &str = ":app:compileTestJava";
    let project = Project::new();
    let stores = CacheStores::open_in_memory().unwrap();
    let caches = project.caches(&stores);

    let shared = project.jar("shared-out.jar", &[ClassFileBuilder::new("com.out.Shared")]);
    let test_classes = project.dir.path().join("test-classes");
    std::fs::create_dir_all(&test_classes).unwrap();
    let (_, snapshot) = caches
        .recompilation_spec(TEST_TASK, &[shared.clone()], &test_classes, &[])
        .unwrap();
    caches
        .record_compilation(TEST_TASK, &test_classes, &snapshot)
        .unwrap();

    let other = project.jar("other-out.jar", &[ClassFileBuilder::new("com.out.Other")]);
    project.compile(&caches, &[project.lib.clone(), other]);
    assert_eq!(local_snapshot_count(&stores), 2);

    // a new process finds the test task's snapshot in the store itself
    let fresh = project.caches(&stores);
    let previous = fresh.load_previous(TEST_TASK).unwrap().unwrap();
    assert!(previous.jar_snapshot(&shared).unwrap().is_some());

    caches.forget(TEST_TASK).unwrap();
    assert_eq!(local_snapshot_count(&stores), 1);
    caches.forget(TASK).unwrap();
    assert_eq!(local_snapshot_count(&stores), 0);
}

#[test]
fn previous_compilation_store_round_trips_both_records() {
    let store = PreviousCompilationStore::new(Arc::new(SqliteKeyValueStore::open_in_memory().unwrap()));
    let cache = Arc::new(InMemoryJarSnapshotCache::new(10, std::time::Duration::from_secs(60)));
    assert!(store.load(TASK, cache.clone()).unwrap().is_none());

    let mut analysis = ClassSetAnalysisData::default();
    analysis
        .file_path_to_class_name
        .insert("com/app/A.class".to_string(), "com.app.A".to_string());
    let classpath = JarClasspathSnapshotData::new(Vec::new(), names(&["com.dup.X"]));
    store.save(TASK, &analysis, &classpath).unwrap();

    let loaded = store.load(TASK, cache.clone()).unwrap().unwrap();
    assert_eq!(loaded.analysis().data(), &analysis);
    assert_eq!(loaded.classpath(), &classpath);
    assert!(store.load("other-task", cache.clone()).unwrap().is_none());

    store.remove(TASK).unwrap();
    assert!(store.load(TASK, cache).unwrap().is_none());
}
