//! # recomp-analysis
//!
//! Incremental compilation change tracking for JVM builds.
//! Snapshots classpath jars, memoizes them in a tiered content-addressed
//! cache, and turns changed inputs into a `RecompilationSpec`.

#![allow(clippy::module_inception)]

pub mod accumulator;
pub mod cache;
pub mod class_set;
pub mod classfile;
pub mod classpath;
pub mod compilation;
pub mod jar;
pub mod processor;
pub mod services;

pub use accumulator::ClassDependentsAccumulator;
pub use cache::JarSnapshotCache;
pub use class_set::ClassSetAnalysis;
pub use classfile::{ClassDependencyAnalyzer, ClassFileAnalyzer};
pub use classpath::{JarClasspathSnapshot, JarClasspathSnapshotFactory};
pub use compilation::{PreviousCompilation, PreviousCompilationStore};
pub use jar::{JarArchive, JarSnapshot, JarSnapshotter};
pub use processor::{ChangeKind, InputChange, RecompilationSpec, RecompilationSpecProvider};
pub use services::CompileCaches;
