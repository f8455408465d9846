//! The baseline of the last successful compile of a task, and how it is
//! produced and persisted.

pub mod local;
pub mod previous;
pub mod store;

pub use local::LocalClassSetAnalyzer;
pub use previous::PreviousCompilation;
pub use store::PreviousCompilationStore;
