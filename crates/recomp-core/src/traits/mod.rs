//! Seams between the analysis engine and its persistence backends.

pub mod storage;

pub use storage::IKeyValueStore;
