//! # recomp-storage
//!
//! SQLite persistence layer for the recomp engine.
//! WAL mode, one connection per store serialized behind a mutex, and an
//! advisory file lock for cross-process transactions.

pub mod connection;
pub mod lock;
pub mod migrations;
pub mod store;
pub mod stores;

pub use lock::StoreLock;
pub use store::SqliteKeyValueStore;
pub use stores::CacheStores;
