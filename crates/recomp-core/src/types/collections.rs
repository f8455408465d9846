//! Fast hash collections used for transient, per-invocation bookkeeping.
//!
//! Persisted records use ordered `BTreeMap`/`BTreeSet` instead so their
//! encoding is deterministic.

pub use rustc_hash::{FxHashMap, FxHashSet};
