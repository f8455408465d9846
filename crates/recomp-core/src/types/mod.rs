//! Core data model shared by the analysis and storage crates.

pub mod analysis;
pub mod collections;
pub mod hash;
pub mod snapshot;
