//! Persistent jar snapshot tier over an `IKeyValueStore`.
//!
//! Records are keyed by jar content hash and never rewritten, so readers and
//! writers in different build processes only ever race on absent keys, which
//! the store's exclusive get-or-insert transaction resolves.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use recomp_core::codec::BinaryRecord;
use recomp_core::errors::{AnalysisError, StorageError};
use recomp_core::traits::storage::IKeyValueStore;
use recomp_core::{ContentHash, JarSnapshotData};

use super::{JarSnapshotCache, SnapshotFactory};
use crate::jar::JarSnapshot;

const KEY_PREFIX: &str = "jar-snapshot/";

/// Store key of the snapshot of the jar with content `hash`.
pub fn snapshot_key(hash: ContentHash) -> String {
    format!("{KEY_PREFIX}{}", hash.to_hex())
}

/// Snapshot tier kept in a key-value store, shared across processes.
pub struct PersistentJarSnapshotCache {
    store: Arc<dyn IKeyValueStore>,
}

impl PersistentJarSnapshotCache {
    /// Keep snapshot records in `store`.
    pub fn new(store: Arc<dyn IKeyValueStore>) -> Self {
        Self { store }
    }

    /// Delete every stored snapshot whose hash is not in `keep`. Returns the
    /// number removed.
    pub fn retain(&self, keep: &BTreeSet<ContentHash>) -> Result<usize, StorageError> {
        let keep: BTreeSet<String> = keep.iter().map(|hash| snapshot_key(*hash)).collect();
        let mut removed = 0;
        for key in self.store.keys_with_prefix(KEY_PREFIX)? {
            if !keep.contains(&key) {
                self.store.remove(&key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn decode(hash: ContentHash, bytes: &[u8]) -> Result<JarSnapshot, AnalysisError> {
        let data = JarSnapshotData::from_record_bytes(bytes)?;
        if data.hash != hash {
            return Err(StorageError::RecordCorrupt {
                details: format!("record stored under {hash} describes {}", data.hash),
            }
            .into());
        }
        Ok(JarSnapshot::new(data))
    }
}

impl JarSnapshotCache for PersistentJarSnapshotCache {
    fn get(
        &self,
        jar: &Path,
        hash: ContentHash,
        factory: &mut SnapshotFactory<'_>,
    ) -> Result<JarSnapshot, AnalysisError> {
        let mut produced: Option<JarSnapshot> = None;
        let mut failure: Option<AnalysisError> = None;

        let stored = self.store.get_or_insert_with(&snapshot_key(hash), &mut || {
            match factory() {
                Ok(snapshot) => {
                    let bytes = snapshot.data().to_record_bytes();
                    produced = Some(snapshot);
                    Ok(bytes)
                }
                Err(e) => {
                    failure = Some(e);
                    Err(StorageError::Aborted)
                }
            }
        });

        match stored {
            Ok(bytes) => match produced {
                Some(snapshot) => {
                    tracing::trace!(jar = %jar.display(), %hash, "snapshot stored");
                    Ok(snapshot)
                }
                None => {
                    tracing::trace!(jar = %jar.display(), %hash, "persistent snapshot hit");
                    Self::decode(hash, &bytes)
                }
            },
            Err(e) => Err(failure.unwrap_or(AnalysisError::Storage(e))),
        }
    }

    fn get_jar_snapshots(
        &self,
        jar_hashes: &BTreeMap<PathBuf, ContentHash>,
    ) -> Result<BTreeMap<PathBuf, JarSnapshot>, AnalysisError> {
        let mut snapshots = BTreeMap::new();
        for (jar, hash) in jar_hashes {
            let bytes = self.store.get(&snapshot_key(*hash))?.ok_or_else(|| {
                AnalysisError::MissingJarSnapshot {
                    path: jar.clone(),
                    hash: *hash,
                }
            })?;
            snapshots.insert(jar.clone(), Self::decode(*hash, &bytes)?);
        }
        Ok(snapshots)
    }
}
