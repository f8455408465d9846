//! `BinaryRecord` implementations for every persisted record type.

use super::decoder::corrupt;
use super::{Decoder, Encoder, FORMAT_VERSION};
use crate::errors::StorageError;
use crate::types::analysis::ClassSetAnalysisData;
use crate::types::snapshot::{JarClasspathSnapshotData, JarSnapshotData};

/// A type with an explicit binary encoding.
pub trait BinaryRecord: Sized {
    /// Append the record body, without the version byte.
    fn encode(&self, enc: &mut Encoder);

    /// Read a record body written by `encode`.
    fn decode(dec: &mut Decoder<'_>) -> Result<Self, StorageError>;

    /// Encode as a standalone, versioned record.
    fn to_record_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_u8(FORMAT_VERSION);
        self.encode(&mut enc);
        enc.into_bytes()
    }

    /// Decode a standalone record, rejecting unknown versions and trailing bytes.
    fn from_record_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut dec = Decoder::new(bytes);
        let version = dec.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported record format version {version} (expected {FORMAT_VERSION})"
            )));
        }
        let value = Self::decode(&mut dec)?;
        if !dec.is_exhausted() {
            return Err(corrupt("trailing bytes after record".to_string()));
        }
        Ok(value)
    }
}

impl BinaryRecord for ClassSetAnalysisData {
    fn encode(&self, enc: &mut Encoder) {
        enc.write_string_map(&self.file_path_to_class_name, |e, v| e.write_str(v));
        enc.write_string_map(&self.dependents, |e, v| e.write_string_set(v));
        enc.write_string_map(&self.class_to_constants, |e, v| e.write_i32_set(v));
        enc.write_string_set(&self.dependency_to_all);
        enc.write_option_str(self.full_rebuild_cause.as_deref());
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, StorageError> {
        Ok(Self {
            file_path_to_class_name: dec.read_string_map(|d| d.read_string())?,
            dependents: dec.read_string_map(|d| d.read_string_set())?,
            class_to_constants: dec.read_string_map(|d| d.read_i32_set())?,
            dependency_to_all: dec.read_string_set()?,
            full_rebuild_cause: dec.read_option_string()?,
        })
    }
}

impl BinaryRecord for JarSnapshotData {
    fn encode(&self, enc: &mut Encoder) {
        enc.write_hash(self.hash);
        enc.write_string_map(&self.hashes, |e, h| e.write_hash(*h));
        self.analysis.encode(enc);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, StorageError> {
        let hash = dec.read_hash()?;
        let hashes = dec.read_string_map(|d| d.read_hash())?;
        let analysis = ClassSetAnalysisData::decode(dec)?;
        Ok(Self::new(hash, hashes, analysis))
    }
}

impl BinaryRecord for JarClasspathSnapshotData {
    fn encode(&self, enc: &mut Encoder) {
        enc.write_len(self.jar_hashes.len());
        for (path, hash) in &self.jar_hashes {
            enc.write_path(path);
            enc.write_hash(*hash);
        }
        enc.write_string_set(&self.duplicate_classes);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, StorageError> {
        let len = dec.read_len()?;
        let mut jar_hashes = Vec::new();
        for _ in 0..len {
            let path = dec.read_path()?;
            let hash = dec.read_hash()?;
            jar_hashes.push((path, hash));
        }
        let duplicate_classes = dec.read_string_set()?;
        Ok(Self::new(jar_hashes, duplicate_classes))
    }
}
