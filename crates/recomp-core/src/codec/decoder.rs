//! Cursor-based decoder. Every read is bounds-checked; truncated or malformed
//! input surfaces as `StorageError::RecordCorrupt`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::errors::StorageError;
use crate::types::hash::ContentHash;

pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Decode from the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// True when every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], StorageError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                corrupt(format!(
                    "truncated record: need {n} bytes at offset {}, have {}",
                    self.pos,
                    self.bytes.len() - self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], StorageError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8, StorageError> {
        Ok(self.take(1)?[0])
    }

    /// Read a bool written as `0` or `1`.
    pub fn read_bool(&mut self) -> Result<bool, StorageError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(corrupt(format!("invalid bool byte {other}"))),
        }
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, StorageError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    /// Read a big-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, StorageError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    /// Read a collection size.
    pub fn read_len(&mut self) -> Result<usize, StorageError> {
        Ok(self.read_u32()? as usize)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, StorageError> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| corrupt(format!("invalid UTF-8: {e}")))
    }

    /// Length-prefixed raw bytes.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], StorageError> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// Counterpart of `Encoder::write_path`.
    #[cfg(unix)]
    pub fn read_path(&mut self) -> Result<PathBuf, StorageError> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        Ok(PathBuf::from(OsStr::from_bytes(self.read_bytes()?)))
    }

    /// Counterpart of `Encoder::write_path`.
    #[cfg(not(unix))]
    pub fn read_path(&mut self) -> Result<PathBuf, StorageError> {
        Ok(PathBuf::from(self.read_string()?))
    }

    /// Read a 16-byte content hash.
    pub fn read_hash(&mut self) -> Result<ContentHash, StorageError> {
        Ok(ContentHash::from_bytes(self.take_array()?))
    }

    /// Read a presence flag, then the string if present.
    pub fn read_option_string(&mut self) -> Result<Option<String>, StorageError> {
        if self.read_bool()? {
            Ok(Some(self.read_string()?))
        } else {
            Ok(None)
        }
    }

    /// Read a size-prefixed set of strings.
    pub fn read_string_set(&mut self) -> Result<BTreeSet<String>, StorageError> {
        let len = self.read_len()?;
        let mut set = BTreeSet::new();
        for _ in 0..len {
            set.insert(self.read_string()?);
        }
        Ok(set)
    }

    /// Read a size-prefixed set of `i32`s.
    pub fn read_i32_set(&mut self) -> Result<BTreeSet<i32>, StorageError> {
        let len = self.read_len()?;
        let mut set = BTreeSet::new();
        for _ in 0..len {
            set.insert(self.read_i32()?);
        }
        Ok(set)
    }

    /// Read a size-prefixed map, decoding each value with `read_value`.
    pub fn read_string_map<V>(
        &mut self,
        mut read_value: impl FnMut(&mut Self) -> Result<V, StorageError>,
    ) -> Result<BTreeMap<String, V>, StorageError> {
        let len = self.read_len()?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = self.read_string()?;
            let value = read_value(self)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// A `RecordCorrupt` error with `details`.
pub(crate) fn corrupt(details: String) -> StorageError {
    StorageError::RecordCorrupt { details }
}
