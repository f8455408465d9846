//! Append-only byte encoder.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::types::hash::ContentHash;

#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// An empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a bool as `0` or `1`.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Append a big-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Append a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Collection sizes are written as `u32`; larger collections cannot occur
    /// for classes in a single jar or compile output.
    pub fn write_len(&mut self, len: usize) {
        self.write_u32(u32::try_from(len).unwrap_or(u32::MAX));
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) {
        self.write_len(value.len());
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Raw bytes with a length prefix.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_len(value.len());
        self.buf.extend_from_slice(value);
    }

    /// Paths are written as their raw OS bytes, so names that are not
    /// valid UTF-8 survive.
    #[cfg(unix)]
    pub fn write_path(&mut self, path: &Path) {
        use std::os::unix::ffi::OsStrExt;
        self.write_bytes(path.as_os_str().as_bytes());
    }

    /// Paths are written as UTF-8.
    #[cfg(not(unix))]
    pub fn write_path(&mut self, path: &Path) {
        self.write_str(&path.to_string_lossy());
    }

    /// Append a 16-byte content hash.
    pub fn write_hash(&mut self, hash: ContentHash) {
        self.buf.extend_from_slice(&hash.to_bytes());
    }

    /// Append a presence flag, then the string if present.
    pub fn write_option_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.write_bool(true);
                self.write_str(s);
            }
            None => self.write_bool(false),
        }
    }

    /// Append a size-prefixed set of strings, in order.
    pub fn write_string_set(&mut self, set: &BTreeSet<String>) {
        self.write_len(set.len());
        for s in set {
            self.write_str(s);
        }
    }

    /// Append a size-prefixed set of `i32`s, in order.
    pub fn write_i32_set(&mut self, set: &BTreeSet<i32>) {
        self.write_len(set.len());
        for v in set {
            self.write_i32(*v);
        }
    }

    /// Size-prefixed map with string keys; values written by `write_value`.
    pub fn write_string_map<V>(
        &mut self,
        map: &BTreeMap<String, V>,
        mut write_value: impl FnMut(&mut Self, &V),
    ) {
        self.write_len(map.len());
        for (key, value) in map {
            self.write_str(key);
            write_value(self, value);
        }
    }
}
