//! Bounds-checked big-endian reader over class-file bytes.

use recomp_core::errors::AnalysisError;

pub struct ClassReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    /// Start reading at offset 0.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Borrow the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], AnalysisError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                AnalysisError::class_format(format!(
                    "unexpected end of class file at offset {} (need {n} bytes)",
                    self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Skip the next `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), AnalysisError> {
        self.take(n).map(|_| ())
    }

    /// Read one unsigned byte.
    pub fn u1(&mut self) -> Result<u8, AnalysisError> {
        Ok(self.take(1)?[0])
    }

    /// Read a big-endian `u2`.
    pub fn u2(&mut self) -> Result<u16, AnalysisError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a big-endian `u4`.
    pub fn u4(&mut self) -> Result<u32, AnalysisError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read two big-endian `u4` words as one `u64`.
    pub fn u64(&mut self) -> Result<u64, AnalysisError> {
        Ok((u64::from(self.u4()?) << 32) | u64::from(self.u4()?))
    }
}
