//! Hand-written binary record codec.
//!
//! Layout is a flat sequence of big-endian fields: fixed-width integers,
//! 16-byte hashes, `u32`-length-prefixed UTF-8 strings and raw path bytes,
//! and size-prefixed sets and string-keyed maps. Every record starts with a
//! format version byte.

pub mod decoder;
pub mod encoder;
pub mod records;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use records::BinaryRecord;

/// Version byte written at the start of every record.
pub const FORMAT_VERSION: u8 = 1;
