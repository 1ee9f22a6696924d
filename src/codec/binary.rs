//! Compact binary wire format
//!
//! Built on bincode with varint integers (zig-zag for signed values),
//! little endian byte order, and strict trailing-byte rejection. The layout is
//! positional: field order comes from the record type's serde impl, so no
//! schema is needed to encode or decode.

use std::io::{Read, Write};

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{DecodeError, EncodeError};

/// Binary encoder/decoder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinaryCodec {
    max_payload_bytes: u64,
}

impl BinaryCodec {
    pub fn new(max_payload_bytes: u64) -> Self {
        Self { max_payload_bytes }
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_varint_encoding()
            .with_little_endian()
            .reject_trailing_bytes()
            .with_limit(self.max_payload_bytes)
    }

    /// Encode into a freshly allocated, exactly-sized vector.
    pub fn encode<T: Serialize + ?Sized>(&self, datum: &T) -> Result<Vec<u8>, EncodeError> {
        let size = self.options().serialized_size(datum).map_err(EncodeError::Binary)?;
        let mut out = Vec::with_capacity(size as usize);
        self.options()
            .serialize_into(&mut out, datum)
            .map_err(EncodeError::Binary)?;
        Ok(out)
    }

    /// Encode into a caller-supplied sink. The size limit is checked before
    /// anything is written.
    pub fn encode_into<T: Serialize + ?Sized, W: Write>(&self, datum: &T, sink: W) -> Result<(), EncodeError> {
        self.options()
            .serialize_into(sink, datum)
            .map_err(EncodeError::Binary)
    }

    /// Decode exactly one record spanning the whole slice.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        self.options().deserialize(bytes).map_err(DecodeError::Binary)
    }

    /// Decode one record from a reader, leaving it positioned after the record.
    pub fn decode_from<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<T, DecodeError> {
        self.options()
            .deserialize_from(reader)
            .map_err(DecodeError::Binary)
    }
}
