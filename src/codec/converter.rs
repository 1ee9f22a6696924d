//! Typed record converter
//!
//! [`ByteConverter<T>`] owns exactly one active codec and converts records
//! of type `T` to and from wire bytes. It starts in [`WireFormat::Binary`];
//! [`switch_to_textual`](ByteConverter::switch_to_textual) and
//! [`switch_to_binary`](ByteConverter::switch_to_binary) replace the codec
//! wholesale between conversions.
//!
//! A converter is a single-owner object: every operation takes `&mut self`.
//! Give each worker its own converter and share the schema through an `Arc`.
//!
//! # Examples
//! ```
//! use embeddenator_codec::{ByteConverter, ErrorKind};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
//! struct Reading { sensor: u16, value: i64 }
//!
//! let mut converter = ByteConverter::<Reading>::new();
//! let bytes = converter.encode(&Reading { sensor: 7, value: -3 }).unwrap();
//!
//! let mut reading = Reading::default();
//! converter.decode_into(&bytes, &mut reading).unwrap();
//! assert_eq!(reading, Reading { sensor: 7, value: -3 });
//!
//! let err = converter.decode(&[]).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidInput);
//! ```

use std::fmt;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::binary::BinaryCodec;
use super::buffer::WireBuffer;
use super::error::{CodecError, DecodeError, EncodeError, Result};
use super::format::WireFormat;
use super::options::{ConverterOptions, MergePolicy};
use super::schema::Schema;
use super::stream::SinkWriter;
use super::textual::TextualCodec;

/// Any type with a serde encode/decode capability can be converted.
pub trait Record: Serialize + DeserializeOwned {}

impl<T> Record for T where T: Serialize + DeserializeOwned {}

/// The active encoder/decoder pair of a converter
#[derive(Clone, Debug)]
pub(crate) enum WireCodec {
    Binary(BinaryCodec),
    Textual(TextualCodec),
}

impl WireCodec {
    fn format(&self) -> WireFormat {
        match self {
            Self::Binary(_) => WireFormat::Binary,
            Self::Textual(_) => WireFormat::Textual,
        }
    }

    fn encode<T: Serialize>(&self, datum: &T) -> std::result::Result<Vec<u8>, EncodeError> {
        match self {
            Self::Binary(codec) => codec.encode(datum),
            Self::Textual(codec) => codec.encode(datum),
        }
    }

    fn encode_into<T: Serialize, W: Write>(&self, datum: &T, sink: W) -> std::result::Result<(), EncodeError> {
        match self {
            Self::Binary(codec) => codec.encode_into(datum, sink),
            Self::Textual(codec) => codec.encode_into(datum, sink),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> std::result::Result<T, DecodeError> {
        match self {
            Self::Binary(codec) => codec.decode(bytes),
            Self::Textual(codec) => codec.decode(bytes),
        }
    }

    fn decode_from<T: DeserializeOwned, R: Read>(&self, reader: R) -> std::result::Result<T, DecodeError> {
        match self {
            Self::Binary(codec) => codec.decode_from(reader),
            Self::Textual(codec) => codec.decode_from(reader),
        }
    }
}

/// Converts records of type `T` to and from wire bytes
pub struct ByteConverter<T> {
    codec: WireCodec,
    options: ConverterOptions,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> ByteConverter<T> {
    /// Binary converter with default options.
    pub fn new() -> Self {
        Self::with_options(ConverterOptions::default())
    }

    /// Binary converter with the given options.
    pub fn with_options(options: ConverterOptions) -> Self {
        log_event!(debug, max_payload_bytes = options.max_payload_bytes, "created binary converter");
        Self {
            codec: WireCodec::Binary(BinaryCodec::new(options.max_payload_bytes)),
            options,
            _record: PhantomData,
        }
    }

    /// Converter that starts out in textual mode.
    pub fn textual(schema: Arc<Schema>) -> Result<Self> {
        Self::textual_with_options(schema, ConverterOptions::default())
    }

    /// Converter that starts out in textual mode with the given options.
    ///
    /// Fails with a configuration error if the schema cannot carry a record.
    pub fn textual_with_options(schema: Arc<Schema>, options: ConverterOptions) -> Result<Self> {
        let mut converter = Self::with_options(options);
        converter.switch_to_textual(schema)?;
        Ok(converter)
    }

    /// Format of the active codec.
    pub fn wire_format(&self) -> WireFormat {
        self.codec.format()
    }

    /// Schema bound to the textual codec, if that is the active one.
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        match &self.codec {
            WireCodec::Textual(codec) => Some(codec.schema()),
            WireCodec::Binary(_) => None,
        }
    }

    /// Options fixed at construction; switching codecs keeps them.
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    fn check_input(&self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if bytes.len() as u64 > self.options.max_payload_bytes {
            return Err(CodecError::PayloadTooLarge {
                len: bytes.len(),
                max: self.options.max_payload_bytes,
            });
        }
        Ok(())
    }

    /// Decode one record spanning all of `bytes`.
    ///
    /// Empty input is rejected before decoding. Malformed, truncated, or
    /// schema-incompatible payloads, and payloads with trailing bytes, fail
    /// with a decode error.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<T> {
        self.check_input(bytes)?;
        let datum = self.codec.decode(bytes)?;
        log_event!(trace, format = %self.codec.format(), len = bytes.len(), "decoded record");
        Ok(datum)
    }

    /// Decode into an existing record.
    ///
    /// `datum` is only replaced once decoding succeeded. Under
    /// [`MergePolicy::Merge`] a textual payload that leaves out top-level
    /// fields keeps their current values; binary payloads always carry every
    /// field.
    pub fn decode_into(&mut self, bytes: &[u8], datum: &mut T) -> Result<()> {
        self.check_input(bytes)?;
        let decoded = match (&self.codec, self.options.merge) {
            (WireCodec::Textual(codec), MergePolicy::Merge) => codec.decode_merged(bytes, datum)?,
            (codec, _) => codec.decode(bytes)?,
        };
        *datum = decoded;
        log_event!(trace, format = %self.codec.format(), len = bytes.len(), "decoded record in place");
        Ok(())
    }

    /// Decode one record from a reader, leaving it positioned after the
    /// record so several records can be read back to back.
    ///
    /// Reads what [`encode_to_stream`](Self::encode_to_stream) writes.
    pub fn decode_from<R: Read>(&mut self, reader: R) -> Result<T> {
        Ok(self.codec.decode_from(reader)?)
    }

    /// Encode into an exactly-sized buffer owned by the caller.
    pub fn encode(&mut self, datum: &T) -> Result<WireBuffer> {
        let bytes = self.codec.encode(datum)?;
        log_event!(trace, format = %self.codec.format(), len = bytes.len(), "encoded record");
        Ok(WireBuffer::from_encoded(bytes))
    }

    /// Encode straight into `sink`, flushing it before returning.
    ///
    /// Returns the number of bytes written. Binary output matches
    /// [`encode`](Self::encode) byte for byte; textual output adds a newline
    /// after the document. On failure the sink may hold a partial payload.
    pub fn encode_to_stream<W: Write>(&mut self, datum: &T, sink: W) -> Result<u64> {
        let mut writer = SinkWriter::with_buffer_size(sink, self.options.sink_buffer_size);
        self.codec.encode_into(datum, &mut writer)?;
        let (_, written) = writer.finish().map_err(EncodeError::Io)?;
        log_event!(trace, format = %self.codec.format(), len = written, "encoded record to stream");
        Ok(written)
    }

    /// Replace the codec with a JSON codec bound to `schema`.
    ///
    /// On error the converter keeps its current codec.
    pub fn switch_to_textual(&mut self, schema: Arc<Schema>) -> Result<()> {
        let codec = TextualCodec::new(schema, &self.options)?;
        log_event!(
            debug,
            from = %self.codec.format(),
            fingerprint = %codec.schema().fingerprint_hex(),
            "switched converter to textual"
        );
        self.codec = WireCodec::Textual(codec);
        Ok(())
    }

    /// Replace the codec with a binary codec.
    pub fn switch_to_binary(&mut self) {
        log_event!(debug, from = %self.codec.format(), "switched converter to binary");
        self.codec = WireCodec::Binary(BinaryCodec::new(self.options.max_payload_bytes));
    }
}

impl<T: Record> Default for ByteConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ByteConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteConverter")
            .field("record", &std::any::type_name::<T>())
            .field("format", &self.codec.format())
            .field("options", &self.options)
            .finish()
    }
}
