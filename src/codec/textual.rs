//! Schema-checked JSON wire format
//!
//! Every payload passes through a JSON document that is conformed against
//! the schema before it is written (encode) or turned into a record
//! (decode). Absent fields are filled from schema defaults, or `null` where
//! the field type allows it.
//!
//! A buffer holds exactly one document with nothing after it. On a stream
//! each document is followed by a newline, so records of any root type,
//! including bare numbers, can be read back one at a time.

use std::io::{self, Read, Write};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::buffer::SMALL_BUFFER_SIZE;
use super::error::{ConfigurationError, DecodeError, EncodeError};
use super::finite::contains_non_finite;
use super::options::ConverterOptions;
use super::schema::{Schema, SchemaType};
use super::stream::SinkWriter;

/// JSON encoder/decoder bound to a schema
#[derive(Clone, Debug)]
pub struct TextualCodec {
    schema: Arc<Schema>,
    pretty: bool,
    max_payload_bytes: u64,
}

impl TextualCodec {
    /// Fails when the schema root is `null`, which leaves nothing to carry.
    pub fn new(schema: Arc<Schema>, options: &ConverterOptions) -> Result<Self, ConfigurationError> {
        if matches!(schema.root(), SchemaType::Null) {
            return Err(ConfigurationError::UnusableRoot(schema.root().type_name()));
        }
        Ok(Self {
            schema,
            pretty: options.pretty_text,
            max_payload_bytes: options.max_payload_bytes,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn to_document<T: Serialize + ?Sized>(&self, datum: &T) -> Result<Value, EncodeError> {
        // serde_json would turn these into `null`
        if contains_non_finite(datum) {
            return Err(EncodeError::NonFiniteFloat);
        }
        let mut document = serde_json::to_value(datum).map_err(EncodeError::Text)?;
        self.schema
            .conform_value(&mut document)
            .map_err(EncodeError::Schema)?;
        Ok(document)
    }

    fn render<W: Write>(&self, document: &Value, sink: W) -> Result<(), EncodeError> {
        if self.pretty {
            serde_json::to_writer_pretty(sink, document).map_err(EncodeError::Text)
        } else {
            serde_json::to_writer(sink, document).map_err(EncodeError::Text)
        }
    }

    fn check_size(&self, len: u64) -> Result<(), EncodeError> {
        if len > self.max_payload_bytes {
            return Err(EncodeError::SizeLimit {
                len,
                max: self.max_payload_bytes,
            });
        }
        Ok(())
    }

    /// Encode one record as a single JSON document.
    ///
    /// Fails if the record does not conform to the schema, holds a NaN or
    /// infinite float, or renders larger than the payload limit.
    pub fn encode<T: Serialize + ?Sized>(&self, datum: &T) -> Result<Vec<u8>, EncodeError> {
        let document = self.to_document(datum)?;
        let mut out = Vec::new();
        self.render(&document, &mut out)?;
        self.check_size(out.len() as u64)?;
        Ok(out)
    }

    /// Encode into a caller-supplied sink, followed by a newline. The
    /// rendered size is measured first so an oversized payload never reaches
    /// the sink.
    pub fn encode_into<T: Serialize + ?Sized, W: Write>(&self, datum: &T, mut sink: W) -> Result<(), EncodeError> {
        let document = self.to_document(datum)?;

        let mut counter = SinkWriter::with_buffer_size(io::sink(), SMALL_BUFFER_SIZE);
        self.render(&document, &mut counter)?;
        self.check_size(counter.bytes_written())?;

        self.render(&document, &mut sink)?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    fn from_document<T: DeserializeOwned>(&self, mut document: Value) -> Result<T, DecodeError> {
        self.schema
            .conform_value(&mut document)
            .map_err(DecodeError::Schema)?;
        serde_json::from_value(document).map_err(DecodeError::Text)
    }

    /// Decode a payload holding exactly one JSON document.
    ///
    /// Anything after the document, whitespace included, is rejected.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let document = parse_exact(bytes)?;
        self.from_document(document)
    }

    /// Decode a payload on top of `existing`: top-level fields the payload
    /// leaves out keep their current value instead of the schema default.
    pub fn decode_merged<T: Serialize + DeserializeOwned>(
        &self,
        bytes: &[u8],
        existing: &T,
    ) -> Result<T, DecodeError> {
        let mut document = parse_exact(bytes)?;
        let current = serde_json::to_value(existing).map_err(DecodeError::Text)?;

        if let (Value::Object(wire), Value::Object(current)) = (&mut document, current) {
            for (key, value) in current {
                wire.entry(key).or_insert(value);
            }
        }
        self.from_document(document)
    }

    /// Decode one JSON document from a reader, leaving it positioned after
    /// the document. Whitespace between documents is skipped.
    pub fn decode_from<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<T, DecodeError> {
        // Room for a separator on either side of the document
        let limit = self.max_payload_bytes.saturating_add(2);
        let mut deserializer = serde_json::Deserializer::from_reader(reader.take(limit));
        let document = Value::deserialize(&mut deserializer).map_err(DecodeError::Text)?;
        self.from_document(document)
    }
}

fn parse_exact(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut documents = serde_json::Deserializer::from_slice(bytes).into_iter::<Value>();
    match documents.next() {
        Some(document) => {
            let document = document.map_err(DecodeError::Text)?;
            let consumed = documents.byte_offset();
            if consumed != bytes.len() {
                return Err(DecodeError::Unconsumed {
                    consumed,
                    len: bytes.len(),
                });
            }
            Ok(document)
        }
        None => Err(DecodeError::Unconsumed {
            consumed: 0,
            len: bytes.len(),
        }),
    }
}
