//! Error types for conversion and schema compilation.

use std::fmt;
use std::io;

use thiserror::Error;

/// Coarse classification of a [`CodecError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call site passed unusable input (empty or oversized buffer).
    InvalidInput,
    /// Wire bytes were malformed, truncated, or did not match the schema.
    Decode,
    /// A value could not be written in the active wire format.
    Encode,
    /// A schema could not be compiled or is unusable for the requested mode.
    Configuration,
}

/// Location and cause of a schema conformance failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON-path-like location, e.g. `$.address.city` or `$.tags[2]`.
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    pub(crate) fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.path, self.reason)
    }
}

impl std::error::Error for SchemaViolation {}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("binary payload: {0}")]
    Binary(#[source] bincode::Error),

    #[error("textual payload: {0}")]
    Text(#[source] serde_json::Error),

    #[error("schema mismatch {0}")]
    Schema(#[source] SchemaViolation),

    #[error("document ends after {consumed} of {len} payload bytes")]
    Unconsumed { consumed: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("binary encoding: {0}")]
    Binary(#[source] bincode::Error),

    #[error("textual encoding: {0}")]
    Text(#[source] serde_json::Error),

    #[error("value rejected by schema {0}")]
    Schema(#[source] SchemaViolation),

    /// NaN and infinities have no JSON form; binary mode carries them.
    #[error("NaN or infinite float cannot be written as JSON")]
    NonFiniteFloat,

    #[error("encoded payload is {len} bytes (max {max})")]
    SizeLimit { len: u64, max: u64 },

    #[error("output sink: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("schema source is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("unknown type name: {0}")]
    UnknownType(String),

    #[error("named type defined twice: {0}")]
    DuplicateName(String),

    #[error("invalid schema at {path}: {reason}")]
    Invalid { path: String, reason: String },

    #[error("schema root type `{0}` cannot carry a record")]
    UnusableRoot(&'static str),
}

impl ConfigurationError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error returned by every converter and schema operation.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("null or empty data to decode")]
    EmptyInput,

    #[error("payload of {len} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: u64 },

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput | Self::PayloadTooLarge { .. } => ErrorKind::InvalidInput,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
