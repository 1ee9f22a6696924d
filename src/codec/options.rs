//! Converter configuration
//!
//! [`ConverterOptions`] is a small `Copy` struct that can be built in code or
//! loaded from a JSON config document. Missing keys fall back to defaults:
//!
//! ```
//! use embeddenator_codec::{ConverterOptions, MergePolicy};
//!
//! let opts: ConverterOptions =
//!     serde_json::from_str(r#"{"pretty_text": true, "merge": "merge"}"#).unwrap();
//! assert!(opts.pretty_text);
//! assert_eq!(opts.merge, MergePolicy::Merge);
//! assert_eq!(opts.max_payload_bytes, embeddenator_codec::DEFAULT_MAX_PAYLOAD_BYTES);
//! ```

use serde::{Deserialize, Serialize};

use super::buffer::DEFAULT_BUFFER_SIZE;

/// Default upper bound for a single encoded or decoded payload (16MB)
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// How `decode_into` treats fields that a textual payload leaves out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Replace the whole record; absent fields take their schema default.
    #[default]
    Overwrite,
    /// Keep the record's current value for top-level fields absent on the wire.
    Merge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterOptions {
    /// Largest payload accepted by decode or produced by encode
    pub max_payload_bytes: u64,
    /// Pretty-print textual output
    pub pretty_text: bool,
    /// Field merge behaviour of `decode_into`
    pub merge: MergePolicy,
    /// Buffer size used between the encoder and a caller-supplied sink
    pub sink_buffer_size: usize,
}

impl ConverterOptions {
    pub const fn new(
        max_payload_bytes: u64,
        pretty_text: bool,
        merge: MergePolicy,
        sink_buffer_size: usize,
    ) -> Self {
        Self {
            max_payload_bytes,
            pretty_text,
            merge,
            sink_buffer_size,
        }
    }

    /// Preset for inspecting payloads by eye: pretty textual output.
    pub const fn diagnostic() -> Self {
        OPTIONS_DIAGNOSTIC
    }

    pub fn with_max_payload_bytes(mut self, max: u64) -> Self {
        self.max_payload_bytes = max;
        self
    }

    pub fn with_pretty_text(mut self, pretty: bool) -> Self {
        self.pretty_text = pretty;
        self
    }

    pub fn with_merge(mut self, merge: MergePolicy) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_sink_buffer_size(mut self, size: usize) -> Self {
        self.sink_buffer_size = size;
        self
    }
}

impl Default for ConverterOptions {
    fn default() -> Self {
        OPTIONS_DEFAULT
    }
}

/// Compact output, 16MB payload limit, overwriting `decode_into`
pub const OPTIONS_DEFAULT: ConverterOptions = ConverterOptions::new(
    DEFAULT_MAX_PAYLOAD_BYTES,
    false,
    MergePolicy::Overwrite,
    DEFAULT_BUFFER_SIZE,
);

/// Pretty textual output for debugging sessions
pub const OPTIONS_DIAGNOSTIC: ConverterOptions = ConverterOptions::new(
    DEFAULT_MAX_PAYLOAD_BYTES,
    true,
    MergePolicy::Overwrite,
    DEFAULT_BUFFER_SIZE,
);
