//! # embeddenator-codec
//!
//! Schema-typed conversion of records to and from wire bytes for Embeddenator.
//!
//! A [`ByteConverter<T>`] binds one record type to a codec. It starts out in
//! the compact binary format and can be switched to a schema-checked JSON
//! form for debugging, then back again.
//!
//! ```
//! use embeddenator_codec::{ByteConverter, Schema};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Person { name: String, age: i32 }
//!
//! let mut converter = ByteConverter::<Person>::new();
//! let person = Person { name: "Ann".to_string(), age: 30 };
//!
//! let bytes = converter.encode(&person).unwrap();
//! assert_eq!(converter.decode(&bytes).unwrap(), person);
//!
//! let schema: Schema = r#"{"type": "record", "name": "Person", "fields": [
//!     {"name": "name", "type": "string"},
//!     {"name": "age", "type": "int"}
//! ]}"#.parse().unwrap();
//! converter.switch_to_textual(Arc::new(schema)).unwrap();
//!
//! let text = converter.encode(&person).unwrap();
//! assert_eq!(text.as_slice(), br#"{"age":30,"name":"Ann"}"#);
//! ```

/// Emits a `tracing` event when the `logging` feature is enabled.
macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(feature = "logging")]
        tracing::$level!($($arg)*);
    };
}

pub mod codec;
pub use codec::*;
