//! Detects NaN and infinite floats before a record is rendered as JSON.
//!
//! serde_json writes non-finite floats as `null`, which would either fail
//! schema conformance with a misleading message or, under a nullable union,
//! silently change the value. [`contains_non_finite`] walks the record's
//! serde representation once and stops at the first such float.

use std::fmt;

use serde::ser::{self, Serialize, Serializer};

/// True if any `f32`/`f64` reachable from `datum` is NaN or infinite.
pub(crate) fn contains_non_finite<T: Serialize + ?Sized>(datum: &T) -> bool {
    matches!(datum.serialize(FloatScan), Err(ScanStop::NonFinite))
}

#[derive(Clone, Copy)]
struct FloatScan;

#[derive(Debug)]
enum ScanStop {
    NonFinite,
    Other(String),
}

impl fmt::Display for ScanStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite => f.write_str("non-finite float"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ScanStop {}

impl ser::Error for ScanStop {
    fn custom<M: fmt::Display>(msg: M) -> Self {
        Self::Other(msg.to_string())
    }
}

fn finite(ok: bool) -> Result<(), ScanStop> {
    if ok {
        Ok(())
    } else {
        Err(ScanStop::NonFinite)
    }
}

impl Serializer for FloatScan {
    type Ok = ();
    type Error = ScanStop;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), ScanStop> {
        finite(v.is_finite())
    }

    fn serialize_f64(self, v: f64) -> Result<(), ScanStop> {
        finite(v.is_finite())
    }

    fn serialize_char(self, _: char) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), ScanStop> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<(), ScanStop> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _: &'static str, value: &T) -> Result<(), ScanStop> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), ScanStop> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, ScanStop> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, ScanStop> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, ScanStop> {
        Ok(self)
    }

    fn serialize_tuple_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, ScanStop> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, ScanStop> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, ScanStop> {
        Ok(self)
    }

    fn serialize_struct_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, ScanStop> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FloatScan {
    type Ok = ();
    type Error = ScanStop;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanStop> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanStop> {
        Ok(())
    }
}

impl ser::SerializeTuple for FloatScan {
    type Ok = ();
    type Error = ScanStop;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanStop> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanStop> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FloatScan {
    type Ok = ();
    type Error = ScanStop;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanStop> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanStop> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FloatScan {
    type Ok = ();
    type Error = ScanStop;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanStop> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanStop> {
        Ok(())
    }
}

impl ser::SerializeMap for FloatScan {
    type Ok = ();
    type Error = ScanStop;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), ScanStop> {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanStop> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanStop> {
        Ok(())
    }
}

impl ser::SerializeStruct for FloatScan {
    type Ok = ();
    type Error = ScanStop;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), ScanStop> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanStop> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FloatScan {
    type Ok = ();
    type Error = ScanStop;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), ScanStop> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanStop> {
        Ok(())
    }
}
