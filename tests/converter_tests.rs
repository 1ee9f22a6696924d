//! Integration tests for ByteConverter
//!
//! Covers both wire formats end to end: round trips, buffer exactness,
//! input rejection, mode isolation, and stream-based conversion.

mod common;

use std::io::{Cursor, Read, Seek, SeekFrom};

use common::*;
use embeddenator_codec::*;
use tempfile::tempfile;

#[test]
fn test_binary_roundtrip() {
    init_logging();
    let mut converter = ByteConverter::<Person>::new();

    let bytes = converter.encode(&Person::ann()).unwrap();
    assert_eq!(bytes.as_slice(), &[3, b'A', b'n', b'n', 60]);

    let decoded = converter.decode(&bytes).unwrap();
    assert_eq!(decoded, Person::ann());
}

#[test]
fn test_textual_roundtrip() {
    init_logging();
    let mut converter = ByteConverter::<Person>::textual(person_schema()).unwrap();

    let bytes = converter.encode(&Person::ann()).unwrap();
    assert_eq!(bytes.as_slice(), br#"{"age":30,"name":"Ann"}"#);

    let decoded = converter.decode(&bytes).unwrap();
    assert_eq!(decoded, Person::ann());
}

#[test]
fn test_roundtrip_complex_record_both_formats() {
    let mut converter = ByteConverter::<Device>::new();
    let device = Device::sample();

    let binary = converter.encode(&device).unwrap();
    assert_eq!(converter.decode(&binary).unwrap(), device);

    converter.switch_to_textual(device_schema()).unwrap();
    let text = converter.encode(&device).unwrap();
    assert_eq!(converter.decode(&text).unwrap(), device);

    // Binary is the compact one
    assert!(binary.len() < text.len());
}

#[test]
fn test_truncated_payload_fails() {
    let mut converter = ByteConverter::<Person>::new();
    let bytes = converter.encode(&Person::ann()).unwrap();

    let err = converter.decode(&bytes[..bytes.len() - 1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);

    converter.switch_to_textual(person_schema()).unwrap();
    let text = converter.encode(&Person::ann()).unwrap();
    let err = converter.decode(&text[..text.len() - 1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_trailing_bytes_fail() {
    let mut converter = ByteConverter::<Person>::new();
    let mut bytes = converter.encode(&Person::ann()).unwrap().into_vec();
    bytes.push(0);

    let err = converter.decode(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::Decode(DecodeError::Binary(_))));
}

#[test]
fn test_empty_input_rejected_in_both_modes() {
    let mut converter = ByteConverter::<Person>::new();
    let mut person = Person::ann();

    let err = converter.decode(&[]).unwrap_err();
    assert!(matches!(err, CodecError::EmptyInput));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.to_string(), "null or empty data to decode");

    let err = converter.decode_into(&[], &mut person).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    converter.switch_to_textual(person_schema()).unwrap();
    let err = converter.decode(b"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(person, Person::ann());
}

#[test]
fn test_mode_isolation() {
    let mut converter = ByteConverter::<Person>::new();
    let binary = converter.encode(&Person::ann()).unwrap();

    converter.switch_to_textual(person_schema()).unwrap();
    let err = converter.decode(&binary).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);

    converter.switch_to_binary();
    assert_eq!(converter.decode(&binary).unwrap(), Person::ann());
}

#[test]
fn test_instance_independence() {
    let mut first = ByteConverter::<Device>::new();
    let mut second = ByteConverter::<Device>::new();
    let device = Device::sample();

    let a = first.encode(&device).unwrap();
    let b = second.encode(&device).unwrap();
    assert_eq!(a, b);

    assert_eq!(second.decode(&a).unwrap(), device);
    assert_eq!(first.decode(&b).unwrap(), device);
}

#[test]
fn test_shared_schema_across_converters() {
    let schema = device_schema();
    let mut first = ByteConverter::<Device>::textual(schema.clone()).unwrap();
    let mut second = ByteConverter::<Device>::textual(schema.clone()).unwrap();

    let a = first.encode(&Device::sample()).unwrap();
    let b = second.encode(&Device::sample()).unwrap();
    assert_eq!(a, b);
    assert_eq!(std::sync::Arc::strong_count(&schema), 3);
}

#[test]
fn test_buffers_survive_later_encodes() {
    let mut converter = ByteConverter::<Person>::new();
    let first = converter.encode(&Person::ann()).unwrap();
    let snapshot = first.clone().into_vec();

    let _second = converter
        .encode(&Person {
            name: "Someone Else".to_string(),
            age: 99,
        })
        .unwrap();

    assert_eq!(first.as_slice(), snapshot.as_slice());
}

#[test]
fn test_decode_into_matches_decode() {
    let mut converter = ByteConverter::<Device>::new();
    let bytes = converter.encode(&Device::sample()).unwrap();

    let mut target = Device::default();
    converter.decode_into(&bytes, &mut target).unwrap();
    assert_eq!(target, converter.decode(&bytes).unwrap());

    converter.switch_to_textual(device_schema()).unwrap();
    let text = converter.encode(&Device::sample()).unwrap();
    let mut target = Device::default();
    converter.decode_into(&text, &mut target).unwrap();
    assert_eq!(target, converter.decode(&text).unwrap());
}

#[test]
fn test_decode_into_overwrite_policy() {
    let mut converter = ByteConverter::<Device>::textual(device_schema()).unwrap();
    let mut device = Device::sample();

    let partial = br#"{"id": 1, "label": "spare", "state": "Online", "firmware": []}"#;
    converter.decode_into(partial, &mut device).unwrap();

    assert_eq!(device.id, 1);
    assert!(device.tags.is_empty());
    assert_eq!(device.owner, None);
}

#[test]
fn test_decode_into_merge_policy() {
    let opts = ConverterOptions::default().with_merge(MergePolicy::Merge);
    let mut converter = ByteConverter::<Device>::textual_with_options(device_schema(), opts).unwrap();
    let mut device = Device::sample();

    let partial = br#"{"id": 1, "label": "spare", "state": "Online", "firmware": []}"#;
    converter.decode_into(partial, &mut device).unwrap();

    assert_eq!(device.id, 1);
    assert_eq!(device.label, "spare");
    assert_eq!(device.tags, Device::sample().tags);
    assert_eq!(device.owner.as_deref(), Some("ops"));

    // Binary payloads carry every field, so merge changes nothing there
    converter.switch_to_binary();
    let mut fresh = Device::default();
    let bytes = converter.encode(&Device::sample()).unwrap();
    converter.decode_into(&bytes, &mut fresh).unwrap();
    assert_eq!(fresh, Device::sample());
}

#[test]
fn test_schema_rejects_value_on_encode() {
    let schema = std::sync::Arc::new(
        Schema::parse(
            r#"{"type": "record", "name": "Person", "fields": [
                {"name": "name", "type": "string"},
                {"name": "age", "type": "int"},
                {"name": "email", "type": "string"}
            ]}"#,
        )
        .unwrap(),
    );
    let mut converter = ByteConverter::<Person>::textual(schema).unwrap();

    let err = converter.encode(&Person::ann()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encode);
    match err {
        CodecError::Encode(EncodeError::Schema(violation)) => {
            assert_eq!(violation.path, "$.email");
            assert_eq!(violation.reason, "missing required field");
        }
        other => panic!("expected schema violation, got {other:?}"),
    }

    let mut sink = Vec::new();
    assert!(converter.encode_to_stream(&Person::ann(), &mut sink).is_err());
    assert!(sink.is_empty());
}

#[test]
fn test_schema_mismatch_on_decode() {
    let mut converter = ByteConverter::<Person>::textual(person_schema()).unwrap();

    let err = converter.decode(br#"{"name": "Ann", "age": 30, "extra": 1}"#).unwrap_err();
    assert!(matches!(err, CodecError::Decode(DecodeError::Schema(_))));

    let err = converter.decode(br#"{"name": "Ann"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_payload_limit() {
    let opts = ConverterOptions::default().with_max_payload_bytes(8);
    let mut converter = ByteConverter::<Person>::with_options(opts);
    let long = Person {
        name: "a name that does not fit".to_string(),
        age: 1,
    };

    let err = converter.encode(&long).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encode);

    converter.switch_to_textual(person_schema()).unwrap();
    let err = converter.encode(&long).unwrap_err();
    assert!(matches!(err, CodecError::Encode(EncodeError::SizeLimit { max: 8, .. })));
}

#[test]
fn test_encode_to_stream_matches_encode() {
    let mut converter = ByteConverter::<Device>::new();
    let device = Device::sample();

    let buffer = converter.encode(&device).unwrap();
    let mut sink = Vec::new();
    let written = converter.encode_to_stream(&device, &mut sink).unwrap();
    assert_eq!(written, buffer.len() as u64);
    assert_eq!(sink, buffer.as_slice());

    // Textual documents on a stream are newline-terminated
    converter.switch_to_textual(device_schema()).unwrap();
    let buffer = converter.encode(&device).unwrap();
    let mut sink = Vec::new();
    let written = converter.encode_to_stream(&device, &mut sink).unwrap();
    assert_eq!(written, buffer.len() as u64 + 1);
    assert_eq!(&sink[..buffer.len()], buffer.as_slice());
    assert_eq!(sink.last(), Some(&b'\n'));
}

#[test]
fn test_encode_to_file_sink() {
    let opts = ConverterOptions::default().with_sink_buffer_size(16);
    let mut converter = ByteConverter::<Device>::with_options(opts);
    let mut file = tempfile().unwrap();

    let written = converter.encode_to_stream(&Device::sample(), &mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).unwrap();

    assert_eq!(contents.len() as u64, written);
    assert_eq!(converter.decode(&contents).unwrap(), Device::sample());
}

#[test]
fn test_decode_from_stream_of_records() {
    let people = [
        Person::ann(),
        Person {
            name: "Bo".to_string(),
            age: -4,
        },
    ];

    for textual in [false, true] {
        let mut converter = ByteConverter::<Person>::new();
        if textual {
            converter.switch_to_textual(person_schema()).unwrap();
        }

        let mut stream = Vec::new();
        for person in &people {
            converter.encode_to_stream(person, &mut stream).unwrap();
        }

        let mut reader = Cursor::new(stream);
        for person in &people {
            assert_eq!(&converter.decode_from(&mut reader).unwrap(), person);
        }
        assert!(converter.decode_from(&mut reader).is_err());
    }
}

#[test]
fn test_decode_from_stream_of_scalars() {
    let schema = std::sync::Arc::new(Schema::parse(r#""long""#).unwrap());

    for pretty in [false, true] {
        let opts = ConverterOptions::default().with_pretty_text(pretty);
        let mut converter = ByteConverter::<i64>::textual_with_options(schema.clone(), opts).unwrap();

        let mut stream = Vec::new();
        for value in [12, 34, -5] {
            converter.encode_to_stream(&value, &mut stream).unwrap();
        }
        assert_eq!(stream, b"12\n34\n-5\n");

        let mut reader = Cursor::new(stream);
        assert_eq!(converter.decode_from(&mut reader).unwrap(), 12);
        assert_eq!(converter.decode_from(&mut reader).unwrap(), 34);
        assert_eq!(converter.decode_from(&mut reader).unwrap(), -5);
        assert!(converter.decode_from(&mut reader).is_err());
    }
}

#[test]
fn test_textual_decode_requires_exact_payload() {
    let mut converter = ByteConverter::<Person>::textual(person_schema()).unwrap();
    let mut bytes = converter.encode(&Person::ann()).unwrap().into_vec();

    bytes.extend_from_slice(b"   \n");
    let err = converter.decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(matches!(err, CodecError::Decode(DecodeError::Unconsumed { .. })));

    // A record written to a stream carries its separator, so read it back as one
    let mut stream = Vec::new();
    converter.encode_to_stream(&Person::ann(), &mut stream).unwrap();
    assert!(converter.decode(&stream).is_err());
    assert_eq!(converter.decode_from(stream.as_slice()).unwrap(), Person::ann());
}

#[test]
fn test_non_finite_floats_in_both_formats() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Reading {
        value: f64,
    }

    let schema = std::sync::Arc::new(
        Schema::parse(r#"{"type": "record", "name": "Reading", "fields": [{"name": "value", "type": "double"}]}"#)
            .unwrap(),
    );
    let mut converter = ByteConverter::<Reading>::new();

    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let bytes = converter.encode(&Reading { value }).unwrap();
        let decoded = converter.decode(&bytes).unwrap();
        assert_eq!(decoded.value.to_bits(), value.to_bits());
    }

    converter.switch_to_textual(schema).unwrap();
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = converter.encode(&Reading { value }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(matches!(err, CodecError::Encode(EncodeError::NonFiniteFloat)));
    }
    let bytes = converter.encode(&Reading { value: 0.125 }).unwrap();
    assert_eq!(converter.decode(&bytes).unwrap(), Reading { value: 0.125 });
}

#[test]
fn test_pretty_textual_output_decodes() {
    let mut converter =
        ByteConverter::<Person>::textual_with_options(person_schema(), ConverterOptions::diagnostic()).unwrap();

    let bytes = converter.encode(&Person::ann()).unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.contains("\n  \"age\": 30"));
    assert_eq!(converter.decode(&bytes).unwrap(), Person::ann());
}
