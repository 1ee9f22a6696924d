use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use embeddenator_codec::{ByteConverter, Schema};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Default)]
struct Telemetry {
    device: String,
    sequence: u64,
    temperature: i32,
    readings: Vec<i64>,
    note: Option<String>,
}

const TELEMETRY_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Telemetry",
    "fields": [
        {"name": "device", "type": "string"},
        {"name": "sequence", "type": "long"},
        {"name": "temperature", "type": "int"},
        {"name": "readings", "type": {"type": "array", "items": "long"}},
        {"name": "note", "type": ["null", "string"], "default": null}
    ]
}"#;

fn sample() -> Telemetry {
    Telemetry {
        device: "sensor-0042".to_string(),
        sequence: 1_234_567,
        temperature: -12,
        readings: (0..64).map(|i| i * 1_000 - 32_000).collect(),
        note: Some("calibrated".to_string()),
    }
}

fn bench_binary(c: &mut Criterion) {
    let mut converter = ByteConverter::<Telemetry>::new();
    let record = sample();
    let bytes = converter.encode(&record).unwrap();
    let mut target = Telemetry::default();

    c.bench_function("binary_encode", |b| {
        b.iter(|| converter.encode(black_box(&record)).unwrap())
    });
    c.bench_function("binary_decode", |b| {
        b.iter(|| converter.decode(black_box(&bytes)).unwrap())
    });
    c.bench_function("binary_decode_into", |b| {
        b.iter(|| converter.decode_into(black_box(&bytes), &mut target).unwrap())
    });
}

fn bench_textual(c: &mut Criterion) {
    let schema = Arc::new(Schema::parse(TELEMETRY_SCHEMA).unwrap());
    let mut converter = ByteConverter::<Telemetry>::textual(schema).unwrap();
    let record = sample();
    let bytes = converter.encode(&record).unwrap();

    c.bench_function("textual_encode", |b| {
        b.iter(|| converter.encode(black_box(&record)).unwrap())
    });
    c.bench_function("textual_decode", |b| {
        b.iter(|| converter.decode(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_binary, bench_textual);
criterion_main!(benches);
