//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use embeddenator_codec::Schema;
use serde::{Deserialize, Serialize};

pub const PERSON_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Person",
    "fields": [
        {"name": "name", "type": "string"},
        {"name": "age", "type": "int"}
    ]
}"#;

pub const DEVICE_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Device",
    "namespace": "fleet",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "label", "type": "string"},
        {"name": "state", "type": {"type": "enum", "name": "State", "symbols": ["Online", "Offline"]}},
        {"name": "tags", "type": {"type": "array", "items": "string"}, "default": []},
        {"name": "owner", "type": ["null", "string"], "default": null},
        {"name": "firmware", "type": "bytes"}
    ]
}"#;

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Person {
    pub name: String,
    pub age: i32,
}

impl Person {
    pub fn ann() -> Self {
        Person {
            name: "Ann".to_string(),
            age: 30,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy, Default)]
pub enum State {
    #[default]
    Online,
    Offline,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Device {
    pub id: i64,
    pub label: String,
    pub state: State,
    pub tags: Vec<String>,
    pub owner: Option<String>,
    pub firmware: Vec<u8>,
}

impl Device {
    pub fn sample() -> Self {
        Device {
            id: 9_000_000_001,
            label: "edge-gateway".to_string(),
            state: State::Offline,
            tags: vec!["rack-4".to_string(), "eu-west".to_string()],
            owner: Some("ops".to_string()),
            firmware: vec![0xDE, 0xAD, 0xBE, 0xEF],
        }
    }
}

pub fn person_schema() -> Arc<Schema> {
    Arc::new(Schema::parse(PERSON_SCHEMA).unwrap())
}

pub fn device_schema() -> Arc<Schema> {
    Arc::new(Schema::parse(DEVICE_SCHEMA).unwrap())
}

/// Install a test subscriber so `RUST_LOG=trace` shows converter events.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
