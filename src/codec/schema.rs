//! Record schemas
//!
//! Schemas are written in Avro-style JSON and compiled once into a
//! [`Schema`], which is immutable afterwards and meant to be shared between
//! converters behind an `Arc`.
//!
//! ```
//! use embeddenator_codec::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::parse(r#"{
//!     "type": "record", "name": "Person", "namespace": "demo",
//!     "fields": [
//!         {"name": "name", "type": "string"},
//!         {"name": "age", "type": "int"},
//!         {"name": "email", "type": ["null", "string"], "default": null}
//!     ]
//! }"#).unwrap();
//!
//! assert!(schema.validate(&json!({"name": "Ann", "age": 30})).is_ok());
//! assert!(schema.validate(&json!({"name": "Ann"})).is_err());
//! assert_eq!(schema.fingerprint_hex().len(), 64);
//! ```
//!
//! Supported types: `null`, `boolean`, `int`, `long`, `float`, `double`,
//! `bytes`, `string`, `record`, `enum`, `array`, `map` and unions. Named
//! types may be referenced after (or, for records, during) their definition,
//! which allows recursive layouts.

use std::fmt;
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::error::{ConfigurationError, SchemaViolation};

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Array(Box<SchemaType>),
    Map(Box<SchemaType>),
    Union(Vec<SchemaType>),
    Record(RecordSchema),
    Enum(EnumSchema),
    /// Reference to a named record or enum by its full name
    Ref(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: SchemaType,
    pub default: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumSchema {
    pub name: String,
    pub symbols: Vec<String>,
}

impl SchemaType {
    fn primitive(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "bytes" => Self::Bytes,
            "string" => Self::String,
            _ => return None,
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Union(_) => "union",
            Self::Record(_) => "record",
            Self::Enum(_) => "enum",
            Self::Ref(_) => "reference",
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Record(r) => format!("record `{}`", r.name),
            Self::Enum(e) => format!("enum `{}`", e.name),
            Self::Ref(name) => format!("`{name}`"),
            other => other.type_name().to_string(),
        }
    }
}

/// A compiled, immutable schema
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    root: SchemaType,
    named: FxHashMap<String, SchemaType>,
    canonical: String,
}

impl Schema {
    /// Compile schema source text.
    pub fn parse(source: &str) -> Result<Self, ConfigurationError> {
        let json: Value = serde_json::from_str(source).map_err(ConfigurationError::Syntax)?;
        Self::from_json(&json)
    }

    /// Compile an already-parsed JSON schema document.
    pub fn from_json(json: &Value) -> Result<Self, ConfigurationError> {
        let mut compiler = Compiler::default();
        let root = compiler.compile(json, None, "$")?;

        let mut schema = Schema {
            root,
            named: compiler.named,
            canonical: String::new(),
        };

        for (path, ty, default) in compiler.defaults {
            // A union default must match the first branch
            let ty = match ty {
                SchemaType::Union(mut branches) if !branches.is_empty() => branches.swap_remove(0),
                other => other,
            };
            let mut candidate = default;
            schema.conform(&ty, &mut candidate, &path).map_err(|v| {
                ConfigurationError::invalid(&path, format!("default does not match field type: {}", v.reason))
            })?;
        }

        let mut emitted = FxHashSet::default();
        schema.canonical = schema.canonical_value(&schema.root, &mut emitted).to_string();
        Ok(schema)
    }

    pub fn root(&self) -> &SchemaType {
        &self.root
    }

    /// Look up a record or enum by full name.
    pub fn named_type(&self, full_name: &str) -> Option<&SchemaType> {
        self.named.get(full_name)
    }

    /// Check a JSON document against the schema without modifying it.
    ///
    /// Absent fields are accepted when they declare a default or admit null.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        let mut candidate = value.clone();
        self.conform_value(&mut candidate)
    }

    /// Check a JSON document and fill absent fields with their defaults.
    pub(crate) fn conform_value(&self, value: &mut Value) -> Result<(), SchemaViolation> {
        self.conform(&self.root, value, "$")
    }

    /// Deterministic compact JSON rendering of the schema.
    ///
    /// Field defaults are omitted and every named type appears in full once,
    /// so sources that differ only in whitespace, key order, or defaults share
    /// a canonical form.
    pub fn canonical_form(&self) -> &str {
        &self.canonical
    }

    /// SHA-256 of the canonical form.
    pub fn fingerprint(&self) -> [u8; 32] {
        let digest = Sha256::digest(self.canonical.as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }

    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint().iter().map(|b| format!("{b:02x}")).collect()
    }

    fn resolve<'a>(&'a self, name: &str) -> Option<&'a SchemaType> {
        self.named.get(name)
    }

    fn admits_null(&self, ty: &SchemaType) -> bool {
        match ty {
            SchemaType::Null => true,
            SchemaType::Union(branches) => branches.iter().any(|b| matches!(b, SchemaType::Null)),
            _ => false,
        }
    }

    fn conform(&self, ty: &SchemaType, value: &mut Value, path: &str) -> Result<(), SchemaViolation> {
        let mismatch = || SchemaViolation::new(path, format!("expected {}", ty.describe()));

        match ty {
            SchemaType::Null => value.is_null().then_some(()).ok_or_else(mismatch),
            SchemaType::Boolean => value.is_boolean().then_some(()).ok_or_else(mismatch),
            SchemaType::Int => value
                .as_i64()
                .filter(|v| i32::try_from(*v).is_ok())
                .map(|_| ())
                .ok_or_else(mismatch),
            SchemaType::Long => value.as_i64().map(|_| ()).ok_or_else(mismatch),
            SchemaType::Float | SchemaType::Double => value.is_number().then_some(()).ok_or_else(mismatch),
            SchemaType::String => value.is_string().then_some(()).ok_or_else(mismatch),
            SchemaType::Bytes => {
                let ok = match value {
                    Value::String(_) => true,
                    Value::Array(items) => items
                        .iter()
                        .all(|b| b.as_u64().is_some_and(|b| b <= u64::from(u8::MAX))),
                    _ => false,
                };
                ok.then_some(()).ok_or_else(mismatch)
            }
            SchemaType::Enum(e) => match value.as_str() {
                Some(symbol) if e.symbols.iter().any(|s| s == symbol) => Ok(()),
                Some(symbol) => Err(SchemaViolation::new(
                    path,
                    format!("`{symbol}` is not a symbol of enum `{}`", e.name),
                )),
                None => Err(mismatch()),
            },
            SchemaType::Array(items) => {
                let elements = value.as_array_mut().ok_or_else(mismatch)?;
                for (i, element) in elements.iter_mut().enumerate() {
                    self.conform(items, element, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            SchemaType::Map(values) => {
                let entries = value.as_object_mut().ok_or_else(mismatch)?;
                for (key, entry) in entries.iter_mut() {
                    self.conform(values, entry, &format!("{path}.{key}"))?;
                }
                Ok(())
            }
            SchemaType::Union(branches) => {
                for branch in branches {
                    let mut candidate = value.clone();
                    if self.conform(branch, &mut candidate, path).is_ok() {
                        *value = candidate;
                        return Ok(());
                    }
                }
                let names: Vec<String> = branches.iter().map(SchemaType::describe).collect();
                Err(SchemaViolation::new(
                    path,
                    format!("value matches no union branch of [{}]", names.join(", ")),
                ))
            }
            SchemaType::Record(record) => self.conform_record(record, value, path),
            SchemaType::Ref(name) => match self.resolve(name) {
                Some(resolved) => self.conform(resolved, value, path),
                None => Err(SchemaViolation::new(path, format!("unresolved type `{name}`"))),
            },
        }
    }

    fn conform_record(&self, record: &RecordSchema, value: &mut Value, path: &str) -> Result<(), SchemaViolation> {
        let object = value
            .as_object_mut()
            .ok_or_else(|| SchemaViolation::new(path, format!("expected record `{}`", record.name)))?;

        if let Some(unknown) = object
            .keys()
            .find(|key| !record.fields.iter().any(|f| &f.name == *key))
        {
            return Err(SchemaViolation::new(
                &format!("{path}.{unknown}"),
                format!("field not declared by record `{}`", record.name),
            ));
        }

        for field in &record.fields {
            let field_path = format!("{path}.{}", field.name);
            match object.get_mut(&field.name) {
                Some(slot) => self.conform(&field.ty, slot, &field_path)?,
                None => {
                    let filler = match &field.default {
                        Some(default) => default.clone(),
                        None if self.admits_null(&field.ty) => Value::Null,
                        None => {
                            return Err(SchemaViolation::new(&field_path, "missing required field"));
                        }
                    };
                    object.insert(field.name.clone(), filler);
                }
            }
        }
        Ok(())
    }

    fn canonical_value(&self, ty: &SchemaType, emitted: &mut FxHashSet<String>) -> Value {
        match ty {
            SchemaType::Array(items) => json!({"type": "array", "items": self.canonical_value(items, emitted)}),
            SchemaType::Map(values) => json!({"type": "map", "values": self.canonical_value(values, emitted)}),
            SchemaType::Union(branches) => Value::Array(
                branches
                    .iter()
                    .map(|b| self.canonical_value(b, emitted))
                    .collect(),
            ),
            SchemaType::Record(record) => {
                if !emitted.insert(record.name.clone()) {
                    return Value::String(record.name.clone());
                }
                let fields: Vec<Value> = record
                    .fields
                    .iter()
                    .map(|f| json!({"name": f.name, "type": self.canonical_value(&f.ty, emitted)}))
                    .collect();
                json!({"type": "record", "name": record.name, "fields": fields})
            }
            SchemaType::Enum(e) => {
                if !emitted.insert(e.name.clone()) {
                    return Value::String(e.name.clone());
                }
                json!({"type": "enum", "name": e.name, "symbols": e.symbols})
            }
            SchemaType::Ref(name) => match self.resolve(name) {
                Some(resolved) if !emitted.contains(name) => self.canonical_value(resolved, emitted),
                _ => Value::String(name.clone()),
            },
            primitive => Value::String(primitive.type_name().to_string()),
        }
    }
}

impl FromStr for Schema {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Single-use schema compiler state
#[derive(Default)]
struct Compiler {
    named: FxHashMap<String, SchemaType>,
    /// Records whose fields are still being compiled
    pending: FxHashSet<String>,
    /// Field defaults, checked once every named type is known
    defaults: Vec<(String, SchemaType, Value)>,
}

impl Compiler {
    fn compile(&mut self, json: &Value, namespace: Option<&str>, path: &str) -> Result<SchemaType, ConfigurationError> {
        match json {
            Value::String(name) => self.lookup(name, namespace),
            Value::Array(branches) => self.compile_union(branches, namespace, path),
            Value::Object(object) => self.compile_object(object, namespace, path),
            _ => Err(ConfigurationError::invalid(
                path,
                "expected a type name, union array, or type object",
            )),
        }
    }

    fn lookup(&self, name: &str, namespace: Option<&str>) -> Result<SchemaType, ConfigurationError> {
        if let Some(primitive) = SchemaType::primitive(name) {
            return Ok(primitive);
        }
        let qualified = full_name(name, namespace);
        let known = |candidate: &str| self.named.contains_key(candidate) || self.pending.contains(candidate);
        if known(qualified.as_str()) {
            Ok(SchemaType::Ref(qualified))
        } else if known(name) {
            Ok(SchemaType::Ref(name.to_string()))
        } else {
            Err(ConfigurationError::UnknownType(name.to_string()))
        }
    }

    fn compile_union(
        &mut self,
        branches: &[Value],
        namespace: Option<&str>,
        path: &str,
    ) -> Result<SchemaType, ConfigurationError> {
        if branches.is_empty() {
            return Err(ConfigurationError::invalid(path, "union has no branches"));
        }
        let mut compiled = Vec::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            let branch_path = format!("{path}[{i}]");
            let ty = self.compile(branch, namespace, &branch_path)?;
            if matches!(ty, SchemaType::Union(_)) {
                return Err(ConfigurationError::invalid(&branch_path, "unions may not nest"));
            }
            compiled.push(ty);
        }
        Ok(SchemaType::Union(compiled))
    }

    fn compile_object(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<SchemaType, ConfigurationError> {
        let ty = object
            .get("type")
            .ok_or_else(|| ConfigurationError::invalid(path, "missing `type`"))?;

        let Value::String(type_name) = ty else {
            return self.compile(ty, namespace, &format!("{path}.type"));
        };

        match type_name.as_str() {
            "record" => self.compile_record(object, namespace, path),
            "enum" => self.compile_enum(object, namespace, path),
            "array" => {
                let items = object
                    .get("items")
                    .ok_or_else(|| ConfigurationError::invalid(path, "array is missing `items`"))?;
                let items = self.compile(items, namespace, &format!("{path}.items"))?;
                Ok(SchemaType::Array(Box::new(items)))
            }
            "map" => {
                let values = object
                    .get("values")
                    .ok_or_else(|| ConfigurationError::invalid(path, "map is missing `values`"))?;
                let values = self.compile(values, namespace, &format!("{path}.values"))?;
                Ok(SchemaType::Map(Box::new(values)))
            }
            other => self.lookup(other, namespace),
        }
    }

    fn declare(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<(String, Option<String>), ConfigurationError> {
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigurationError::invalid(path, "named type is missing `name`"))?;
        if !valid_name(name) {
            return Err(ConfigurationError::invalid(path, format!("`{name}` is not a valid name")));
        }

        let namespace = object
            .get("namespace")
            .and_then(Value::as_str)
            .or(namespace)
            .filter(|ns| !ns.is_empty());
        let full = full_name(name, namespace);
        if self.named.contains_key(&full) || self.pending.contains(&full) {
            return Err(ConfigurationError::DuplicateName(full));
        }

        // Nested definitions inherit the namespace of the enclosing full name
        let inner_ns = full.rsplit_once('.').map(|(ns, _)| ns.to_string());
        Ok((full, inner_ns))
    }

    fn compile_record(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<SchemaType, ConfigurationError> {
        let (name, inner_ns) = self.declare(object, namespace, path)?;
        let fields_json = object
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| ConfigurationError::invalid(path, format!("record `{name}` is missing `fields`")))?;

        self.pending.insert(name.clone());

        let mut fields: Vec<Field> = Vec::with_capacity(fields_json.len());
        for (i, field_json) in fields_json.iter().enumerate() {
            let field_path = format!("{path}.fields[{i}]");
            let field_name = field_json
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ConfigurationError::invalid(&field_path, "field is missing `name`"))?;
            if !valid_name(field_name) || field_name.contains('.') {
                return Err(ConfigurationError::invalid(
                    &field_path,
                    format!("`{field_name}` is not a valid field name"),
                ));
            }
            if fields.iter().any(|f| f.name == field_name) {
                return Err(ConfigurationError::invalid(
                    &field_path,
                    format!("duplicate field `{field_name}` in record `{name}`"),
                ));
            }

            let ty_json = field_json
                .get("type")
                .ok_or_else(|| ConfigurationError::invalid(&field_path, "field is missing `type`"))?;
            let ty = self.compile(ty_json, inner_ns.as_deref(), &format!("{field_path}.type"))?;

            let default = field_json.get("default").cloned();
            if let Some(default) = &default {
                self.defaults.push((field_path.clone(), ty.clone(), default.clone()));
            }

            fields.push(Field {
                name: field_name.to_string(),
                ty,
                default,
            });
        }

        self.pending.remove(&name);
        let record = SchemaType::Record(RecordSchema { name: name.clone(), fields });
        self.named.insert(name, record.clone());
        Ok(record)
    }

    fn compile_enum(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<SchemaType, ConfigurationError> {
        let (name, _) = self.declare(object, namespace, path)?;
        let symbols_json = object
            .get("symbols")
            .and_then(Value::as_array)
            .filter(|symbols| !symbols.is_empty())
            .ok_or_else(|| ConfigurationError::invalid(path, format!("enum `{name}` needs a non-empty `symbols` array")))?;

        let mut symbols: Vec<String> = Vec::with_capacity(symbols_json.len());
        for symbol in symbols_json {
            let symbol = symbol
                .as_str()
                .ok_or_else(|| ConfigurationError::invalid(path, "enum symbols must be strings"))?;
            if symbols.iter().any(|s| s == symbol) {
                return Err(ConfigurationError::invalid(
                    path,
                    format!("duplicate symbol `{symbol}` in enum `{name}`"),
                ));
            }
            symbols.push(symbol.to_string());
        }

        let ty = SchemaType::Enum(EnumSchema { name: name.clone(), symbols });
        self.named.insert(name, ty.clone());
        Ok(ty)
    }
}

fn full_name(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !name.contains('.') && !ns.is_empty() => format!("{ns}.{name}"),
        _ => name.to_string(),
    }
}

fn valid_name(name: &str) -> bool {
    name.split('.').all(|part| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
