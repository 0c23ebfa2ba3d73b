//! Schema model: message and service definitions, and the registry trait.

use crate::error::RegistryError;
use crate::value::{Record, Value};
use crate::wire::{WireType, MAX_TAG};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Field numbers reserved by the protobuf implementation.
const RESERVED_TAGS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

// ─── Scalar types ─────────────────────────────────────────────────────────────

/// The fifteen protobuf scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub const ALL: [ScalarType; 15] = [
        ScalarType::Double,
        ScalarType::Float,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::Uint32,
        ScalarType::Uint64,
        ScalarType::Sint32,
        ScalarType::Sint64,
        ScalarType::Fixed32,
        ScalarType::Fixed64,
        ScalarType::Sfixed32,
        ScalarType::Sfixed64,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Bytes,
    ];

    /// Wire type of a single (unpacked) element.
    pub fn wire_type(self) -> WireType {
        match self {
            ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::Uint32
            | ScalarType::Uint64
            | ScalarType::Sint32
            | ScalarType::Sint64
            | ScalarType::Bool => WireType::Varint,
            ScalarType::Double | ScalarType::Fixed64 | ScalarType::Sfixed64 => WireType::Fixed64,
            ScalarType::Float | ScalarType::Fixed32 | ScalarType::Sfixed32 => WireType::Fixed32,
            ScalarType::String | ScalarType::Bytes => WireType::LengthDelimited,
        }
    }

    /// Numeric scalars may be packed when repeated.
    pub fn is_packable(self) -> bool {
        !matches!(self, ScalarType::String | ScalarType::Bytes)
    }

    /// 64-bit integer types, subject to the active integer strategy.
    pub fn is_64bit_integer(self) -> bool {
        matches!(
            self,
            ScalarType::Int64
                | ScalarType::Uint64
                | ScalarType::Sint64
                | ScalarType::Fixed64
                | ScalarType::Sfixed64
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == s)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Field definitions ────────────────────────────────────────────────────────

/// Declared type of a field: a scalar or a reference to another message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Scalar(ScalarType),
    Message(String),
}

impl FieldType {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Scalar(s) => s.wire_type(),
            FieldType::Message(_) => WireType::LengthDelimited,
        }
    }

    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            FieldType::Scalar(s) => Some(*s),
            FieldType::Message(_) => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{s}"),
            FieldType::Message(name) => f.write_str(name),
        }
    }
}

/// How many values a field holds and whether absence is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// Always present; the type default when unset.
    Singular,
    /// May be absent. Nested messages are always optional.
    Optional,
    /// Zero or more values, order preserved.
    Repeated,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Singular => write!(f, "singular"),
            Cardinality::Optional => write!(f, "optional"),
            Cardinality::Repeated => write!(f, "repeated"),
        }
    }
}

/// One declared field of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub tag: u32,
    pub ty: FieldType,
    pub cardinality: Cardinality,
    /// Packed encoding for repeated numerics. Ignored for other fields.
    pub packed: bool,
    /// Key used in the JSON form.
    pub json_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    /// A field with proto3 defaults: scalars singular, messages optional,
    /// repeated numerics packed, lowerCamelCase JSON name.
    pub fn new(name: impl Into<String>, tag: u32, ty: FieldType) -> Self {
        let name = name.into();
        let cardinality = match ty {
            FieldType::Scalar(_) => Cardinality::Singular,
            FieldType::Message(_) => Cardinality::Optional,
        };
        Self {
            json_name: json_name_for(&name),
            name,
            tag,
            ty,
            cardinality,
            packed: true,
            description: None,
        }
    }

    pub fn scalar(name: impl Into<String>, tag: u32, ty: ScalarType) -> Self {
        Self::new(name, tag, FieldType::Scalar(ty))
    }

    pub fn message(name: impl Into<String>, tag: u32, type_name: impl Into<String>) -> Self {
        Self::new(name, tag, FieldType::Message(type_name.into()))
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Explicit presence for a scalar (`optional` in proto3).
    pub fn optional(mut self) -> Self {
        self.cardinality = Cardinality::Optional;
        self
    }

    pub fn unpacked(mut self) -> Self {
        self.packed = false;
        self
    }

    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    /// Whether the encoder writes this field as one packed run.
    pub fn is_packed(&self) -> bool {
        self.is_repeated()
            && self.packed
            && matches!(self.ty, FieldType::Scalar(s) if s.is_packable())
    }

    /// The value a freshly created record holds for this field.
    pub fn default_value(&self) -> Option<Value> {
        match (&self.cardinality, &self.ty) {
            (Cardinality::Repeated, _) => Some(Value::List(Vec::new())),
            (Cardinality::Optional, _) | (Cardinality::Singular, FieldType::Message(_)) => None,
            (Cardinality::Singular, FieldType::Scalar(s)) => Some(Value::default_for(*s)),
        }
    }
}

/// Protobuf's default JSON name: `ibc_cro_denom` becomes `ibcCroDenom`.
pub fn json_name_for(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ─── Message schema ───────────────────────────────────────────────────────────

/// A message type: its fully-qualified name and ordered fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSchema {
    /// Fully-qualified name, e.g. `ethermint.evm.v1.LegacyTx`.
    pub name: String,
    /// Declaration order. The encoder emits fields in this order.
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MessageSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            description: None,
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Look up by JSON name, falling back to the declared name.
    pub fn field_by_json_name(&self, key: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.json_name == key)
            .or_else(|| self.field(key))
    }

    /// `"/" + name`, the form used in `Any.type_url` and transaction bodies.
    pub fn type_url(&self) -> String {
        format!("/{}", self.name)
    }

    /// Package part of the name (`cronos` for `cronos.TokenMapping`).
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map(|(p, _)| p).unwrap_or("")
    }

    pub fn short_name(&self) -> &str {
        self.name.rsplit_once('.').map(|(_, n)| n).unwrap_or(&self.name)
    }

    /// A record with every field at its default.
    pub fn default_record(&self) -> Record {
        let slots: IndexMap<String, Option<Value>> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.default_value()))
            .collect();
        Record::from_slots(self.name.clone(), slots)
    }

    /// Check tags, names and cardinalities. References to other message
    /// types are checked at the registry level.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let fail = |reason: String| RegistryError::ValidationFailed {
            reason: format!("{}: {reason}", self.name),
        };
        if self.name.is_empty() {
            return Err(RegistryError::ValidationFailed {
                reason: "message name must not be empty".into(),
            });
        }

        let mut tags = HashSet::new();
        let mut names = HashSet::new();
        let mut json_names = HashSet::new();
        for f in &self.fields {
            if f.name.is_empty() {
                return Err(fail(format!("field with tag {} has no name", f.tag)));
            }
            if f.tag == 0 || f.tag > MAX_TAG {
                return Err(fail(format!("field '{}' has out-of-range tag {}", f.name, f.tag)));
            }
            if RESERVED_TAGS.contains(&f.tag) {
                return Err(fail(format!("field '{}' uses reserved tag {}", f.name, f.tag)));
            }
            if !tags.insert(f.tag) {
                return Err(fail(format!("duplicate tag {}", f.tag)));
            }
            if !names.insert(f.name.as_str()) {
                return Err(fail(format!("duplicate field name '{}'", f.name)));
            }
            if !json_names.insert(f.json_name.as_str()) {
                return Err(fail(format!("duplicate JSON name '{}'", f.json_name)));
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription {
            name: self.name.clone(),
            type_url: self.type_url(),
            description: self.description.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldDescription {
                    name: f.name.clone(),
                    json_name: f.json_name.clone(),
                    tag: f.tag,
                    ty: f.ty.to_string(),
                    cardinality: f.cardinality,
                    wire_type: f.ty.wire_type(),
                    packed: f.is_packed(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a message schema, used by `describe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescription {
    pub name: String,
    pub type_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescription {
    pub name: String,
    pub json_name: String,
    pub tag: u32,
    #[serde(rename = "type")]
    pub ty: String,
    pub cardinality: Cardinality,
    pub wire_type: WireType,
    pub packed: bool,
}

// ─── Services ─────────────────────────────────────────────────────────────────

/// One RPC method: request and response message types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub input: String,
    pub output: String,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
        }
    }
}

/// A named set of RPC methods, e.g. `cronos.Msg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchema {
    pub name: String,
    pub methods: Vec<MethodDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ServiceSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            description: None,
        }
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.name.is_empty() {
            return Err(RegistryError::ValidationFailed {
                reason: "service name must not be empty".into(),
            });
        }
        let mut seen = HashSet::new();
        for m in &self.methods {
            if !seen.insert(m.name.as_str()) {
                return Err(RegistryError::ValidationFailed {
                    reason: format!("{}: duplicate method '{}'", self.name, m.name),
                });
            }
        }
        Ok(())
    }
}

// ─── Registry ─────────────────────────────────────────────────────────────────

/// Read access to message and service schemas.
///
/// The codec holds an `Arc<dyn SchemaRegistry>` and resolves nested
/// message types through it while encoding and decoding.
pub trait SchemaRegistry: Send + Sync {
    /// Look up a message by fully-qualified name.
    fn message(&self, name: &str) -> Option<Arc<MessageSchema>>;

    /// Look up a service by fully-qualified name.
    fn service(&self, name: &str) -> Option<Arc<ServiceSchema>>;

    /// All message names, sorted.
    fn message_names(&self) -> Vec<String>;

    /// All service names, sorted.
    fn service_names(&self) -> Vec<String>;

    /// Resolve a type URL (`/cronos.MsgConvertVouchers` or
    /// `type.googleapis.com/cronos.MsgConvertVouchers`).
    fn message_by_type_url(&self, type_url: &str) -> Option<Arc<MessageSchema>> {
        let name = type_url.rsplit_once('/').map(|(_, n)| n).unwrap_or(type_url);
        self.message(name)
    }
}

/// Verify that every message-typed field and every method input/output
/// names a message the registry knows.
pub fn check_references(registry: &dyn SchemaRegistry) -> Result<(), RegistryError> {
    for name in registry.message_names() {
        let Some(schema) = registry.message(&name) else {
            continue;
        };
        for f in &schema.fields {
            if let FieldType::Message(target) = &f.ty {
                if registry.message(target).is_none() {
                    return Err(RegistryError::UnresolvedReference {
                        owner: format!("{}.{}", schema.name, f.name),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    for name in registry.service_names() {
        let Some(service) = registry.service(&name) else {
            continue;
        };
        for m in &service.methods {
            for target in [&m.input, &m.output] {
                if registry.message(target).is_none() {
                    return Err(RegistryError::UnresolvedReference {
                        owner: format!("{}/{}", service.name, m.name),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// An immutable, build-once registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    messages: HashMap<String, Arc<MessageSchema>>,
    services: HashMap<String, Arc<ServiceSchema>>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a message. Call [`SchemaSet::validate`] once built.
    pub fn with_message(mut self, schema: MessageSchema) -> Self {
        self.messages.insert(schema.name.clone(), Arc::new(schema));
        self
    }

    pub fn with_service(mut self, service: ServiceSchema) -> Self {
        self.services.insert(service.name.clone(), Arc::new(service));
        self
    }

    /// Validate every schema and resolve every reference.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for schema in self.messages.values() {
            schema.validate()?;
        }
        for service in self.services.values() {
            service.validate()?;
        }
        check_references(self)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl SchemaRegistry for SchemaSet {
    fn message(&self, name: &str) -> Option<Arc<MessageSchema>> {
        self.messages.get(name).cloned()
    }

    fn service(&self, name: &str) -> Option<Arc<ServiceSchema>> {
        self.services.get(name).cloned()
    }

    fn message_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.messages.keys().cloned().collect();
        names.sort();
        names
    }

    fn service_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.services.keys().cloned().collect();
        names.sort();
        names
    }
}
