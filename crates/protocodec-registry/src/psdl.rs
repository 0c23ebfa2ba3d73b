//! PSDL (ProtoCodec Schema Definition Language) parser.
//!
//! PSDL is a YAML-based DSL for declaring protobuf message and service
//! schemas. This parser converts raw YAML text into `protocodec_core`
//! [`MessageSchema`] and [`ServiceSchema`] values.
//!
//! A single `.psdl` file may contain multiple documents separated by
//! `---`. Each document has one top-level key, either `message <Name>` or
//! `service <Name>`:
//!
//! ```yaml
//! message cronos.TokenMapping:
//!   fields:
//!     denom:    { tag: 1, type: string }
//!     contract: { tag: 2, type: string }
//! ---
//! service cronos.Query:
//!   methods:
//!     ContractByDenom: { input: cronos.ContractByDenomRequest, output: cronos.ContractByDenomResponse }
//! ```
//!
//! Field types are scalar names (`uint64`, `bytes`, ...), fully-qualified
//! message names, or either of those with a `[]` suffix for repeated fields.
//!
//! Every parsed definition is validated (tags, names, duplicate methods)
//! before it is returned.

use indexmap::IndexMap;
use protocodec_core::{
    error::RegistryError,
    schema::{FieldDef, FieldType, MessageSchema, MethodDef, ScalarType, ServiceSchema},
};
use serde::Deserialize;

// ─── Raw PSDL serde types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageRaw {
    #[serde(default)]
    description: Option<String>,
    // IndexMap preserves YAML insertion order, which becomes declaration
    // order and therefore encode order.
    #[serde(default)]
    fields: IndexMap<String, FieldRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldRaw {
    tag: u32,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    packed: Option<bool>,
    #[serde(default)]
    json_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceRaw {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    methods: IndexMap<String, MethodRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodRaw {
    input: String,
    output: String,
}

// ─── Parser ───────────────────────────────────────────────────────────────────

/// One parsed PSDL document.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Message(MessageSchema),
    Service(ServiceSchema),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Message(m) => &m.name,
            Definition::Service(s) => &s.name,
        }
    }
}

pub struct PsdlParser;

impl PsdlParser {
    /// Parse the first document from a PSDL YAML string.
    pub fn parse(yaml: &str) -> Result<Definition, RegistryError> {
        Self::parse_all(yaml)?
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::ParseError("empty PSDL file".into()))
    }

    /// Parse every document from a PSDL YAML string, in file order.
    pub fn parse_all(yaml: &str) -> Result<Vec<Definition>, RegistryError> {
        use serde::de::Deserialize as _;

        let mut defs = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            let value = serde_yaml::Value::deserialize(doc)
                .map_err(|e| RegistryError::ParseError(e.to_string()))?;
            // Skip null/empty documents (e.g. trailing `---`)
            if value.is_null() {
                continue;
            }
            defs.push(Self::parse_value(value)?);
        }
        Ok(defs)
    }

    /// Parse only the message documents of a PSDL string.
    pub fn parse_messages(yaml: &str) -> Result<Vec<MessageSchema>, RegistryError> {
        Ok(Self::parse_all(yaml)?
            .into_iter()
            .filter_map(|d| match d {
                Definition::Message(m) => Some(m),
                Definition::Service(_) => None,
            })
            .collect())
    }

    fn parse_value(value: serde_yaml::Value) -> Result<Definition, RegistryError> {
        let serde_yaml::Value::Mapping(mapping) = value else {
            return Err(RegistryError::ParseError(
                "PSDL document must be a YAML mapping".into(),
            ));
        };
        if mapping.len() != 1 {
            return Err(RegistryError::ParseError(format!(
                "PSDL document must have exactly one top-level key, found {}",
                mapping.len()
            )));
        }
        let Some((key, body)) = mapping.into_iter().next() else {
            return Err(RegistryError::ParseError("empty PSDL document".into()));
        };
        let key = key
            .as_str()
            .ok_or_else(|| RegistryError::ParseError("top-level key must be a string".into()))?
            .to_string();

        if let Some(name) = key.strip_prefix("message ") {
            let name = checked_name(name)?;
            let raw: MessageRaw = serde_yaml::from_value(body)
                .map_err(|e| RegistryError::ParseError(format!("message {name}: {e}")))?;
            Ok(Definition::Message(build_message(name, raw)?))
        } else if let Some(name) = key.strip_prefix("service ") {
            let name = checked_name(name)?;
            let raw: ServiceRaw = serde_yaml::from_value(body)
                .map_err(|e| RegistryError::ParseError(format!("service {name}: {e}")))?;
            Ok(Definition::Service(build_service(name, raw)?))
        } else {
            Err(RegistryError::ParseError(format!(
                "expected 'message <Name>' or 'service <Name>', got '{key}'"
            )))
        }
    }
}

fn build_message(name: String, raw: MessageRaw) -> Result<MessageSchema, RegistryError> {
    let mut schema = MessageSchema::new(name);
    schema.description = raw.description;
    for (field_name, f) in raw.fields {
        let (ty, repeated) = parse_type(&f.ty).map_err(|e| {
            RegistryError::ParseError(format!("{}.{field_name}: {e}", schema.name))
        })?;
        let mut def = FieldDef::new(field_name, f.tag, ty);
        if repeated {
            def = def.repeated();
        } else if f.optional {
            def = def.optional();
        }
        if f.packed == Some(false) {
            def = def.unpacked();
        }
        if let Some(json_name) = f.json_name {
            def = def.with_json_name(json_name);
        }
        def.description = f.description;
        schema.fields.push(def);
    }
    schema.validate()?;
    Ok(schema)
}

fn build_service(name: String, raw: ServiceRaw) -> Result<ServiceSchema, RegistryError> {
    let mut service = ServiceSchema::new(name);
    service.description = raw.description;
    for (method, m) in raw.methods {
        service = service.with_method(MethodDef::new(method, m.input, m.output));
    }
    service.validate()?;
    Ok(service)
}

fn checked_name(name: &str) -> Result<String, RegistryError> {
    let name = name.trim();
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(name.to_string())
    } else {
        Err(RegistryError::ParseError(format!("invalid type name '{name}'")))
    }
}

/// Parse a PSDL type string into a field type and a repeated flag.
fn parse_type(s: &str) -> Result<(FieldType, bool), String> {
    let s = s.trim();
    if let Some(inner) = s.strip_suffix("[]") {
        if inner.ends_with("[]") {
            return Err(format!("nested repeated type '{s}' is not supported"));
        }
        let (ty, _) = parse_type(inner)?;
        return Ok((ty, true));
    }
    if let Some(scalar) = ScalarType::from_name(s) {
        return Ok((FieldType::Scalar(scalar), false));
    }
    match checked_name(s) {
        Ok(name) if name.contains('.') => Ok((FieldType::Message(name), false)),
        _ => Err(format!("unknown type: '{s}'")),
    }
}
