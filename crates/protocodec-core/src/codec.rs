//! The binary record codec.
//!
//! [`Codec`] encodes [`Record`]s to the protobuf wire format and decodes
//! them back, resolving nested message types through a shared
//! [`SchemaRegistry`]. It holds no mutable state, so one instance can be
//! shared across threads behind an `Arc` or cloned cheaply.
//!
//! JSON conversion lives in [`crate::json`] and partial construction in
//! [`crate::partial`]; both are further `impl Codec` blocks.

use crate::config::{CodecConfig, JsonOptions};
use crate::error::CodecError;
use crate::numeric::IntegerStrategy;
use crate::schema::{Cardinality, FieldDef, FieldType, MessageSchema, ScalarType, SchemaRegistry};
use crate::value::{Record, Value};
use crate::wire::{zigzag_decode, zigzag_encode32, zigzag_encode64, WireReader, WireType, WireWriter};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Schema-driven encoder / decoder.
#[derive(Clone)]
pub struct Codec {
    registry: Arc<dyn SchemaRegistry>,
    integers: Arc<dyn IntegerStrategy>,
    config: CodecConfig,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("integers", &self.integers.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Codec {
    /// A codec with the default configuration (native integers, dense JSON).
    pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self::from_config(registry, CodecConfig::default())
    }

    pub fn from_config(registry: Arc<dyn SchemaRegistry>, config: CodecConfig) -> Self {
        Self {
            registry,
            integers: config.integers.strategy(),
            config,
        }
    }

    /// Replace the 64-bit integer strategy.
    pub fn with_integers(mut self, integers: Arc<dyn IntegerStrategy>) -> Self {
        self.integers = integers;
        self
    }

    pub fn with_json_options(mut self, json: JsonOptions) -> Self {
        self.config.json = json;
        self
    }

    pub fn registry(&self) -> &Arc<dyn SchemaRegistry> {
        &self.registry
    }

    pub fn integers(&self) -> &dyn IntegerStrategy {
        self.integers.as_ref()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Resolve a message schema by fully-qualified name.
    pub fn schema(&self, type_name: &str) -> Result<Arc<MessageSchema>, CodecError> {
        self.registry
            .message(type_name)
            .ok_or_else(|| CodecError::SchemaNotFound {
                name: type_name.to_string(),
            })
    }

    /// The all-defaults record of `type_name`.
    pub fn default_record(&self, type_name: &str) -> Result<Record, CodecError> {
        Ok(self.schema(type_name)?.default_record())
    }

    // ── Encode ────────────────────────────────────────────────────────────────

    /// Encode `record` using the schema named by its type.
    ///
    /// Fields are written in schema declaration order. Singular scalars
    /// equal to their default are omitted.
    pub fn encode(&self, record: &Record) -> Result<Bytes, CodecError> {
        let mut w = WireWriter::new();
        self.encode_to(record, &mut w)?;
        Ok(w.finish())
    }

    /// Append the encoding of `record` to an existing writer.
    pub fn encode_to(&self, record: &Record, w: &mut WireWriter) -> Result<(), CodecError> {
        let schema = self.schema(record.type_name())?;
        self.encode_record(&schema, record, w, "")
    }

    /// Encode with a varint length prefix.
    pub fn encode_delimited(&self, record: &Record) -> Result<Bytes, CodecError> {
        let body = self.encode(record)?;
        let mut w = WireWriter::with_capacity(body.len() + 5);
        w.bytes(&body);
        Ok(w.finish())
    }

    fn encode_record(
        &self,
        schema: &MessageSchema,
        record: &Record,
        w: &mut WireWriter,
        path: &str,
    ) -> Result<(), CodecError> {
        if record.type_name() != schema.name {
            return Err(CodecError::TypeMismatch {
                field: display_path(path, &schema.name),
                expected: schema.name.clone(),
                got: record.type_name().to_string(),
            });
        }

        for field in &schema.fields {
            let Some(value) = record.get(&field.name) else {
                continue;
            };
            match field.cardinality {
                Cardinality::Repeated => {
                    let Value::List(items) = value else {
                        return Err(mismatch(path, field, "list", value));
                    };
                    if items.is_empty() {
                        continue;
                    }
                    if let (true, FieldType::Scalar(ty)) = (field.is_packed(), &field.ty) {
                        let mut packed = WireWriter::new();
                        for item in items {
                            self.write_scalar(*ty, item, &mut packed)
                                .map_err(|e| e.in_field(&join_path(path, &field.name)))?
                                .ok_or_else(|| mismatch(path, field, ty.name(), item))?;
                        }
                        w.key(field.tag, WireType::LengthDelimited)
                            .bytes(packed.as_slice());
                    } else {
                        for item in items {
                            self.write_element(field, item, w, path)?;
                        }
                    }
                }
                Cardinality::Singular => {
                    if let FieldType::Scalar(ty) = field.ty {
                        if !value.matches_scalar(ty) {
                            return Err(mismatch(path, field, ty.name(), value));
                        }
                        if value.is_default() {
                            continue;
                        }
                    }
                    self.write_element(field, value, w, path)?;
                }
                Cardinality::Optional => self.write_element(field, value, w, path)?,
            }
        }
        Ok(())
    }

    /// Write one key + payload for a non-packed element.
    fn write_element(
        &self,
        field: &FieldDef,
        value: &Value,
        w: &mut WireWriter,
        path: &str,
    ) -> Result<(), CodecError> {
        match &field.ty {
            FieldType::Scalar(ty) => {
                if !value.matches_scalar(*ty) {
                    return Err(mismatch(path, field, ty.name(), value));
                }
                w.key(field.tag, ty.wire_type());
                self.write_scalar(*ty, value, w)
                    .map_err(|e| e.in_field(&join_path(path, &field.name)))?;
                Ok(())
            }
            FieldType::Message(type_name) => {
                let Value::Message(child) = value else {
                    return Err(mismatch(path, field, type_name, value));
                };
                let child_schema = self.schema(type_name)?;
                let mut inner = WireWriter::new();
                self.encode_record(&child_schema, child, &mut inner, &join_path(path, &field.name))?;
                w.key(field.tag, WireType::LengthDelimited)
                    .bytes(inner.as_slice());
                Ok(())
            }
        }
    }

    /// Write a scalar payload (no key). `Ok(None)` means the value does not
    /// have the shape of `ty`.
    fn write_scalar(
        &self,
        ty: ScalarType,
        value: &Value,
        w: &mut WireWriter,
    ) -> Result<Option<()>, CodecError> {
        let ints = self.integers.as_ref();
        match (ty, value) {
            (ScalarType::Double, Value::F64(v)) => w.fixed64(v.to_bits()),
            (ScalarType::Float, Value::F32(v)) => w.fixed32(v.to_bits()),
            // Negative int32 values are sign-extended to ten bytes.
            (ScalarType::Int32, Value::I32(v)) => w.varint(i64::from(*v) as u64),
            (ScalarType::Int64, Value::I64(v)) => w.varint(ints.check_signed("", *v)? as u64),
            (ScalarType::Uint32, Value::U32(v)) => w.varint(u64::from(*v)),
            (ScalarType::Uint64, Value::U64(v)) => w.varint(ints.check_unsigned("", *v)?),
            (ScalarType::Sint32, Value::I32(v)) => w.varint(u64::from(zigzag_encode32(*v))),
            (ScalarType::Sint64, Value::I64(v)) => {
                w.varint(zigzag_encode64(ints.check_signed("", *v)?))
            }
            (ScalarType::Fixed32, Value::U32(v)) => w.fixed32(*v),
            (ScalarType::Fixed64, Value::U64(v)) => w.fixed64(ints.check_unsigned("", *v)?),
            (ScalarType::Sfixed32, Value::I32(v)) => w.fixed32(*v as u32),
            (ScalarType::Sfixed64, Value::I64(v)) => w.fixed64(ints.check_signed("", *v)? as u64),
            (ScalarType::Bool, Value::Bool(v)) => w.varint(u64::from(*v)),
            (ScalarType::String, Value::String(s)) => w.bytes(s.as_bytes()),
            (ScalarType::Bytes, Value::Bytes(b)) => w.bytes(b),
            _ => return Ok(None),
        };
        Ok(Some(()))
    }

    // ── Decode ────────────────────────────────────────────────────────────────

    /// Decode a whole buffer as one `type_name` record.
    pub fn decode(&self, type_name: &str, bytes: &[u8]) -> Result<Record, CodecError> {
        let mut reader = WireReader::new(bytes);
        self.decode_length(type_name, &mut reader, None)
    }

    /// Decode the next `length` bytes of `reader` (or everything left when
    /// `length` is `None`) as one record.
    pub fn decode_length(
        &self,
        type_name: &str,
        reader: &mut WireReader<'_>,
        length: Option<usize>,
    ) -> Result<Record, CodecError> {
        let schema = self.schema(type_name)?;
        let len = length.unwrap_or_else(|| reader.remaining());
        let mut sub = reader.take(len)?;
        let record = self.decode_record(&schema, &mut sub, 0, "")?;
        trace!(type_name, bytes = len, "decoded record");
        Ok(record)
    }

    /// Decode one varint-length-prefixed record and advance `reader` past it.
    pub fn decode_delimited(
        &self,
        type_name: &str,
        reader: &mut WireReader<'_>,
    ) -> Result<Record, CodecError> {
        let schema = self.schema(type_name)?;
        let mut sub = reader.take_length_delimited()?;
        self.decode_record(&schema, &mut sub, 0, "")
    }

    fn decode_record(
        &self,
        schema: &MessageSchema,
        r: &mut WireReader<'_>,
        depth: usize,
        path: &str,
    ) -> Result<Record, CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::malformed(
                r.offset(),
                format!("message nesting exceeds {} levels", self.config.max_depth),
            ));
        }

        let mut record = schema.default_record();
        while !r.is_eof() {
            let key_offset = r.offset();
            let (tag, wire_type) = r.read_key()?;
            let Some(field) = schema.field_by_tag(tag) else {
                trace!(schema = %schema.name, tag, %wire_type, "skipping unknown field");
                r.skip(wire_type, tag)?;
                continue;
            };

            let slot = record.slot_mut(&field.name)?;
            match (&field.ty, field.cardinality) {
                (FieldType::Scalar(ty), Cardinality::Repeated) => {
                    let mut items = match slot.take() {
                        Some(Value::List(items)) => items,
                        _ => Vec::new(),
                    };
                    if wire_type == WireType::LengthDelimited && ty.is_packable() {
                        let mut packed = r.take_length_delimited()?;
                        while !packed.is_eof() {
                            items.push(self.read_scalar(*ty, &mut packed, path, field)?);
                        }
                    } else {
                        expect_wire_type(field, *ty, wire_type, key_offset)?;
                        items.push(self.read_scalar(*ty, r, path, field)?);
                    }
                    *slot = Some(Value::List(items));
                }
                (FieldType::Scalar(ty), _) => {
                    expect_wire_type(field, *ty, wire_type, key_offset)?;
                    *slot = Some(self.read_scalar(*ty, r, path, field)?);
                }
                (FieldType::Message(type_name), cardinality) => {
                    if wire_type != WireType::LengthDelimited {
                        return Err(wrong_wire_type(field, WireType::LengthDelimited, wire_type, key_offset));
                    }
                    let child_schema = self.schema(type_name)?;
                    let mut sub = r.take_length_delimited()?;
                    let child = self.decode_record(
                        &child_schema,
                        &mut sub,
                        depth + 1,
                        &join_path(path, &field.name),
                    )?;
                    let child = Value::Message(Box::new(child));
                    if cardinality == Cardinality::Repeated {
                        let mut items = match slot.take() {
                            Some(Value::List(items)) => items,
                            _ => Vec::new(),
                        };
                        items.push(child);
                        *slot = Some(Value::List(items));
                    } else {
                        *slot = Some(child);
                    }
                }
            }
        }
        Ok(record)
    }

    fn read_scalar(
        &self,
        ty: ScalarType,
        r: &mut WireReader<'_>,
        path: &str,
        field: &FieldDef,
    ) -> Result<Value, CodecError> {
        self.read_scalar_payload(ty, r, path, field)
            .map_err(|e| e.in_field(&join_path(path, &field.name)))
    }

    fn read_scalar_payload(
        &self,
        ty: ScalarType,
        r: &mut WireReader<'_>,
        path: &str,
        field: &FieldDef,
    ) -> Result<Value, CodecError> {
        let start = r.offset();
        let ints = self.integers.as_ref();
        let overflow = |raw: &dyn fmt::Display, target: &str| {
            CodecError::overflow(join_path(path, &field.name), raw.to_string(), target)
        };
        let value = match ty {
            ScalarType::Double => Value::F64(f64::from_bits(r.read_fixed64()?)),
            ScalarType::Float => Value::F32(f32::from_bits(r.read_fixed32()?)),
            ScalarType::Int32 => {
                let raw = r.read_varint()?;
                let v = i32::try_from(raw as i64).map_err(|_| overflow(&raw, "int32"))?;
                Value::I32(v)
            }
            ScalarType::Int64 => Value::I64(ints.check_signed("", r.read_varint()? as i64)?),
            ScalarType::Uint32 => {
                let raw = r.read_varint()?;
                Value::U32(u32::try_from(raw).map_err(|_| overflow(&raw, "uint32"))?)
            }
            ScalarType::Uint64 => Value::U64(ints.check_unsigned("", r.read_varint()?)?),
            ScalarType::Sint32 => {
                let v = zigzag_decode(r.read_varint()?);
                Value::I32(i32::try_from(v).map_err(|_| overflow(&v, "sint32"))?)
            }
            ScalarType::Sint64 => Value::I64(ints.check_signed("", zigzag_decode(r.read_varint()?))?),
            ScalarType::Fixed32 => Value::U32(r.read_fixed32()?),
            ScalarType::Fixed64 => Value::U64(ints.check_unsigned("", r.read_fixed64()?)?),
            ScalarType::Sfixed32 => Value::I32(r.read_fixed32()? as i32),
            ScalarType::Sfixed64 => Value::I64(ints.check_signed("", r.read_fixed64()? as i64)?),
            ScalarType::Bool => Value::Bool(r.read_varint()? != 0),
            ScalarType::String => {
                let bytes = r.read_length_delimited()?;
                let s = std::str::from_utf8(bytes).map_err(|e| {
                    CodecError::malformed(
                        start,
                        format!("invalid UTF-8 in '{}': {e}", join_path(path, &field.name)),
                    )
                })?;
                Value::String(s.to_string())
            }
            ScalarType::Bytes => Value::Bytes(r.read_length_delimited()?.to_vec()),
        };
        Ok(value)
    }
}

impl Codec {
    /// Apply the integer strategy to a 64-bit value entering a record.
    pub(crate) fn check_integer(&self, value: &Value, path: &str) -> Result<(), CodecError> {
        match value {
            Value::I64(v) => self.integers.check_signed(path, *v).map(|_| ()),
            Value::U64(v) => self.integers.check_unsigned(path, *v).map(|_| ()),
            _ => Ok(()),
        }
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn display_path(path: &str, fallback: &str) -> String {
    if path.is_empty() {
        fallback.to_string()
    } else {
        path.to_string()
    }
}

fn mismatch(path: &str, field: &FieldDef, expected: &str, got: &Value) -> CodecError {
    CodecError::TypeMismatch {
        field: join_path(path, &field.name),
        expected: expected.to_string(),
        got: got.type_name().to_string(),
    }
}

fn expect_wire_type(
    field: &FieldDef,
    ty: ScalarType,
    got: WireType,
    offset: usize,
) -> Result<(), CodecError> {
    if got == ty.wire_type() {
        Ok(())
    } else {
        Err(wrong_wire_type(field, ty.wire_type(), got, offset))
    }
}

fn wrong_wire_type(field: &FieldDef, expected: WireType, got: WireType, offset: usize) -> CodecError {
    CodecError::malformed(
        offset,
        format!(
            "field '{}' (tag {}) expects wire type {expected}, got {got}",
            field.name, field.tag
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::numeric::SafeIntegers;
    use crate::schema::{FieldDef, SchemaSet};

    fn registry() -> Arc<dyn SchemaRegistry> {
        let set = SchemaSet::new()
            .with_message(
                MessageSchema::new("cronos.TokenMapping")
                    .with_field(FieldDef::scalar("denom", 1, ScalarType::String))
                    .with_field(FieldDef::scalar("contract", 2, ScalarType::String)),
            )
            .with_message(
                MessageSchema::new("cosmos.base.v1beta1.Coin")
                    .with_field(FieldDef::scalar("denom", 1, ScalarType::String))
                    .with_field(FieldDef::scalar("amount", 2, ScalarType::String)),
            )
            .with_message(
                MessageSchema::new("cronos.MsgConvertVouchers")
                    .with_field(FieldDef::scalar("address", 1, ScalarType::String))
                    .with_field(FieldDef::message("coins", 2, "cosmos.base.v1beta1.Coin").repeated()),
            )
            .with_message(
                MessageSchema::new("test.Numbers")
                    .with_field(FieldDef::scalar("i32", 1, ScalarType::Int32))
                    .with_field(FieldDef::scalar("u64", 2, ScalarType::Uint64))
                    .with_field(FieldDef::scalar("s64", 3, ScalarType::Sint64))
                    .with_field(FieldDef::scalar("f64", 4, ScalarType::Double))
                    .with_field(FieldDef::scalar("ids", 5, ScalarType::Uint32).repeated())
                    .with_field(FieldDef::scalar("u32", 6, ScalarType::Uint32))
                    .with_field(FieldDef::scalar("flag", 7, ScalarType::Bool).optional()),
            )
            .with_message(
                MessageSchema::new("test.Node")
                    .with_field(FieldDef::scalar("id", 1, ScalarType::Uint32))
                    .with_field(FieldDef::message("next", 2, "test.Node")),
            );
        set.validate().unwrap();
        Arc::new(set)
    }

    fn codec() -> Codec {
        Codec::new(registry())
    }

    fn coin(denom: &str, amount: &str) -> Record {
        codec()
            .default_record("cosmos.base.v1beta1.Coin")
            .unwrap()
            .with("denom", denom)
            .unwrap()
            .with("amount", amount)
            .unwrap()
    }

    #[test]
    fn token_mapping_bytes() {
        let c = codec();
        let r = c
            .default_record("cronos.TokenMapping")
            .unwrap()
            .with("denom", "basecro")
            .unwrap()
            .with("contract", "0xAbC123")
            .unwrap();
        let bytes = c.encode(&r).unwrap();
        let mut expected = vec![0x0a, 0x07];
        expected.extend_from_slice(b"basecro");
        expected.extend_from_slice(&[0x12, 0x08]);
        expected.extend_from_slice(b"0xAbC123");
        assert_eq!(bytes.as_ref(), expected.as_slice());
        assert_eq!(c.decode("cronos.TokenMapping", &bytes).unwrap(), r);
    }

    #[test]
    fn nested_repeated_messages_keep_order() {
        let c = codec();
        let coins = vec![Value::from(coin("basecro", "1")), Value::from(coin("stake", "2"))];
        let msg = c
            .default_record("cronos.MsgConvertVouchers")
            .unwrap()
            .with("address", "crc1xyz")
            .unwrap()
            .with("coins", coins)
            .unwrap();
        let decoded = c
            .decode("cronos.MsgConvertVouchers", &c.encode(&msg).unwrap())
            .unwrap();
        assert_eq!(decoded, msg);
        let list = decoded.get("coins").and_then(Value::as_list).unwrap();
        assert_eq!(list[1].as_message().unwrap().get("denom").unwrap().as_str(), Some("stake"));
    }

    #[test]
    fn negative_int32_is_ten_bytes_and_round_trips() {
        let c = codec();
        let r = c.default_record("test.Numbers").unwrap().with("i32", -1i32).unwrap();
        let bytes = c.encode(&r).unwrap();
        assert_eq!(bytes.len(), 11);
        assert_eq!(c.decode("test.Numbers", &bytes).unwrap(), r);
    }

    #[test]
    fn nan_and_negative_zero_round_trip() {
        let c = codec();
        let nan = c.default_record("test.Numbers").unwrap().with("f64", f64::NAN).unwrap();
        let bytes = c.encode(&nan).unwrap();
        assert_eq!(bytes.as_ref(), &[0x21, 0, 0, 0, 0, 0, 0, 0xf8, 0x7f]);
        assert_eq!(c.decode("test.Numbers", &bytes).unwrap(), nan);
        assert_eq!(c.from_json("test.Numbers", &c.to_json(&nan).unwrap()).unwrap(), nan);

        let neg_zero = c.default_record("test.Numbers").unwrap().with("f64", -0.0f64).unwrap();
        let bytes = c.encode(&neg_zero).unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(c.decode("test.Numbers", &bytes).unwrap(), neg_zero);
    }

    #[test]
    fn packed_and_unpacked_both_decode() {
        let c = codec();
        // packed: tag 5, LEN 3, values 1 2 3
        let packed = [0x2a, 0x03, 0x01, 0x02, 0x03];
        // unpacked: three tag-5 varints
        let unpacked = [0x28, 0x01, 0x28, 0x02, 0x28, 0x03];
        let a = c.decode("test.Numbers", &packed).unwrap();
        let b = c.decode("test.Numbers", &unpacked).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.get("ids"),
            Some(&Value::List(vec![Value::U32(1), Value::U32(2), Value::U32(3)]))
        );
        // encoder prefers packed
        assert_eq!(c.encode(&a).unwrap().as_ref(), &packed);
    }

    #[test]
    fn last_scalar_occurrence_wins() {
        let c = codec();
        let bytes = [0x30, 0x01, 0x30, 0x07];
        let r = c.decode("test.Numbers", &bytes).unwrap();
        assert_eq!(r.get("u32"), Some(&Value::U32(7)));
    }

    #[test]
    fn optional_scalar_keeps_explicit_default() {
        let c = codec();
        let r = c.default_record("test.Numbers").unwrap();
        assert!(r.get("flag").is_none());
        assert!(c.encode(&r).unwrap().is_empty());

        let set = r.with("flag", false).unwrap();
        let bytes = c.encode(&set).unwrap();
        assert_eq!(bytes.as_ref(), &[0x38, 0x00]);
        assert_eq!(c.decode("test.Numbers", &bytes).unwrap().get("flag"), Some(&Value::Bool(false)));
    }

    #[test]
    fn uint32_overflow_is_distinct_from_malformed() {
        let c = codec();
        // tag 6 varint 2^32
        let bytes = [0x30, 0x80, 0x80, 0x80, 0x80, 0x10];
        let err = c.decode("test.Numbers", &bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert!(err.to_string().contains("u32"));

        let truncated = [0x30, 0x80];
        assert_eq!(
            c.decode("test.Numbers", &truncated).unwrap_err().kind(),
            ErrorKind::MalformedInput
        );
    }

    #[test]
    fn safe_integers_reject_large_uint64() {
        let c = codec().with_integers(Arc::new(SafeIntegers));
        let mut w = WireWriter::new();
        w.key(2, WireType::Varint).varint(1 << 53);
        let err = c.decode("test.Numbers", w.as_slice()).unwrap_err();
        assert!(err.is_overflow());
        assert!(err.to_string().contains("u64"));

        let r = c.default_record("test.Numbers").unwrap().with("u64", 1u64 << 60).unwrap();
        assert!(c.encode(&r).unwrap_err().is_overflow());
        assert!(codec().encode(&r).is_ok());
    }

    #[test]
    fn wrong_wire_type_on_known_field_is_malformed() {
        let c = codec();
        // tag 1 (denom, string) sent as varint
        let err = c.decode("cronos.TokenMapping", &[0x08, 0x01]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = codec()
            .decode("cronos.TokenMapping", &[0x0a, 0x02, 0xc3, 0x28])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn encode_type_mismatch() {
        let c = codec();
        let r = c.default_record("test.Numbers").unwrap().with("u64", "many").unwrap();
        let err = c.encode(&r).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
    }

    #[test]
    fn depth_limit() {
        let cfg = CodecConfig {
            max_depth: 3,
            ..CodecConfig::default()
        };
        let c = Codec::from_config(registry(), cfg);
        let mut node = c.default_record("test.Node").unwrap().with("id", 1u32).unwrap();
        for id in 2..=6u32 {
            node = c
                .default_record("test.Node")
                .unwrap()
                .with("id", id)
                .unwrap()
                .with("next", node)
                .unwrap();
        }
        let bytes = codec().encode(&node).unwrap();
        assert!(codec().decode("test.Node", &bytes).is_ok());
        assert_eq!(c.decode("test.Node", &bytes).unwrap_err().kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn delimited_stream() {
        let c = codec();
        let a = coin("basecro", "10");
        let b = coin("stake", "20");
        let mut stream = c.encode_delimited(&a).unwrap().to_vec();
        stream.extend_from_slice(&c.encode_delimited(&b).unwrap());
        let mut reader = WireReader::new(&stream);
        assert_eq!(c.decode_delimited("cosmos.base.v1beta1.Coin", &mut reader).unwrap(), a);
        assert_eq!(c.decode_delimited("cosmos.base.v1beta1.Coin", &mut reader).unwrap(), b);
        assert!(reader.is_eof());
    }

    #[test]
    fn decode_with_explicit_length() {
        let c = codec();
        let bytes = c.encode(&coin("basecro", "5")).unwrap();
        let mut trailing = bytes.to_vec();
        trailing.extend_from_slice(&[0xff, 0xff]);
        let mut reader = WireReader::new(&trailing);
        let r = c
            .decode_length("cosmos.base.v1beta1.Coin", &mut reader, Some(bytes.len()))
            .unwrap();
        assert_eq!(r, coin("basecro", "5"));
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn unknown_schema() {
        assert_eq!(
            codec().decode("cronos.Nope", &[]).unwrap_err().kind(),
            ErrorKind::UnknownSchema
        );
    }
}
