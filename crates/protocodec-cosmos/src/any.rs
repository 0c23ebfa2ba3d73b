//! `google.protobuf.Any` packing and unpacking.

use protocodec_core::{CodecError, Codec, Record, Value};

/// Fully-qualified name of the `Any` envelope.
pub const ANY_TYPE: &str = "google.protobuf.Any";

/// Encode `record` and wrap it in an `Any` whose `type_url` is
/// `"/" + record type`.
pub fn pack_any(codec: &Codec, record: &Record) -> Result<Record, CodecError> {
    let schema = codec.schema(record.type_name())?;
    let value = codec.encode(record)?;
    codec
        .default_record(ANY_TYPE)?
        .with("type_url", schema.type_url())?
        .with("value", value.to_vec())
}

/// Resolve the `type_url` of an `Any` record in the codec's registry and
/// decode its `value`.
pub fn unpack_any(codec: &Codec, any: &Record) -> Result<Record, CodecError> {
    if any.type_name() != ANY_TYPE {
        return Err(CodecError::TypeMismatch {
            field: String::new(),
            expected: ANY_TYPE.to_string(),
            got: any.type_name().to_string(),
        });
    }
    let type_url = any.get("type_url").and_then(Value::as_str).unwrap_or_default();
    let schema = codec
        .registry()
        .message_by_type_url(type_url)
        .ok_or_else(|| CodecError::SchemaNotFound {
            name: type_url.to_string(),
        })?;
    let value = any.get("value").and_then(Value::as_bytes).unwrap_or_default();
    codec.decode(&schema.name, value)
}

/// `type_url` of an `Any` record, if it is one.
pub fn any_type_url(any: &Record) -> Option<&str> {
    if any.type_name() != ANY_TYPE {
        return None;
    }
    any.get("type_url").and_then(Value::as_str)
}
