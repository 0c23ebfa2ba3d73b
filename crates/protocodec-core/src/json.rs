//! JSON conversion for records.
//!
//! Conventions:
//! - keys are each field's `json_name`; input also accepts the declared name
//! - dense output by default, sparse with `JsonOptions::emit_defaults = false`;
//!   absent optionals are always omitted
//! - bytes as standard base64 (input may also be unpadded or URL-safe), 64-bit integers as numbers unless
//!   `int64_as_string` is set, non-finite floats as `"NaN"` / `"Infinity"`
//! - `null` or a missing key means "use the default"; unknown keys are ignored

use crate::codec::{join_path, Codec};
use crate::error::CodecError;
use crate::schema::{Cardinality, FieldDef, FieldType, MessageSchema, ScalarType};
use crate::value::{Record, Value};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde_json::{Map, Number, Value as JsonValue};

impl Codec {
    /// Convert a record to its JSON form.
    pub fn to_json(&self, record: &Record) -> Result<JsonValue, CodecError> {
        let schema = self.schema(record.type_name())?;
        self.record_to_json(&schema, record, "")
    }

    /// Build a record of `type_name` from a JSON object, coercing each value
    /// to its field's declared type.
    pub fn from_json(&self, type_name: &str, json: &JsonValue) -> Result<Record, CodecError> {
        let schema = self.schema(type_name)?;
        self.record_from_json(&schema, json, 0, "")
    }

    fn record_to_json(
        &self,
        schema: &MessageSchema,
        record: &Record,
        path: &str,
    ) -> Result<JsonValue, CodecError> {
        let emit_defaults = self.config().json.emit_defaults;
        let mut obj = Map::new();
        for field in &schema.fields {
            let Some(value) = record.get(&field.name) else {
                continue;
            };
            if !emit_defaults && field.cardinality != Cardinality::Optional && value.is_default() {
                continue;
            }
            let fpath = join_path(path, &field.name);
            let json = match value {
                Value::List(items) if field.is_repeated() => JsonValue::Array(
                    items
                        .iter()
                        .map(|item| self.element_to_json(field, item, &fpath))
                        .collect::<Result<_, _>>()?,
                ),
                other if field.is_repeated() => {
                    return Err(CodecError::TypeMismatch {
                        field: fpath,
                        expected: "list".into(),
                        got: other.type_name().to_string(),
                    });
                }
                other => self.element_to_json(field, other, &fpath)?,
            };
            obj.insert(field.json_name.clone(), json);
        }
        Ok(JsonValue::Object(obj))
    }

    fn element_to_json(
        &self,
        field: &FieldDef,
        value: &Value,
        path: &str,
    ) -> Result<JsonValue, CodecError> {
        match (&field.ty, value) {
            (FieldType::Message(type_name), Value::Message(child)) => {
                let schema = self.schema(type_name)?;
                self.record_to_json(&schema, child, path)
            }
            (FieldType::Scalar(ty), v) if v.matches_scalar(*ty) => Ok(self.scalar_to_json(v)),
            (ty, v) => Err(CodecError::TypeMismatch {
                field: path.to_string(),
                expected: ty.to_string(),
                got: v.type_name().to_string(),
            }),
        }
    }

    fn scalar_to_json(&self, value: &Value) -> JsonValue {
        let int64_as_string = self.config().json.int64_as_string;
        match value {
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::I32(v) => JsonValue::from(*v),
            Value::U32(v) => JsonValue::from(*v),
            Value::I64(v) if int64_as_string => JsonValue::String(v.to_string()),
            Value::U64(v) if int64_as_string => JsonValue::String(v.to_string()),
            Value::I64(v) => JsonValue::from(*v),
            Value::U64(v) => JsonValue::from(*v),
            Value::F32(v) => float_to_json(f64::from(*v)),
            Value::F64(v) => float_to_json(*v),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bytes(b) => JsonValue::String(STANDARD.encode(b)),
            Value::Message(_) | Value::List(_) => JsonValue::Null,
        }
    }

    fn record_from_json(
        &self,
        schema: &MessageSchema,
        json: &JsonValue,
        depth: usize,
        path: &str,
    ) -> Result<Record, CodecError> {
        let max_depth = self.config().max_depth;
        if depth > max_depth {
            return Err(coercion(path, &format!("at most {max_depth} nested objects"), json));
        }
        let JsonValue::Object(obj) = json else {
            return Err(coercion(display(path, &schema.name), "object", json));
        };

        let mut record = schema.default_record();
        for field in &schema.fields {
            let raw = obj.get(&field.json_name).or_else(|| obj.get(&field.name));
            let Some(raw) = raw.filter(|v| !v.is_null()) else {
                continue;
            };
            let fpath = join_path(path, &field.name);
            let value = if field.is_repeated() {
                let JsonValue::Array(items) = raw else {
                    return Err(coercion(&fpath, "array", raw));
                };
                Value::List(
                    items
                        .iter()
                        .map(|item| self.element_from_json(field, item, depth, &fpath))
                        .collect::<Result<_, _>>()?,
                )
            } else {
                self.element_from_json(field, raw, depth, &fpath)?
            };
            *record.slot_mut(&field.name)? = Some(value);
        }
        Ok(record)
    }

    fn element_from_json(
        &self,
        field: &FieldDef,
        json: &JsonValue,
        depth: usize,
        path: &str,
    ) -> Result<Value, CodecError> {
        match &field.ty {
            FieldType::Message(type_name) => {
                let schema = self.schema(type_name)?;
                let child = self.record_from_json(&schema, json, depth + 1, path)?;
                Ok(Value::Message(Box::new(child)))
            }
            FieldType::Scalar(ty) => self.scalar_from_json(*ty, json, path),
        }
    }

    fn scalar_from_json(
        &self,
        ty: ScalarType,
        json: &JsonValue,
        path: &str,
    ) -> Result<Value, CodecError> {
        let ints = self.integers();
        let value = match ty {
            ScalarType::String => match json {
                JsonValue::String(s) => Value::String(s.clone()),
                JsonValue::Number(n) => Value::String(n.to_string()),
                JsonValue::Bool(b) => Value::String(b.to_string()),
                _ => return Err(coercion(path, "string", json)),
            },
            ScalarType::Bool => match json {
                JsonValue::Bool(b) => Value::Bool(*b),
                JsonValue::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
                JsonValue::String(s) if s == "true" => Value::Bool(true),
                JsonValue::String(s) if s == "false" => Value::Bool(false),
                _ => return Err(coercion(path, "bool", json)),
            },
            ScalarType::Bytes => match json {
                JsonValue::String(s) => Value::Bytes(
                    STANDARD
                        .decode(s)
                        .or_else(|_| STANDARD_NO_PAD.decode(s))
                        .or_else(|_| URL_SAFE.decode(s))
                        .or_else(|_| URL_SAFE_NO_PAD.decode(s))
                        .map_err(|_| coercion(path, "base64 string", json))?,
                ),
                _ => return Err(coercion(path, "base64 string", json)),
            },
            ScalarType::Double => Value::F64(json_float(json, path, "double")?),
            ScalarType::Float => {
                let f = json_float(json, path, "float")?;
                if f.is_finite() && f.abs() > f64::from(f32::MAX) {
                    return Err(CodecError::overflow(path, f, "float"));
                }
                Value::F32(f as f32)
            }
            ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => {
                let n = json_integer(json, path, ty)?;
                Value::I32(i32::try_from(n).map_err(|_| CodecError::overflow(path, n, ty.name()))?)
            }
            ScalarType::Uint32 | ScalarType::Fixed32 => {
                let n = json_integer(json, path, ty)?;
                Value::U32(u32::try_from(n).map_err(|_| CodecError::overflow(path, n, ty.name()))?)
            }
            ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => {
                let n = json_integer(json, path, ty)?;
                let v = i64::try_from(n).map_err(|_| CodecError::overflow(path, n, ty.name()))?;
                Value::I64(ints.check_signed(path, v)?)
            }
            ScalarType::Uint64 | ScalarType::Fixed64 => {
                let n = json_integer(json, path, ty)?;
                let v = u64::try_from(n).map_err(|_| CodecError::overflow(path, n, ty.name()))?;
                Value::U64(ints.check_unsigned(path, v)?)
            }
        };
        Ok(value)
    }
}

fn float_to_json(v: f64) -> JsonValue {
    match Number::from_f64(v) {
        Some(n) => JsonValue::Number(n),
        None if v.is_nan() => JsonValue::String("NaN".into()),
        None if v > 0.0 => JsonValue::String("Infinity".into()),
        None => JsonValue::String("-Infinity".into()),
    }
}

fn json_float(json: &JsonValue, path: &str, expected: &str) -> Result<f64, CodecError> {
    match json {
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| coercion(path, expected, json)),
        JsonValue::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other.trim().parse::<f64>().map_err(|_| coercion(path, expected, json)),
        },
        _ => Err(coercion(path, expected, json)),
    }
}

/// An integral JSON number or decimal string, widened to `i128` so that
/// range checks happen against the target type rather than here.
fn json_integer(json: &JsonValue, path: &str, ty: ScalarType) -> Result<i128, CodecError> {
    match json {
        JsonValue::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(i128::from(v))
            } else if let Some(v) = n.as_u64() {
                Ok(i128::from(v))
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i128),
                    _ => Err(coercion(path, ty.name(), json)),
                }
            }
        }
        JsonValue::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| coercion(path, ty.name(), json)),
        _ => Err(coercion(path, ty.name(), json)),
    }
}

fn coercion(path: impl Into<String>, expected: &str, got: &JsonValue) -> CodecError {
    let got = match got {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => format!("bool {b}"),
        JsonValue::Number(n) => format!("number {n}"),
        JsonValue::String(s) => format!("string {s:?}"),
        JsonValue::Array(_) => "array".to_string(),
        JsonValue::Object(_) => "object".to_string(),
    };
    CodecError::TypeCoercion {
        field: path.into(),
        expected: expected.to_string(),
        got,
    }
}

fn display<'a>(path: &'a str, fallback: &'a str) -> &'a str {
    if path.is_empty() {
        fallback
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JsonOptions;
    use crate::error::ErrorKind;
    use crate::numeric::SafeIntegers;
    use crate::schema::{FieldDef, SchemaSet};
    use serde_json::json;
    use std::sync::Arc;

    fn codec() -> Codec {
        let set = SchemaSet::new()
            .with_message(
                MessageSchema::new("cronos.Params")
                    .with_field(FieldDef::scalar("ibc_cro_denom", 1, ScalarType::String))
                    .with_field(FieldDef::scalar("ibc_timeout", 2, ScalarType::Uint64))
                    .with_field(FieldDef::scalar("cronos_admin", 3, ScalarType::String))
                    .with_field(FieldDef::scalar("enable_auto_deployment", 4, ScalarType::Bool)),
            )
            .with_message(
                MessageSchema::new("test.Mixed")
                    .with_field(FieldDef::scalar("data", 1, ScalarType::Bytes))
                    .with_field(FieldDef::scalar("ratio", 2, ScalarType::Double))
                    .with_field(FieldDef::scalar("delta", 3, ScalarType::Sint32))
                    .with_field(FieldDef::scalar("topics", 4, ScalarType::String).repeated())
                    .with_field(FieldDef::message("params", 5, "cronos.Params")),
            );
        Codec::new(Arc::new(set))
    }

    #[test]
    fn dense_output_uses_json_names() {
        let c = codec();
        let r = c
            .default_record("cronos.Params")
            .unwrap()
            .with("ibc_cro_denom", "ibc/6B5A")
            .unwrap()
            .with("ibc_timeout", 86_400u64)
            .unwrap();
        assert_eq!(
            c.to_json(&r).unwrap(),
            json!({
                "ibcCroDenom": "ibc/6B5A",
                "ibcTimeout": 86400,
                "cronosAdmin": "",
                "enableAutoDeployment": false
            })
        );
    }

    #[test]
    fn sparse_output_omits_defaults() {
        let c = codec().with_json_options(JsonOptions::sparse());
        let r = c
            .default_record("cronos.Params")
            .unwrap()
            .with("enable_auto_deployment", true)
            .unwrap();
        let out = c.to_json(&r).unwrap();
        assert_eq!(out, json!({"enableAutoDeployment": true}));
        assert_eq!(c.from_json("cronos.Params", &out).unwrap(), r);
    }

    #[test]
    fn absent_nested_message_is_omitted() {
        let c = codec();
        let r = c.default_record("test.Mixed").unwrap();
        let out = c.to_json(&r).unwrap();
        assert!(out.get("params").is_none());
        assert_eq!(out["topics"], json!([]));
    }

    #[test]
    fn coercions() {
        let c = codec();
        let r = c
            .from_json(
                "test.Mixed",
                &json!({
                    "data": "AQID",
                    "ratio": "Infinity",
                    "delta": "-7",
                    "topics": ["a", 1, true],
                    "params": {"ibc_timeout": "42", "enableAutoDeployment": 1}
                }),
            )
            .unwrap();
        assert_eq!(r.get("data"), Some(&Value::Bytes(vec![1, 2, 3])));
        assert_eq!(r.get("ratio"), Some(&Value::F64(f64::INFINITY)));
        assert_eq!(r.get("delta"), Some(&Value::I32(-7)));
        assert_eq!(
            r.get("topics"),
            Some(&Value::List(vec!["a".into(), "1".into(), "true".into()]))
        );
        let params = r.get("params").and_then(Value::as_message).unwrap();
        assert_eq!(params.get("ibc_timeout"), Some(&Value::U64(42)));
        assert_eq!(params.get("enable_auto_deployment"), Some(&Value::Bool(true)));

        let back = c.to_json(&r).unwrap();
        assert_eq!(back["ratio"], json!("Infinity"));
        assert_eq!(back["data"], json!("AQID"));
    }

    #[test]
    fn unpadded_base64_accepted() {
        let c = codec();
        for input in ["AQI", "AQI=", "-_8", "-_8="] {
            let r = c.from_json("test.Mixed", &json!({ "data": input })).unwrap();
            let expected = if input.starts_with('-') { vec![0xfb, 0xff] } else { vec![1, 2] };
            assert_eq!(r.get("data"), Some(&Value::Bytes(expected)), "{input}");
        }
    }

    #[test]
    fn scalar_in_repeated_field_rejected() {
        let c = codec();
        let mut r = c.default_record("test.Mixed").unwrap();
        r.set("topics", "a").unwrap();
        let err = c.to_json(&r).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
        assert!(c.encode(&r).is_err());
    }

    #[test]
    fn null_means_default() {
        let c = codec();
        let r = c
            .from_json("cronos.Params", &json!({"ibcCroDenom": null}))
            .unwrap();
        assert_eq!(r, c.default_record("cronos.Params").unwrap());
    }

    #[test]
    fn coercion_failures() {
        let c = codec();
        let err = c
            .from_json("cronos.Params", &json!({"ibcTimeout": "soon"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);
        assert!(err.to_string().contains("ibc_timeout"));

        let err = c.from_json("cronos.Params", &json!({"ibcTimeout": 1.5})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);

        let err = c.from_json("test.Mixed", &json!({"topics": "a"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);

        let err = c.from_json("test.Mixed", &json!({"data": "@@"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);

        let err = c.from_json("cronos.Params", &json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);
    }

    #[test]
    fn integer_overflow_on_coercion() {
        let c = codec();
        let err = c.from_json("test.Mixed", &json!({"delta": 3_000_000_000u64})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);

        let safe = codec().with_integers(Arc::new(SafeIntegers));
        let big = json!({"ibcTimeout": "9007199254740992"});
        assert_eq!(safe.from_json("cronos.Params", &big).unwrap_err().kind(), ErrorKind::Overflow);
        assert!(c.from_json("cronos.Params", &big).is_ok());
    }

    #[test]
    fn int64_as_string_option() {
        let c = codec().with_json_options(JsonOptions {
            int64_as_string: true,
            ..JsonOptions::default()
        });
        let r = c
            .default_record("cronos.Params")
            .unwrap()
            .with("ibc_timeout", u64::MAX)
            .unwrap();
        let out = c.to_json(&r).unwrap();
        assert_eq!(out["ibcTimeout"], json!("18446744073709551615"));
        assert_eq!(c.from_json("cronos.Params", &out).unwrap(), r);
    }
}
