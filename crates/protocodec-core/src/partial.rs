//! Building records from partial, already-typed field sets.

use crate::codec::{join_path, Codec};
use crate::error::CodecError;
use crate::schema::{FieldDef, FieldType, MessageSchema};
use crate::value::{Record, Value};
use indexmap::IndexMap;

/// A possibly-incomplete set of field values, keyed by declared field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partial {
    fields: IndexMap<String, PartialValue>,
}

/// One entry of a [`Partial`].
#[derive(Debug, Clone, PartialEq)]
pub enum PartialValue {
    /// Same as leaving the field out.
    Null,
    Value(Value),
    /// Merged against the nested message's defaults.
    Message(Partial),
    List(Vec<PartialValue>),
}

impl Partial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<PartialValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<PartialValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&PartialValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PartialValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Value> for PartialValue {
    fn from(v: Value) -> Self {
        PartialValue::Value(v)
    }
}

impl From<Partial> for PartialValue {
    fn from(p: Partial) -> Self {
        PartialValue::Message(p)
    }
}

impl From<Record> for PartialValue {
    fn from(r: Record) -> Self {
        PartialValue::Value(Value::from(r))
    }
}

impl From<Vec<PartialValue>> for PartialValue {
    fn from(items: Vec<PartialValue>) -> Self {
        PartialValue::List(items)
    }
}

macro_rules! partial_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PartialValue {
                fn from(v: $ty) -> Self {
                    PartialValue::Value(Value::from(v))
                }
            }
        )*
    };
}

partial_from_scalar!(bool, i32, i64, u32, u64, f32, f64, String, &str, Vec<u8>);

impl Codec {
    /// Deep-merge `partial` over the defaults of `type_name`.
    ///
    /// Values are taken as-is but must match their field's type; undeclared
    /// keys are rejected.
    pub fn from_partial(&self, type_name: &str, partial: &Partial) -> Result<Record, CodecError> {
        let schema = self.schema(type_name)?;
        self.merge_partial(&schema, partial, "")
    }

    fn merge_partial(
        &self,
        schema: &MessageSchema,
        partial: &Partial,
        path: &str,
    ) -> Result<Record, CodecError> {
        if let Some((key, _)) = partial.iter().find(|(k, _)| schema.field(k).is_none()) {
            return Err(CodecError::UnknownField {
                schema: schema.name.clone(),
                field: key.to_string(),
            });
        }

        let mut record = schema.default_record();
        for field in &schema.fields {
            let Some(entry) = partial.get(&field.name) else {
                continue;
            };
            let fpath = join_path(path, &field.name);
            let value = match entry {
                PartialValue::Null => continue,
                PartialValue::List(items) if field.is_repeated() => Value::List(
                    items
                        .iter()
                        .map(|item| self.partial_element(field, item, &fpath))
                        .collect::<Result<_, _>>()?,
                ),
                PartialValue::Value(Value::List(items)) if field.is_repeated() => {
                    for item in items {
                        self.check_element(field, item, &fpath)?;
                    }
                    Value::List(items.clone())
                }
                other if field.is_repeated() => {
                    return Err(partial_mismatch(&fpath, "list", other));
                }
                other => self.partial_element(field, other, &fpath)?,
            };
            *record.slot_mut(&field.name)? = Some(value);
        }
        Ok(record)
    }

    fn partial_element(
        &self,
        field: &FieldDef,
        entry: &PartialValue,
        path: &str,
    ) -> Result<Value, CodecError> {
        match (&field.ty, entry) {
            (FieldType::Message(type_name), PartialValue::Message(nested)) => {
                let schema = self.schema(type_name)?;
                Ok(Value::Message(Box::new(self.merge_partial(&schema, nested, path)?)))
            }
            (_, PartialValue::Value(v)) => {
                self.check_element(field, v, path)?;
                Ok(v.clone())
            }
            (ty, other) => Err(partial_mismatch(path, &ty.to_string(), other)),
        }
    }

    /// Type-check one already-built element and apply the integer strategy.
    fn check_element(&self, field: &FieldDef, value: &Value, path: &str) -> Result<(), CodecError> {
        match (&field.ty, value) {
            (FieldType::Scalar(ty), v) if v.matches_scalar(*ty) => self.check_integer(v, path),
            (FieldType::Message(type_name), Value::Message(r)) if r.type_name() == type_name => Ok(()),
            (ty, v) => Err(CodecError::TypeMismatch {
                field: path.to_string(),
                expected: ty.to_string(),
                got: match v {
                    Value::Message(r) => r.type_name().to_string(),
                    other => other.type_name().to_string(),
                },
            }),
        }
    }
}

fn partial_mismatch(path: &str, expected: &str, got: &PartialValue) -> CodecError {
    let got = match got {
        PartialValue::Null => "null",
        PartialValue::Value(v) => v.type_name(),
        PartialValue::Message(_) => "partial message",
        PartialValue::List(_) => "list",
    };
    CodecError::TypeMismatch {
        field: path.to_string(),
        expected: expected.to_string(),
        got: got.to_string(),
    }
}
