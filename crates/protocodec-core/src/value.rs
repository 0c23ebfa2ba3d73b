//! In-memory record instances.
//!
//! A [`Record`] always carries every field of its schema. Scalars and
//! repeated fields hold a value at all times (the default when unset);
//! only fields declared `Optional` may be `None`.

use crate::error::CodecError;
use crate::schema::ScalarType;
use indexmap::IndexMap;
use std::fmt;

/// A single field value.
///
/// Floats compare by bit pattern: `NaN == NaN` and `0.0 != -0.0`, the same
/// rule [`Value::is_default`] uses.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Message(Box<Record>),
    List(Vec<Value>),
}

impl Value {
    /// The unset default for a scalar type.
    pub fn default_for(ty: ScalarType) -> Value {
        match ty {
            ScalarType::Double => Value::F64(0.0),
            ScalarType::Float => Value::F32(0.0),
            ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => Value::I32(0),
            ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => Value::I64(0),
            ScalarType::Uint32 | ScalarType::Fixed32 => Value::U32(0),
            ScalarType::Uint64 | ScalarType::Fixed64 => Value::U64(0),
            ScalarType::Bool => Value::Bool(false),
            ScalarType::String => Value::String(String::new()),
            ScalarType::Bytes => Value::Bytes(Vec::new()),
        }
    }

    /// Whether the value equals its type's unset default.
    ///
    /// Floats compare by bit pattern so `-0.0` still counts as set.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::I32(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::U32(v) => *v == 0,
            Value::U64(v) => *v == 0,
            Value::F32(v) => v.to_bits() == 0,
            Value::F64(v) => v.to_bits() == 0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Message(_) => false,
        }
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Message(_) => "message",
            Value::List(_) => "list",
        }
    }

    /// Whether this value has the in-memory shape of `ty`.
    pub fn matches_scalar(&self, ty: ScalarType) -> bool {
        matches!(
            (ty, self),
            (ScalarType::Double, Value::F64(_))
                | (ScalarType::Float, Value::F32(_))
                | (ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32, Value::I32(_))
                | (ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64, Value::I64(_))
                | (ScalarType::Uint32 | ScalarType::Fixed32, Value::U32(_))
                | (ScalarType::Uint64 | ScalarType::Fixed64, Value::U64(_))
                | (ScalarType::Bool, Value::Bool(_))
                | (ScalarType::String, Value::String(_))
                | (ScalarType::Bytes, Value::Bytes(_))
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any unsigned or non-negative signed integer, widened to `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U32(v) => Some(u64::from(*v)),
            Value::U64(v) => Some(*v),
            Value::I32(v) => u64::try_from(*v).ok(),
            Value::I64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Any integer that fits `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            Value::U32(v) => Some(i64::from(*v)),
            Value::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(f64::from(*v)),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Record> {
        match self {
            Value::Message(r) => Some(r.as_ref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Message(a), Value::Message(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "0x{}", hex_lower(b)),
            Value::Message(r) => write!(f, "{r}"),
            Value::List(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    Vec<Value> => List,
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Message(Box::new(r))
    }
}

// ─── Record ───────────────────────────────────────────────────────────────────

/// A record instance bound to one message type.
///
/// Fields are stored in schema declaration order. Equality compares the
/// type name and every field value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: IndexMap<String, Option<Value>>,
}

impl Record {
    /// Build a record from already-defaulted field slots.
    /// Use [`crate::schema::MessageSchema::default_record`] instead.
    pub(crate) fn from_slots(
        type_name: impl Into<String>,
        fields: IndexMap<String, Option<Value>>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Fully-qualified message name, e.g. `cronos.TokenMapping`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The value of `field`, or `None` if the field is undeclared or an
    /// absent optional.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).and_then(|v| v.as_ref())
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.get_mut(field).and_then(|v| v.as_mut())
    }

    /// Whether the schema declares `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Replace a field value. Type compatibility is checked at encode time.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), CodecError> {
        self.slot_mut(field)?.replace(value.into());
        Ok(())
    }

    /// Clear an optional field back to absent.
    pub fn clear(&mut self, field: &str) -> Result<(), CodecError> {
        self.slot_mut(field)?.take();
        Ok(())
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self, CodecError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Iterate `(field, value)` in schema declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn slot_mut(&mut self, field: &str) -> Result<&mut Option<Value>, CodecError> {
        let schema = &self.type_name;
        match self.fields.get_mut(field) {
            Some(slot) => Ok(slot),
            None => Err(CodecError::UnknownField {
                schema: schema.clone(),
                field: field.to_string(),
            }),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self
            .fields
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| format!("{k}: {v}")))
            .collect();
        write!(f, "{} {{{}}}", self.type_name, parts.join(", "))
    }
}
