//! # protocodec-core
//!
//! Wire primitives, the schema and record model, and the schema-driven
//! codec shared by every ProtoCodec crate: binary encode / decode,
//! JSON conversion, partial construction, and the transport contract.

pub mod codec;
pub mod config;
pub mod error;
pub mod json;
pub mod numeric;
pub mod partial;
pub mod schema;
pub mod transport;
pub mod value;
pub mod wire;

pub use codec::Codec;
pub use config::{CodecConfig, JsonOptions};
pub use error::{
    BatchDecodeError, ClientError, CodecError, ErrorKind, RegistryError, TransportError,
};
pub use numeric::{IntegerMode, IntegerStrategy, NativeIntegers, SafeIntegers, MAX_SAFE_INTEGER};
pub use partial::{Partial, PartialValue};
pub use schema::{
    Cardinality, FieldDef, FieldType, MessageSchema, MethodDef, ScalarType, SchemaDescription,
    SchemaRegistry, SchemaSet, ServiceSchema,
};
pub use transport::Transport;
pub use value::{Record, Value};
pub use wire::{WireReader, WireType, WireWriter};
