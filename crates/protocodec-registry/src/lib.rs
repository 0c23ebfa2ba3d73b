//! # protocodec-registry
//!
//! Schema Registry for ProtoCodec.
//!
//! - **PSDL parser**: YAML documents declaring `message` and `service` schemas
//! - **In-memory registry**: thread-safe, loaded from strings, files or directories
//! - **Bundled schemas**: `google.protobuf.Any`, cosmos base types, cronos and
//!   ethermint EVM, compiled into the crate
//!
//! The public-facing API is the `SchemaRegistry` trait from `protocodec-core`.

pub mod bundled;
pub mod memory;
pub mod psdl;

pub use bundled::{bundled_registry, load_bundled, BUNDLED_SCHEMAS};
pub use memory::MemoryRegistry;
pub use psdl::{Definition, PsdlParser};
