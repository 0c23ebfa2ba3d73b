//! # protocodec-cosmos
//!
//! Cosmos SDK glue for ProtoCodec.
//!
//! - [`pack_any`] / [`unpack_any`]: `google.protobuf.Any` envelopes keyed by type URL
//! - [`EncodeObject`] and the cronos / ethermint message tables
//! - [`ServiceClient`]: `(service, method, payload)` dispatch over a [`Transport`]
//!
//! ## Usage
//! ```no_run
//! use protocodec_cosmos::{bundled_codec, pack_any};
//!
//! let codec = bundled_codec().unwrap();
//! let mapping = codec
//!     .default_record("cronos.TokenMapping").unwrap()
//!     .with("denom", "basecro").unwrap();
//! let any = pack_any(&codec, &mapping).unwrap();
//! ```
//!
//! [`Transport`]: protocodec_core::Transport

pub mod any;
pub mod client;
pub mod msgs;

pub use any::{any_type_url, pack_any, unpack_any, ANY_TYPE};
pub use client::ServiceClient;
pub use msgs::{is_registered, registered_type_urls, EncodeObject};

use protocodec_core::{Codec, RegistryError};
use std::sync::Arc;

/// A codec over the bundled cosmos, cronos and ethermint schemas.
pub fn bundled_codec() -> Result<Codec, RegistryError> {
    let registry = protocodec_registry::bundled_registry()?;
    Ok(Codec::new(Arc::new(registry)))
}
