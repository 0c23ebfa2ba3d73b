//! Module message tables and `EncodeObject`.
//!
//! An `EncodeObject` is the unit a transaction builder signs over: a type
//! URL plus the message record it names. Only the message types listed
//! here are accepted, mirroring the registry a cosmos tx client is
//! created with.

use crate::any::pack_any;
use bytes::Bytes;
use protocodec_core::{CodecError, Codec, Partial, Record};

pub mod cronos {
    pub const MSG_SERVICE: &str = "cronos.Msg";
    pub const QUERY_SERVICE: &str = "cronos.Query";

    pub const MSG_CONVERT_VOUCHERS: &str = "/cronos.MsgConvertVouchers";
    pub const MSG_TRANSFER_TOKENS: &str = "/cronos.MsgTransferTokens";
    pub const MSG_UPDATE_TOKEN_MAPPING: &str = "/cronos.MsgUpdateTokenMapping";

    pub const MSG_TYPES: &[&str] = &[
        MSG_CONVERT_VOUCHERS,
        MSG_TRANSFER_TOKENS,
        MSG_UPDATE_TOKEN_MAPPING,
    ];
}

pub mod ethermint {
    pub const MSG_SERVICE: &str = "ethermint.evm.v1.Msg";
    pub const QUERY_SERVICE: &str = "ethermint.evm.v1.Query";

    pub const MSG_ETHEREUM_TX: &str = "/ethermint.evm.v1.MsgEthereumTx";

    pub const MSG_TYPES: &[&str] = &[MSG_ETHEREUM_TX];

    /// Inner transaction types carried in `MsgEthereumTx.data`.
    pub const TX_DATA_TYPES: &[&str] = &[
        "/ethermint.evm.v1.LegacyTx",
        "/ethermint.evm.v1.AccessListTx",
        "/ethermint.evm.v1.DynamicFeeTx",
    ];
}

/// Every registered message type URL, cronos first.
pub fn registered_type_urls() -> impl Iterator<Item = &'static str> {
    cronos::MSG_TYPES
        .iter()
        .chain(ethermint::MSG_TYPES)
        .copied()
}

pub fn is_registered(type_url: &str) -> bool {
    registered_type_urls().any(|t| t == type_url)
}

/// A message ready to be placed in a transaction body.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeObject {
    pub type_url: String,
    pub value: Record,
}

impl EncodeObject {
    /// Wrap a record of a registered message type.
    pub fn new(codec: &Codec, value: Record) -> Result<Self, CodecError> {
        let type_url = codec.schema(value.type_name())?.type_url();
        if !is_registered(&type_url) {
            return Err(CodecError::SchemaNotFound { name: type_url });
        }
        Ok(Self { type_url, value })
    }

    /// Build the message for `type_url` from a partial field set.
    pub fn from_partial(codec: &Codec, type_url: &str, partial: &Partial) -> Result<Self, CodecError> {
        if !is_registered(type_url) {
            return Err(CodecError::SchemaNotFound {
                name: type_url.to_string(),
            });
        }
        let type_name = type_url.trim_start_matches('/');
        let value = codec.from_partial(type_name, partial)?;
        Ok(Self {
            type_url: type_url.to_string(),
            value,
        })
    }

    /// Wire bytes of the message itself.
    pub fn encode(&self, codec: &Codec) -> Result<Bytes, CodecError> {
        codec.encode(&self.value)
    }

    /// The message packed into `google.protobuf.Any`.
    pub fn to_any(&self, codec: &Codec) -> Result<Record, CodecError> {
        pack_any(codec, &self.value)
    }
}
