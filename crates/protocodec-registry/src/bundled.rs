//! Schemas compiled into the binary: `google.protobuf.Any`, the cosmos
//! base types, and the cronos and ethermint EVM modules.

use protocodec_core::error::RegistryError;
use tracing::info;

use crate::memory::MemoryRegistry;

/// `(path, source)` of every bundled PSDL file, dependencies first.
pub const BUNDLED_SCHEMAS: &[(&str, &str)] = &[
    (
        "google/protobuf/any.psdl",
        include_str!("../../../schemas/google/protobuf/any.psdl"),
    ),
    (
        "cosmos/base/v1beta1/coin.psdl",
        include_str!("../../../schemas/cosmos/base/v1beta1/coin.psdl"),
    ),
    (
        "cosmos/base/query/v1beta1/pagination.psdl",
        include_str!("../../../schemas/cosmos/base/query/v1beta1/pagination.psdl"),
    ),
    (
        "cronos/cronos.psdl",
        include_str!("../../../schemas/cronos/cronos.psdl"),
    ),
    (
        "cronos/genesis.psdl",
        include_str!("../../../schemas/cronos/genesis.psdl"),
    ),
    ("cronos/tx.psdl", include_str!("../../../schemas/cronos/tx.psdl")),
    (
        "cronos/query.psdl",
        include_str!("../../../schemas/cronos/query.psdl"),
    ),
    (
        "ethermint/evm/v1/evm.psdl",
        include_str!("../../../schemas/ethermint/evm/v1/evm.psdl"),
    ),
    (
        "ethermint/evm/v1/tx.psdl",
        include_str!("../../../schemas/ethermint/evm/v1/tx.psdl"),
    ),
    (
        "ethermint/evm/v1/query.psdl",
        include_str!("../../../schemas/ethermint/evm/v1/query.psdl"),
    ),
];

/// Add every bundled schema to `registry`. Returns the number of
/// definitions added.
pub fn load_bundled(registry: &MemoryRegistry) -> Result<usize, RegistryError> {
    let mut count = 0;
    for (path, source) in BUNDLED_SCHEMAS {
        count += registry.load_str(source).map_err(|e| match e {
            RegistryError::ParseError(msg) => RegistryError::ParseError(format!("{path}: {msg}")),
            other => other,
        })?;
    }
    info!(definitions = count, "loaded bundled schemas");
    Ok(count)
}

/// A fresh registry holding the bundled schemas, references checked.
pub fn bundled_registry() -> Result<MemoryRegistry, RegistryError> {
    let registry = MemoryRegistry::new();
    load_bundled(&registry)?;
    registry.check_references()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocodec_core::schema::{Cardinality, SchemaRegistry};

    #[test]
    fn bundled_schemas_resolve() {
        let reg = bundled_registry().unwrap();
        for name in [
            "google.protobuf.Any",
            "cosmos.base.v1beta1.Coin",
            "cronos.Params",
            "cronos.GenesisState",
            "cronos.MsgConvertVouchers",
            "ethermint.evm.v1.MsgEthereumTx",
            "ethermint.evm.v1.DynamicFeeTx",
            "ethermint.evm.v1.QueryTxLogsResponse",
        ] {
            assert!(reg.message(name).is_some(), "{name} missing");
        }
        assert_eq!(
            reg.service_names(),
            vec!["cronos.Msg", "cronos.Query", "ethermint.evm.v1.Msg", "ethermint.evm.v1.Query"]
        );
    }

    #[test]
    fn cronos_tags_match_the_chain() {
        let reg = bundled_registry().unwrap();
        let params = reg.message("cronos.Params").unwrap();
        let tags: Vec<_> = params.fields.iter().map(|f| (f.json_name.as_str(), f.tag)).collect();
        assert_eq!(
            tags,
            [
                ("ibcCroDenom", 1),
                ("ibcTimeout", 2),
                ("cronosAdmin", 3),
                ("enableAutoDeployment", 4)
            ]
        );
        let transfer = reg.message("cronos.MsgTransferTokens").unwrap();
        let coins = transfer.field("coins").unwrap();
        assert_eq!(coins.tag, 3);
        assert_eq!(coins.cardinality, Cardinality::Repeated);
    }

    #[test]
    fn ethermint_query_service() {
        let reg = bundled_registry().unwrap();
        let query = reg.service("ethermint.evm.v1.Query").unwrap();
        let eth_call = query.method("EthCall").unwrap();
        assert_eq!(eth_call.input, "ethermint.evm.v1.EthCallRequest");
        assert_eq!(eth_call.output, "ethermint.evm.v1.MsgEthereumTxResponse");
        assert!(query.method("EstimateGas").is_some());
    }
}
