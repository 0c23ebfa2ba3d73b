//! # service_call
//!
//! Calls the cronos `Query` service through `ServiceClient` over an
//! in-process transport that plays the part of a node.
//!
//! Run with:
//! ```sh
//! cargo run --bin service_call
//! ```

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use protocodec_core::{Codec, Partial, TransportError, Transport, Value};
use protocodec_cosmos::{bundled_codec, msgs::cronos, ServiceClient};
use std::collections::HashMap;
use std::sync::Arc;

/// Answers `cronos.Query` calls from a fixed denom → contract table.
struct InProcessNode {
    codec: Arc<Codec>,
    mappings: HashMap<String, String>,
}

impl InProcessNode {
    fn handle(&self, method: &str, payload: &[u8]) -> Result<Bytes, TransportError> {
        let to_transport = |e: protocodec_core::CodecError| TransportError::Other(e.to_string());
        match method {
            "ContractByDenom" => {
                let req = self
                    .codec
                    .decode("cronos.ContractByDenomRequest", payload)
                    .map_err(to_transport)?;
                let denom = req.get("denom").and_then(Value::as_str).unwrap_or_default();
                let contract = self.mappings.get(denom).ok_or_else(|| TransportError::Remote {
                    code: 5,
                    message: format!("no contract for denom {denom}"),
                })?;
                let resp = self
                    .codec
                    .default_record("cronos.ContractByDenomResponse")
                    .and_then(|r| r.with("contract", contract.as_str()))
                    .map_err(to_transport)?;
                self.codec.encode(&resp).map_err(to_transport)
            }
            "DenomByContract" => {
                let req = self
                    .codec
                    .decode("cronos.DenomByContractRequest", payload)
                    .map_err(to_transport)?;
                let contract = req.get("contract").and_then(Value::as_str).unwrap_or_default();
                let denom = self
                    .mappings
                    .iter()
                    .find(|(_, c)| c.as_str() == contract)
                    .map(|(d, _)| d.clone())
                    .unwrap_or_default();
                let resp = self
                    .codec
                    .default_record("cronos.DenomByContractResponse")
                    .and_then(|r| r.with("denom", denom))
                    .map_err(to_transport)?;
                self.codec.encode(&resp).map_err(to_transport)
            }
            other => Err(TransportError::Remote {
                code: 12,
                message: format!("unimplemented method {other}"),
            }),
        }
    }
}

#[async_trait]
impl Transport for InProcessNode {
    async fn request(&self, service: &str, method: &str, payload: Bytes) -> Result<Bytes, TransportError> {
        if service != cronos::QUERY_SERVICE {
            return Err(TransportError::Unavailable {
                reason: format!("service {service} is not served here"),
            });
        }
        self.handle(method, &payload)
    }

    fn endpoint(&self) -> &str {
        "in-process://cronos"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let codec = Arc::new(bundled_codec()?);
    let node = Arc::new(InProcessNode {
        codec: codec.clone(),
        mappings: [("basecro".to_string(), "0xAbC123".to_string())].into(),
    });
    let client = ServiceClient::new(codec, node, cronos::QUERY_SERVICE)?;

    println!("ProtoCodec: service client over {:?}", client);
    println!("═══════════════════════════════════════════════════════");

    let resp = client
        .call_partial("ContractByDenom", &Partial::new().set("denom", "basecro"))
        .await?;
    println!("ContractByDenom(basecro)  -> {resp}");

    let resp = client
        .call_json("DenomByContract", &serde_json::json!({ "contract": "0xAbC123" }))
        .await?;
    println!("DenomByContract(0xAbC123) -> {resp}");

    match client
        .call_partial("ContractByDenom", &Partial::new().set("denom", "unknown"))
        .await
    {
        Ok(r) => println!("unexpected success: {r}"),
        Err(e) => println!("ContractByDenom(unknown)  -> error: {e}"),
    }
    Ok(())
}
