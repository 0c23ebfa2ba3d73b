//! RPC service client over a pluggable [`Transport`].

use protocodec_core::{
    ClientError, Codec, MethodDef, Partial, Record, SchemaRegistry, ServiceSchema, Transport,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client for one service schema.
///
/// Each call encodes the request with the codec, hands
/// `(service, method, bytes)` to the transport and decodes the reply as the
/// method's output type. Failures are returned as-is; there are no retries.
#[derive(Clone)]
pub struct ServiceClient {
    codec: Arc<Codec>,
    transport: Arc<dyn Transport>,
    service: Arc<ServiceSchema>,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service.name)
            .field("endpoint", &self.transport.endpoint())
            .finish()
    }
}

impl ServiceClient {
    pub fn new(
        codec: Arc<Codec>,
        transport: Arc<dyn Transport>,
        service: &str,
    ) -> Result<Self, ClientError> {
        let service = codec
            .registry()
            .service(service)
            .ok_or_else(|| ClientError::UnknownService {
                service: service.to_string(),
            })?;
        Ok(Self {
            codec,
            transport,
            service,
        })
    }

    pub fn service(&self) -> &ServiceSchema {
        &self.service
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    fn method(&self, method: &str) -> Result<&MethodDef, ClientError> {
        self.service
            .method(method)
            .ok_or_else(|| ClientError::UnknownMethod {
                service: self.service.name.clone(),
                method: method.to_string(),
            })
    }

    /// Invoke `method` with a complete request record.
    pub async fn call(&self, method: &str, request: &Record) -> Result<Record, ClientError> {
        let def = self.method(method)?;
        if request.type_name() != def.input {
            return Err(ClientError::RequestType {
                method: def.name.clone(),
                expected: def.input.clone(),
                got: request.type_name().to_string(),
            });
        }

        let payload = self.codec.encode(request)?;
        debug!(
            service = %self.service.name,
            method,
            bytes = payload.len(),
            endpoint = self.transport.endpoint(),
            "dispatching request"
        );

        let reply = self
            .transport
            .request(&self.service.name, method, payload)
            .await
            .map_err(|e| {
                warn!(service = %self.service.name, method, error = %e, "transport failed");
                e
            })?;

        let response = self.codec.decode(&def.output, &reply)?;
        debug!(service = %self.service.name, method, bytes = reply.len(), "decoded response");
        Ok(response)
    }

    /// Invoke `method` with a request built from a partial field set.
    pub async fn call_partial(&self, method: &str, request: &Partial) -> Result<Record, ClientError> {
        let def = self.method(method)?;
        let request = self.codec.from_partial(&def.input, request)?;
        self.call(method, &request).await
    }

    /// Invoke `method` with a JSON request and return the JSON response.
    pub async fn call_json(&self, method: &str, request: &JsonValue) -> Result<JsonValue, ClientError> {
        let def = self.method(method)?;
        let request = self.codec.from_json(&def.input, request)?;
        let response = self.call(method, &request).await?;
        Ok(self.codec.to_json(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::cronos;
    use async_trait::async_trait;
    use bytes::Bytes;
    use protocodec_core::{TransportError, Value};
    use protocodec_registry::bundled_registry;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed payload.
    struct MockTransport {
        reply: Result<Bytes, TransportError>,
        seen: Mutex<Vec<(String, String, Bytes)>>,
    }

    impl MockTransport {
        fn replying(reply: Result<Bytes, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn request(
            &self,
            service: &str,
            method: &str,
            payload: Bytes,
        ) -> Result<Bytes, TransportError> {
            self.seen
                .lock()
                .unwrap()
                .push((service.to_string(), method.to_string(), payload));
            match &self.reply {
                Ok(b) => Ok(b.clone()),
                Err(TransportError::Remote { code, message }) => Err(TransportError::Remote {
                    code: *code,
                    message: message.clone(),
                }),
                Err(e) => Err(TransportError::Other(e.to_string())),
            }
        }

        fn endpoint(&self) -> &str {
            "mock://cronos"
        }
    }

    fn codec() -> Arc<Codec> {
        Arc::new(Codec::new(Arc::new(bundled_registry().unwrap())))
    }

    #[tokio::test]
    async fn contract_by_denom_round_trip() {
        let codec = codec();
        // ContractByDenomResponse { contract: "0xAbC123", auto_contract: "" }
        let transport = MockTransport::replying(Ok(Bytes::from_static(b"\x0a\x080xAbC123")));
        let client = ServiceClient::new(codec.clone(), transport.clone(), cronos::QUERY_SERVICE).unwrap();

        let request = codec
            .default_record("cronos.ContractByDenomRequest")
            .unwrap()
            .with("denom", "basecro")
            .unwrap();
        let response = client.call("ContractByDenom", &request).await.unwrap();

        assert_eq!(response.type_name(), "cronos.ContractByDenomResponse");
        assert_eq!(response.get("contract").and_then(Value::as_str), Some("0xAbC123"));
        assert_eq!(response.get("auto_contract").and_then(Value::as_str), Some(""));

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "cronos.Query");
        assert_eq!(seen[0].1, "ContractByDenom");
        assert_eq!(hex::encode(&seen[0].2), "0a076261736563726f");
    }

    #[tokio::test]
    async fn empty_reply_decodes_to_defaults() {
        let codec = codec();
        let transport = MockTransport::replying(Ok(Bytes::new()));
        let client = ServiceClient::new(codec, transport, cronos::MSG_SERVICE).unwrap();

        let response = client
            .call_partial("UpdateTokenMapping", &Partial::new().set("denom", "basecro"))
            .await
            .unwrap();
        assert_eq!(response.type_name(), "cronos.MsgUpdateTokenMappingResponse");
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn json_calls() {
        let codec = codec();
        let transport = MockTransport::replying(Ok(Bytes::from_static(b"\x0a\x07basecro")));
        let client = ServiceClient::new(codec, transport, cronos::QUERY_SERVICE).unwrap();
        let response = client
            .call_json("DenomByContract", &serde_json::json!({ "contract": "0xAbC123" }))
            .await
            .unwrap();
        assert_eq!(response, serde_json::json!({ "denom": "basecro" }));
    }

    #[tokio::test]
    async fn request_type_is_checked() {
        let codec = codec();
        let transport = MockTransport::replying(Ok(Bytes::new()));
        let client = ServiceClient::new(codec.clone(), transport.clone(), cronos::QUERY_SERVICE).unwrap();

        let wrong = codec.default_record("cronos.TokenMapping").unwrap();
        let err = client.call("ContractByDenom", &wrong).await.unwrap_err();
        assert!(matches!(err, ClientError::RequestType { .. }));

        let err = client.call("Nope", &wrong).await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownMethod { .. }));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_and_decode_failures_propagate() {
        let codec = codec();
        let failing = MockTransport::replying(Err(TransportError::Remote {
            code: 5,
            message: "not found".into(),
        }));
        let client = ServiceClient::new(codec.clone(), failing, cronos::QUERY_SERVICE).unwrap();
        let err = client
            .call_partial("ContractByDenom", &Partial::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Remote { code: 5, .. })
        ));

        // Truncated length-delimited field.
        let garbage = MockTransport::replying(Ok(Bytes::from_static(b"\x0a\x09abc")));
        let client = ServiceClient::new(codec, garbage, cronos::QUERY_SERVICE).unwrap();
        let err = client
            .call_partial("ContractByDenom", &Partial::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Codec(_)));
    }

    #[test]
    fn unknown_service() {
        let transport = MockTransport::replying(Ok(Bytes::new()));
        let err = ServiceClient::new(codec(), transport, "cronos.Nope").unwrap_err();
        assert!(matches!(err, ClientError::UnknownService { .. }));
    }
}
