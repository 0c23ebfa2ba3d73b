//! The `Transport` trait: the codec's only contract with the network.
//!
//! A transport receives an encoded request together with the service and
//! method it is addressed to (e.g. `"cronos.Msg"` / `"ConvertVouchers"`)
//! and returns the raw response bytes. Connection handling, retries,
//! authentication and signing all belong to the implementation.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;

/// Dispatches `(service, method, payload)` to a remote endpoint.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks and
/// can be stored as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one encoded request and return the encoded response.
    async fn request(
        &self,
        service: &str,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, TransportError>;

    /// Identifier of the remote endpoint (URL or name), for logs.
    fn endpoint(&self) -> &str {
        "unknown"
    }
}
