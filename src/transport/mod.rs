//! Request/response round-trip with the control endpoint.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::TransportError;

/// One round-trip to the control endpoint.
///
/// Sends `payload` and returns the full response body. Implementations are
/// shared by the agent for its whole lifetime.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        host: &str,
        service: &str,
        payload: &str,
    ) -> Result<String, TransportError>;
}
