//! HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::TransportError;
use crate::transport::Transport;

/// POSTs the payload as JSON to `{scheme}://{host}:{service}{path}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    scheme: String,
    path: String,
}

impl HttpTransport {
    /// Create a transport. A `None` timeout leaves round-trips unbounded.
    pub fn new(
        scheme: impl Into<String>,
        path: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            scheme: scheme.into(),
            path: path.into(),
        })
    }

    /// Endpoint URL for a host/service pair.
    pub fn url(&self, host: &str, service: &str) -> String {
        let path = if self.path.starts_with('/') || self.path.is_empty() {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("{}://{}:{}{}", self.scheme, host, service, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        host: &str,
        service: &str,
        payload: &str,
    ) -> Result<String, TransportError> {
        let url = self.url(host, service);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.clone(),
                reason: if e.is_timeout() {
                    "timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|e| TransportError::Body {
            url,
            reason: e.to_string(),
        })
    }
}
