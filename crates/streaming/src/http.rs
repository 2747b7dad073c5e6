use tracing::debug;

use crate::transport::{HttpRequest, Transport, TransportError, parse_body};

/// `reqwest`-backed transport for native hosts.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<serde_json::Value, TransportError> {
        let builder = match request {
            HttpRequest::Post { url, body } => self.client.post(url).json(body),
            HttpRequest::Get { url } => self.client.get(url),
        };
        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        debug!(url = request.url(), status, bytes = text.len(), "response received");
        parse_body(status, &text)
    }
}
