//! Request/response transport seam.
//!
//! The widget core only needs "send this, give me parsed JSON or an error".
//! Native hosts use [`crate::HttpTransport`]; the web app wraps `gloo-net`;
//! tests script responses in memory.

use std::future::Future;

#[derive(Debug, Clone, PartialEq)]
pub enum HttpRequest {
    Post { url: String, body: serde_json::Value },
    /// Plain file loads only.
    Get { url: String },
}

impl HttpRequest {
    pub fn url(&self) -> &str {
        match self {
            HttpRequest::Post { url, .. } | HttpRequest::Get { url } => url,
        }
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            HttpRequest::Post { body, .. } => Some(body),
            HttpRequest::Get { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    Network(String),
    Status(u16),
    EmptyBody,
    Malformed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "request failed: {msg}"),
            TransportError::Status(code) => write!(f, "server responded with status {code}"),
            TransportError::EmptyBody => write!(f, "empty response received"),
            TransportError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

pub trait Transport {
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TransportError>>;
}

/// Shared status/body handling for transports that receive raw text.
pub fn parse_body(status: u16, body: &str) -> Result<serde_json::Value, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::Status(status));
    }
    if body.trim().is_empty() {
        return Err(TransportError::EmptyBody);
    }
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))?;
    if value.is_null() {
        return Err(TransportError::EmptyBody);
    }
    Ok(value)
}
