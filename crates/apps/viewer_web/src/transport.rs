use gloo_net::http::Request;
use streaming::{HttpRequest, Transport, TransportError, parse_body};

/// Browser `fetch` transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, request: &HttpRequest) -> Result<serde_json::Value, TransportError> {
        let network = |e: gloo_net::Error| TransportError::Network(e.to_string());
        let resp = match request {
            HttpRequest::Post { url, body } => {
                Request::post(url).json(body).map_err(network)?.send().await
            }
            HttpRequest::Get { url } => Request::get(url).send().await,
        }
        .map_err(network)?;
        let status = resp.status();
        let text = resp.text().await.map_err(network)?;
        parse_body(status, &text)
    }
}
