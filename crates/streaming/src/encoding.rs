//! Payload decoding for the URL-encoded string fields the server emits.
//!
//! The server encodes `svg`, `error`, `sceneInfo`, `info`, `html` and
//! `imagemap` with form encoding, so `+` stands for a space and everything
//! else is percent-escaped.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters left bare by form encoding.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    Utf8(String),
    Json(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Utf8(msg) => write!(f, "decoded payload is not UTF-8: {msg}"),
            DecodeError::Json(msg) => write!(f, "payload is not valid JSON: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

pub fn url_decode(encoded: &str) -> Result<String, DecodeError> {
    let spaced = encoded.replace('+', "%20");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| DecodeError::Utf8(e.to_string()))
}

/// Form-encodes `text` the way the server does: spaces become `+`.
pub fn url_encode(text: &str) -> String {
    utf8_percent_encode(text, FORM).to_string().replace("%20", "+")
}

/// Strings are URL-decoded then parsed; structured values pass through.
pub fn decode_json_payload(value: &serde_json::Value) -> Result<serde_json::Value, DecodeError> {
    match value {
        serde_json::Value::String(encoded) => {
            let text = url_decode(encoded)?;
            serde_json::from_str(&text).map_err(|e| DecodeError::Json(e.to_string()))
        }
        other => Ok(other.clone()),
    }
}

/// Like [`decode_json_payload`] but for markup fields, which are plain text.
pub fn decode_text_payload(value: &serde_json::Value) -> Result<String, DecodeError> {
    match value {
        serde_json::Value::String(encoded) => url_decode(encoded),
        other => Ok(other.to_string()),
    }
}
