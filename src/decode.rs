//! Wire-format decoding for stream messages.
//!
//! Metric updates arrive as base64-encoded UTF-8 text containing a JSON
//! object with `key` and `value` fields. Decoding is a pure function; a
//! malformed message yields a [`DecodeError`] and the caller drops it and
//! keeps processing; one bad frame must never halt the stream.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use thiserror::Error;

use crate::store::MetricValue;

/// One decoded stream message: a metric key and its newest value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricUpdate {
    /// Opaque metric identifier, e.g. `"bytes.write.count"`.
    pub key: String,
    /// The replacement value for that key.
    pub value: MetricValue,
}

/// Errors produced while decoding a raw stream message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid base64.
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not valid UTF-8 text.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The text is not a JSON object with `key` and `value` fields.
    #[error("payload is not a valid metric update: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one raw stream message into a typed update.
///
/// Fields beyond `key` and `value` (the server also stamps a `time`) are
/// ignored.
///
/// # Example
///
/// ```
/// use loadwatch::{decode, MetricValue};
///
/// // base64 of {"key":"request.count","value":42}
/// let update = decode(b"eyJrZXkiOiJyZXF1ZXN0LmNvdW50IiwidmFsdWUiOjQyfQ==").unwrap();
/// assert_eq!(update.key, "request.count");
/// assert_eq!(update.value, MetricValue::Integer(42));
/// ```
pub fn decode(raw: &[u8]) -> Result<MetricUpdate, DecodeError> {
    let bytes = STANDARD.decode(raw)?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        STANDARD.encode(json)
    }

    #[test]
    fn decodes_integer_update() {
        let raw = encode(r#"{"key":"request.count","value":42}"#);

        let update = decode(raw.as_bytes()).unwrap();
        assert_eq!(update.key, "request.count");
        assert_eq!(update.value, MetricValue::Integer(42));
    }

    #[test]
    fn decodes_text_update() {
        let raw = encode(r#"{"key":"status","value":"degraded"}"#);

        let update = decode(raw.as_bytes()).unwrap();
        assert_eq!(update.value, MetricValue::Text("degraded".to_string()));
    }

    #[test]
    fn tolerates_extra_fields() {
        // The original server stamps every event with a timestamp.
        let raw = encode(r#"{"key":"session.count","value":3,"time":"2024-01-01T00:00:00Z"}"#);

        let update = decode(raw.as_bytes()).unwrap();
        assert_eq!(update.key, "session.count");
        assert_eq!(update.value, MetricValue::Integer(3));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode(b"not-base64!!").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let raw = STANDARD.encode([0xff, 0xfe, 0xfd]);

        let err = decode(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let raw = encode("{key: nope");

        let err = decode(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = decode(encode(r#"{"key":"lonely"}"#).as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));

        let err = decode(encode(r#"{"value":1}"#).as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
