//! Response payloads.
//!
//! Handlers describe what to send as a status code plus a [`Payload`]; the
//! payload knows its content type and how to become a body.
//!
//! | Payload | Content-Type |
//! |---------|--------------|
//! | [`Payload::Json`] | `application/json` |
//! | [`Payload::Text`] | `text/plain; charset=utf-8` |
//!
//! # Example
//!
//! ```rust
//! use meridian_extract::response::Payload;
//! use http::StatusCode;
//!
//! let response = Payload::text("Sry, no user found").into_response(StatusCode::NOT_FOUND);
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! assert_eq!(response.body().as_ref(), b"Sry, no user found");
//! ```

use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use meridian_core::ErrorEnvelope;
use serde::Serialize;
use serde_json::Value;

/// A fully buffered HTTP response.
pub type HttpResponse = Response<Bytes>;

/// Content type for JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Content type for plain text bodies.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A status code paired with the payload to send.
pub type Reply = (StatusCode, Payload);

/// Body of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured data, serialized as JSON.
    Json(Value),
    /// Plain text.
    Text(String),
}

impl Payload {
    /// Serializes a value into a JSON payload.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(data).map(Self::Json)
    }

    /// Creates a plain text payload.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }

    /// Creates a JSON payload from an error envelope.
    ///
    /// Falls back to the envelope's message as text if it cannot be
    /// serialized.
    #[must_use]
    pub fn envelope(envelope: &ErrorEnvelope) -> Self {
        Self::json(envelope).unwrap_or_else(|_| Self::Text(envelope.error.message.clone()))
    }

    /// Returns the content type this payload is sent with.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => APPLICATION_JSON,
            Self::Text(_) => TEXT_PLAIN,
        }
    }

    /// Builds the HTTP response.
    #[must_use]
    pub fn into_response(self, status: StatusCode) -> HttpResponse {
        let content_type = self.content_type();
        let body = match self {
            Self::Json(value) => Bytes::from(value.to_string()),
            Self::Text(text) => Bytes::from(text),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }
}

/// Builds a plain text response.
#[must_use]
pub fn text_response(status: StatusCode, body: impl Into<String>) -> HttpResponse {
    Payload::text(body).into_response(status)
}

/// Builds a JSON error envelope response without field-level issues.
#[must_use]
pub fn error_response(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> HttpResponse {
    Payload::envelope(&ErrorEnvelope::new(code, message, None)).into_response(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct TestData {
        id: u64,
        name: String,
    }

    #[test]
    fn test_json_payload() {
        let payload = Payload::json(&TestData {
            id: 1,
            name: "Alice".to_string(),
        })
        .unwrap();
        let response = payload.into_response(StatusCode::CREATED);

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], APPLICATION_JSON);

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"id": 1, "name": "Alice"}));
    }

    #[test]
    fn test_text_payload() {
        let response = text_response(StatusCode::NOT_FOUND, "Sry, no user found");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(response.body().as_ref(), b"Sry, no user found");
    }

    #[test]
    fn test_error_response() {
        let response = error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            "only POST is supported",
        );

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
        assert_eq!(body["error"]["message"], "only POST is supported");
    }

    #[test]
    fn test_content_type_per_variant() {
        assert_eq!(Payload::Json(json!(null)).content_type(), APPLICATION_JSON);
        assert_eq!(Payload::text("").content_type(), TEXT_PLAIN);
    }
}
