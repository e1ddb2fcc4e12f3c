//! Extraction error types.
//!
//! Every rejection produced while adapting a request (bad body, missing or
//! malformed header, rejected credentials) is an [`ExtractionError`]. It
//! knows its status code and renders itself through
//! [`ExtractionError::into_response`], the single place where rejections
//! become HTTP responses.

use crate::response::{HttpResponse, Payload};
use http::StatusCode;
use meridian_core::{AuthFailure, ErrorEnvelope, ValidationFailure};
use std::fmt;

/// Source of extraction (where data was being extracted from).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Request body
    Body,
    /// HTTP headers
    Header,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Error that occurs during extraction.
///
/// # Example
///
/// ```rust
/// use meridian_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::missing_header("Authorization");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.extraction_source(), ExtractionSource::Header);
/// assert_eq!(err.to_string(), "No header Authorization");
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
    failure: Option<ValidationFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Required header is absent
    Missing,
    /// Header bytes are not usable text
    InvalidHeader,
    /// Credentials were present but rejected
    InvalidCredentials,
    /// Body does not match its declared shape
    InvalidBody,
    /// Body is too large
    PayloadTooLarge,
}

impl ExtractionError {
    /// Creates an error for a missing header.
    ///
    /// The header name is kept exactly as the caller spelled it.
    #[must_use]
    pub fn missing_header(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            extraction_source: ExtractionSource::Header,
            kind: ExtractionErrorKind::Missing,
            message: format!("No header {name}"),
            field: Some(name),
            failure: None,
        }
    }

    /// Creates an error for a header whose value is not visible ASCII text.
    #[must_use]
    pub fn invalid_header(name: impl Into<String>, details: impl Into<String>) -> Self {
        let name = name.into();
        let details = details.into();
        Self {
            extraction_source: ExtractionSource::Header,
            kind: ExtractionErrorKind::InvalidHeader,
            message: format!("invalid header '{name}': {details}"),
            failure: Some(ValidationFailure::single(name.to_ascii_lowercase(), details)),
            field: Some(name),
        }
    }

    /// Creates an error for credentials the identity verifier rejected.
    #[must_use]
    pub fn invalid_credentials(name: impl Into<String>, reason: &AuthFailure) -> Self {
        let name = name.into();
        Self {
            extraction_source: ExtractionSource::Header,
            kind: ExtractionErrorKind::InvalidCredentials,
            message: format!("invalid credentials in header '{name}'"),
            failure: Some(ValidationFailure::single(
                name.to_ascii_lowercase(),
                reason.to_string(),
            )),
            field: Some(name),
        }
    }

    /// Creates an error for a body that did not match its shape.
    #[must_use]
    pub fn invalid_body(failure: ValidationFailure) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::InvalidBody,
            message: "request body does not match the expected shape".to_string(),
            field: None,
            failure: Some(failure),
        }
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
            field: None,
            failure: None,
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the field name if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the structured failure, if this error carries one.
    #[must_use]
    pub fn failure(&self) -> Option<&ValidationFailure> {
        self.failure.as_ref()
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Missing
            | ExtractionErrorKind::InvalidHeader
            | ExtractionErrorKind::InvalidCredentials
            | ExtractionErrorKind::InvalidBody => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "MISSING_HEADER",
            ExtractionErrorKind::InvalidHeader => "INVALID_HEADER",
            ExtractionErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ExtractionErrorKind::InvalidBody => "VALIDATION_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
        }
    }

    /// Renders this error as an HTTP response.
    ///
    /// A missing header is answered with its message as plain text. Every
    /// other rejection uses the JSON error envelope, with field-level issues
    /// when there are any.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        let status = self.status_code();
        if self.kind == ExtractionErrorKind::Missing {
            return Payload::Text(self.message).into_response(status);
        }

        let envelope = ErrorEnvelope::new(
            self.error_code(),
            self.message,
            self.failure.map(|failure| failure.issues),
        );
        Payload::envelope(&envelope).into_response(status)
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}
