//! Extraction context providing access to request data.
//!
//! The [`ExtractionContext`] is what every pipeline stage reads from. It holds
//! a fully buffered request, so stages can run synchronously one after the
//! other.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use meridian_core::RequestId;

/// Context providing access to all parts of an HTTP request.
///
/// # Example
///
/// ```rust
/// use meridian_extract::ExtractionContext;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let ctx = ExtractionContext::new(
///     Method::POST,
///     Uri::from_static("/"),
///     HeaderMap::new(),
///     Bytes::from_static(br#"{"name":"Demo"}"#),
/// );
///
/// assert_eq!(ctx.method(), &Method::POST);
/// assert!(!ctx.is_body_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    request_id: RequestId,
}

impl ExtractionContext {
    /// Creates a new extraction context with a fresh request id.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            request_id: RequestId::new(),
        }
    }

    /// Replaces the request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body as bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the correlation id of this request.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Checks if the request body is empty.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Builder for constructing an `ExtractionContext`.
///
/// Method and URI default to `GET /`.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    request_id: Option<RequestId>,
}

impl ExtractionContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a header value, keeping earlier values with the same name.
    ///
    /// Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request id.
    #[must_use]
    pub fn request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            request_id: self.request_id.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_context_creation() {
        let ctx = ExtractionContext::new(
            Method::POST,
            Uri::from_static("/?dry_run=true"),
            HeaderMap::new(),
            Bytes::from_static(b""),
        );

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.path(), "/");
        assert_eq!(ctx.uri().query(), Some("dry_run=true"));
    }

    #[test]
    fn test_extraction_context_builder() {
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .uri(Uri::from_static("/"))
            .header("content-type", "application/json")
            .body(r#"{"name": "Demo"}"#)
            .build();

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.headers()["content-type"], "application/json");
        assert!(!ctx.is_body_empty());
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = ExtractionContextBuilder::new().build();
        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/");
        assert!(ctx.is_body_empty());
    }

    #[test]
    fn test_builder_appends_repeated_headers() {
        let ctx = ExtractionContextBuilder::new()
            .header("Authorization", "a")
            .header("authorization", "b")
            .build();

        let values: Vec<_> = ctx.headers().get_all("authorization").iter().collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[test]
    fn test_request_id_is_kept() {
        let id = RequestId::new();
        let ctx = ExtractionContextBuilder::new().request_id(id).build();
        assert_eq!(ctx.request_id(), id);

        let other = RequestId::new();
        assert_eq!(ctx.with_request_id(other).request_id(), other);
    }
}
