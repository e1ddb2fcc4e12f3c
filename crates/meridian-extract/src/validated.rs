//! Shape-validated JSON body extractor.
//!
//! [`Validated<T>`] parses the request body as JSON, checks it against
//! `T`'s declared [`Schema`](meridian_core::Schema) and only then builds `T`.
//! Every way the body can be wrong surfaces as
//! [`ExtractionError::invalid_body`] carrying a structured failure. Size is
//! not checked here; the server enforces its configured body limit before a
//! context is built.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use meridian_core::{Shape, ValidationFailure};
use std::ops::Deref;

/// Extractor for request bodies that satisfy a declared shape.
///
/// # Example
///
/// ```rust
/// use meridian_core::CreateProjectRequest;
/// use meridian_extract::{ExtractionContextBuilder, FromRequest, Validated};
///
/// let ctx = ExtractionContextBuilder::new()
///     .body(r#"{"name": "  Demo  "}"#)
///     .build();
///
/// let Validated(request) = Validated::<CreateProjectRequest>::from_request(&ctx).unwrap();
/// assert_eq!(request.name().as_str(), "Demo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    /// Consumes the wrapper and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Shape> FromRequest for Validated<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let body = ctx.body();

        if body.is_empty() {
            return Err(ExtractionError::invalid_body(ValidationFailure::single(
                "$",
                "request body is empty",
            )));
        }

        let raw: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            ExtractionError::invalid_body(ValidationFailure::single(
                "$",
                format!("malformed JSON: {e}"),
            ))
        })?;

        T::from_json(&raw)
            .map(Validated)
            .map_err(ExtractionError::invalid_body)
    }
}
