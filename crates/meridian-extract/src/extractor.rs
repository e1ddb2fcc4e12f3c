//! Core extractor trait.
//!
//! The [`FromRequest`] trait is the foundation for all extractors.

use crate::{ExtractionContext, ExtractionError};

/// Trait for types that can be extracted from an HTTP request.
///
/// Extraction is synchronous: the context already holds the buffered body.
///
/// # Implementing `FromRequest`
///
/// ```rust
/// use meridian_extract::{
///     header_values, ExtractionContext, ExtractionError, FromRequest,
/// };
///
/// struct Tenant(String);
///
/// impl FromRequest for Tenant {
///     fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
///         let values = header_values(ctx, "X-Tenant")?;
///         Ok(Tenant(values.first().unwrap_or_default().to_string()))
///     }
/// }
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}
