//! Header extraction.
//!
//! Lookup is case-insensitive: the requested name is lowercased before it is
//! matched, while the original spelling is kept for error messages.

use crate::{ExtractionContext, ExtractionError};

/// The value(s) of a header that was present on the request.
///
/// # Example
///
/// ```rust
/// use meridian_extract::{header_values, ExtractionContextBuilder, HeaderValues};
///
/// let ctx = ExtractionContextBuilder::new()
///     .header("x-tag", "a")
///     .header("x-tag", "b")
///     .build();
///
/// let values = header_values(&ctx, "X-Tag").unwrap();
/// assert_eq!(values, HeaderValues::Multiple(vec!["a".into(), "b".into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValues {
    /// The header appeared once.
    Single(String),
    /// The header was repeated; values are in request order.
    Multiple(Vec<String>),
}

impl HeaderValues {
    /// Returns the first value.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

/// Looks up a header by name.
///
/// Returns [`ExtractionError::missing_header`] when the header is absent and
/// [`ExtractionError::invalid_header`] when any value is not visible ASCII.
pub fn header_values(ctx: &ExtractionContext, name: &str) -> Result<HeaderValues, ExtractionError> {
    let key = name.to_ascii_lowercase();

    let mut values = ctx
        .headers()
        .get_all(key.as_str())
        .iter()
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| ExtractionError::invalid_header(name, "header value is not valid text"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match values.len() {
        0 => Err(ExtractionError::missing_header(name)),
        1 => Ok(HeaderValues::Single(values.remove(0))),
        _ => Ok(HeaderValues::Multiple(values)),
    }
}
