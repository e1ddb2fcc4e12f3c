//! Request correlation identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for consecutive requests
/// sortable by their correlation id.
///
/// # Example
///
/// ```
/// use meridian_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Reuses a caller-supplied correlation id when it is a valid UUID.
    ///
    /// Anything else yields a freshly generated id so that a malformed
    /// `x-request-id` header never breaks correlation.
    #[must_use]
    pub fn from_header_or_new(value: Option<&str>) -> Self {
        value
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .map_or_else(Self::new, Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
