//! Validation failures and the error envelope rendered for clients.
//!
//! A [`ValidationFailure`] is produced whenever a raw value does not satisfy
//! a declared [`Schema`](crate::Schema). It lists every offending location
//! rather than only the first, so clients can fix all problems in one round
//! trip.
//!
//! # Envelope Format
//!
//! Failures that carry field-level detail are rendered as:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "VALIDATION_FAILED",
//!     "message": "request body does not match the expected shape",
//!     "issues": [
//!       { "path": "$.name", "message": "string length 0 is less than minimum 1" }
//!     ]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single reason why a value was rejected, anchored at a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Location of the offending value, rooted at `$` (e.g. `$.name`).
    pub path: String,
    /// Human-readable reason.
    pub message: String,
}

impl Issue {
    /// Creates a new issue.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Structured description of why a raw value did not match a shape.
///
/// # Example
///
/// ```
/// use meridian_core::ValidationFailure;
///
/// let mut failure = ValidationFailure::new();
/// failure.push("$.name", "required field is missing");
///
/// assert_eq!(failure.len(), 1);
/// assert!(failure.mentions("name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Every issue found, in the order the schema visited them.
    pub issues: Vec<Issue>,
}

impl ValidationFailure {
    /// Creates an empty failure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a failure holding exactly one issue.
    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue::new(path, message)],
        }
    }

    /// Records an issue.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue::new(path, message));
    }

    /// Returns `true` if no issues were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if any issue path ends with the given field name.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| {
            issue
                .path
                .rsplit(['.', '['])
                .next()
                .is_some_and(|last| last.trim_end_matches(']') == field)
        })
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", issue.path, issue.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

impl ErrorEnvelope {
    /// Builds an envelope from a code, a message and optional issues.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        issues: Option<Vec<Issue>>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                issues,
            },
        }
    }
}

/// Error detail within an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Field-level issues, when the error came from validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
}
