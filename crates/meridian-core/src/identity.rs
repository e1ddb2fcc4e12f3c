//! Caller identity.
//!
//! The `Authorization` header only asserts who the caller is. An
//! [`IdentityVerifier`] turns that assertion into a [`UserId`] or rejects it
//! with an [`AuthFailure`] before the domain operation ever runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a user, in UUID form.
///
/// Only the canonical `8-4-4-4-12` hex layout is accepted. The caller's text
/// is kept as written and is what gets rendered back; equality and hashing
/// go by UUID value, so letter case does not split one user into two.
///
/// # Example
///
/// ```
/// use meridian_core::UserId;
///
/// let id: UserId = "3FA85F64-5717-4562-B3FC-2C963F66AFA6".parse().unwrap();
/// assert_eq!(id.to_string(), "3FA85F64-5717-4562-B3FC-2C963F66AFA6");
/// assert!("{3fa85f64-5717-4562-b3fc-2c963f66afa6}".parse::<UserId>().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId {
    uuid: Uuid,
    text: String,
}

impl UserId {
    /// Returns the identifier exactly as it was supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for UserId {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for UserId {}

impl Hash for UserId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Byte offsets of the hyphens in `8-4-4-4-12` text.
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

fn is_canonical(s: &str) -> bool {
    s.len() == 36
        && s.bytes().enumerate().all(|(i, b)| {
            if HYPHENS.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

impl FromStr for UserId {
    type Err = AuthFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_canonical(s) {
            return Err(AuthFailure::Malformed {
                reason: "expected a UUID in 8-4-4-4-12 hex form".to_string(),
            });
        }

        let uuid = Uuid::parse_str(s).map_err(|e| AuthFailure::Malformed {
            reason: e.to_string(),
        })?;
        Ok(Self {
            uuid,
            text: s.to_string(),
        })
    }
}

impl TryFrom<String> for UserId {
    type Error = AuthFailure;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.text
    }
}

/// Why asserted credentials could not be turned into a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// The credential value is not a well-formed identifier.
    #[error("malformed credentials: {reason}")]
    Malformed {
        /// Parser explanation.
        reason: String,
    },

    /// The credential header was sent more than once.
    #[error("expected a single credential value, got {count}")]
    Ambiguous {
        /// Number of values received.
        count: usize,
    },
}

/// Verifies asserted credentials and yields the caller's identity.
///
/// Implementations must be cheap to call concurrently; they are shared
/// across every request.
pub trait IdentityVerifier: Send + Sync {
    /// Returns the verified caller or the reason verification failed.
    fn verify(&self, credentials: &str) -> Result<UserId, AuthFailure>;
}

/// Accepts any canonical UUID text as the caller's identity.
///
/// This checks format only. It does not prove the caller owns the id.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdentityVerifier;

impl IdentityVerifier for UuidIdentityVerifier {
    fn verify(&self, credentials: &str) -> Result<UserId, AuthFailure> {
        credentials.parse()
    }
}
