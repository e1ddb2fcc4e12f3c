//! User existence checks.
//!
//! The create-project operation asks a [`UserDirectory`] whether the caller
//! exists. [`RandomUserDirectory`] is the stand-in used by the binary until a
//! real user store is wired in. [`StaticUserDirectory`] gives tests a fixed
//! answer.

use crate::identity::UserId;
use std::collections::HashSet;

/// Probability with which [`RandomUserDirectory`] reports a user as missing.
pub const DEFAULT_NOT_FOUND_THRESHOLD: f64 = 0.3;

/// Answers whether a user exists.
pub trait UserDirectory: Send + Sync {
    /// Returns `true` if the user is known.
    fn exists(&self, user: &UserId) -> bool;
}

/// Reports users as missing at random.
///
/// Each call draws a uniform value in `[0, 1)`; values below the threshold
/// mean "not found".
#[derive(Debug, Clone, Copy)]
pub struct RandomUserDirectory {
    threshold: f64,
}

impl RandomUserDirectory {
    /// Creates a directory with the default threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threshold: DEFAULT_NOT_FOUND_THRESHOLD,
        }
    }

    /// Creates a directory with a custom threshold, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for RandomUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for RandomUserDirectory {
    fn exists(&self, _user: &UserId) -> bool {
        rand::random::<f64>() >= self.threshold
    }
}

/// A directory with a fixed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticUserDirectory {
    /// Every user exists.
    Everyone,
    /// No user exists.
    Nobody,
    /// Only the listed users exist.
    Only(HashSet<UserId>),
}

impl StaticUserDirectory {
    /// A directory in which every user exists.
    #[must_use]
    pub const fn all() -> Self {
        Self::Everyone
    }

    /// A directory in which no user exists.
    #[must_use]
    pub const fn none() -> Self {
        Self::Nobody
    }

    /// A directory containing exactly the given users.
    #[must_use]
    pub fn only(users: impl IntoIterator<Item = UserId>) -> Self {
        Self::Only(users.into_iter().collect())
    }
}

impl UserDirectory for StaticUserDirectory {
    fn exists(&self, user: &UserId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Nobody => false,
            Self::Only(users) => users.contains(user),
        }
    }
}
