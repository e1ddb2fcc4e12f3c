//! # Meridian Core
//!
//! Core types for the Meridian create-project service.
//!
//! This crate provides the request-independent pieces of the service:
//!
//! - [`Schema`] and [`Shape`] - declared shapes that raw JSON must satisfy
//! - [`ValidationFailure`] - structured description of why a value was rejected
//! - [`ProjectName`], [`ProjectId`], [`UserId`], [`Project`] - validated domain values
//! - [`CreateProjectRequest`] / [`CreateProjectResponse`] - the operation's input and outcome
//! - [`UserDirectory`] - existence check for callers
//! - [`IdentityVerifier`] - turns asserted credentials into a [`UserId`]
//! - [`create_project`] - the domain operation itself

#![doc(html_root_url = "https://docs.rs/meridian-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod directory;
mod error;
mod identity;
mod operation;
mod project;
pub mod shape;

pub use context::RequestId;
pub use directory::{
    RandomUserDirectory, StaticUserDirectory, UserDirectory, DEFAULT_NOT_FOUND_THRESHOLD,
};
pub use error::{ErrorDetail, ErrorEnvelope, Issue, ValidationFailure};
pub use identity::{AuthFailure, IdentityVerifier, UserId, UuidIdentityVerifier};
pub use operation::create_project;
pub use project::{
    CreateProjectRequest, CreateProjectResponse, Project, ProjectId, ProjectName,
    ProjectNameError,
};
pub use shape::{Schema, Shape};
