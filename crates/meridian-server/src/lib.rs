//! # Meridian Server
//!
//! HTTP front end of the project service.
//!
//! `POST /` creates a project. The request runs through a fixed pipeline:
//!
//! 1. the JSON body is validated against [`CreateProjectRequest`]'s shape,
//! 2. the `Authorization` header must be present,
//! 3. its value must be a single user id,
//! 4. the project is created if the directory knows the caller.
//!
//! The first stage that rejects the request writes the response.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use http::{Request, StatusCode};
//! use meridian_core::{StaticUserDirectory, UuidIdentityVerifier};
//! use meridian_server::{create_project_handler, Server, ServerConfig};
//!
//! let server = Server::new(
//!     ServerConfig::default(),
//!     create_project_handler(
//!         Arc::new(StaticUserDirectory::all()),
//!         Arc::new(UuidIdentityVerifier),
//!     ),
//! );
//!
//! let request = Request::post("/")
//!     .header("Authorization", "3fa85f64-5717-4562-b3fc-2c963f66afa6")
//!     .body(Bytes::from_static(br#"{"name":"Demo"}"#))
//!     .unwrap();
//!
//! assert_eq!(server.dispatch(request).status(), StatusCode::CREATED);
//! ```
//!
//! [`CreateProjectRequest`]: meridian_core::CreateProjectRequest

#![doc(html_root_url = "https://docs.rs/meridian-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod handler;
pub mod pipeline;
mod routes;
mod server;
mod shutdown;

pub use config::{
    AppConfig, ConfigError, DirectorySettings, LoggingSettings, ServerConfig, ServerConfigBuilder,
    ServerSettings, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_BYTES,
};
pub use handler::{Handler, HandlerError};
pub use routes::{create_project_handler, render_outcome, CreateProjectRoute, USER_NOT_FOUND_MESSAGE};
pub use server::{Server, ServerError, REQUEST_ID_HEADER, ROUTE_PATH};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
