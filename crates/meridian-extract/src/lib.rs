//! # Meridian Extract
//!
//! Request extraction and response payloads for the Meridian service.
//!
//! ## Extractors
//!
//! | Extractor | Source | Description |
//! |-----------|--------|-------------|
//! | [`Validated<T>`] | Request body | JSON body checked against `T`'s declared shape |
//! | [`header_values`] | Headers | Case-insensitive lookup returning every value |
//!
//! ## Error Handling
//!
//! All extractors return [`ExtractionError`] on failure. An error knows its
//! status code and renders its own response:
//!
//! ```rust
//! use meridian_extract::ExtractionError;
//!
//! let response = ExtractionError::missing_header("Authorization").into_response();
//! assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
//! assert_eq!(response.body().as_ref(), b"No header Authorization");
//! ```

#![doc(html_root_url = "https://docs.rs/meridian-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod extractor;
mod header;
pub mod response;
mod validated;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionSource};
pub use extractor::FromRequest;
pub use header::{header_values, HeaderValues};
pub use response::{HttpResponse, Payload, Reply};
pub use validated::Validated;
