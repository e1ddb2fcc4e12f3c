//! Request handlers.
//!
//! A [`Handler`] turns a buffered request into a response. Handlers are
//! consumed by [`Handler::handle`], so a pipeline stage can move its
//! continuation into the next stage without cloning it. The server keeps one
//! prototype handler and clones it per request.

use std::sync::Arc;

use meridian_extract::{ExtractionContext, HttpResponse};
use thiserror::Error;

/// Something that answers a request.
pub trait Handler {
    /// Handles the request, writing exactly one response.
    fn handle(self, ctx: &ExtractionContext) -> HttpResponse;
}

/// A handler built from a closure.
///
/// # Example
///
/// ```rust
/// use meridian_extract::{response::Payload, ExtractionContextBuilder};
/// use meridian_server::handler::{handler_fn, Handler};
/// use http::StatusCode;
///
/// let ok = handler_fn(|_ctx| Payload::text("ok").into_response(StatusCode::OK));
/// let response = ok.handle(&ExtractionContextBuilder::new().build());
/// assert_eq!(response.status(), StatusCode::OK);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: FnOnce(&ExtractionContext) -> HttpResponse,
{
    FnHandler { f }
}

impl<F> Handler for FnHandler<F>
where
    F: FnOnce(&ExtractionContext) -> HttpResponse,
{
    fn handle(self, ctx: &ExtractionContext) -> HttpResponse {
        (self.f)(ctx)
    }
}

/// A type-erased, shareable handler.
pub type ErasedHandler = Arc<dyn Fn(&ExtractionContext) -> HttpResponse + Send + Sync>;

/// Erases a handler so the server can hold it without a type parameter.
///
/// Every call works on a fresh clone of `handler`.
pub fn erase<H>(handler: H) -> ErasedHandler
where
    H: Handler + Clone + Send + Sync + 'static,
{
    Arc::new(move |ctx: &ExtractionContext| handler.clone().handle(ctx))
}

/// Failure raised while computing a response.
///
/// Business outcomes are never errors. A `HandlerError` always means the
/// service itself misbehaved and is answered with a 500.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The response payload could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other failure.
    #[error("handler error: {0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Wraps an arbitrary error.
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Custom(err.into())
    }
}
