//! Pipeline stages.
//!
//! Each stage wraps a continuation. It either hands a typed value to the
//! continuation and lets the resulting handler answer the request, or it
//! answers the request itself and stops. Stages run synchronously, in the
//! order they are nested.
//!
//! ```text
//! validate_body ──> extract_header ──> verify_identity ──> respond
//!      │                  │                   │               │
//!   400 shape         400 missing         400 invalid     status + payload
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use http::StatusCode;
use meridian_core::{AuthFailure, IdentityVerifier, Shape, UserId};
use meridian_extract::response::{error_response, Reply};
use meridian_extract::{
    header_values, ExtractionContext, ExtractionError, FromRequest, HeaderValues, HttpResponse,
    Validated,
};

use crate::handler::{Handler, HandlerError};

/// Header carrying the caller's asserted identity.
pub const CREDENTIALS_HEADER: &str = "Authorization";

/// Runs its continuation only when the body matches `T`'s declared shape.
pub struct BodyValidator<T, K> {
    next: K,
    _shape: PhantomData<fn() -> T>,
}

impl<T, K: Clone> Clone for BodyValidator<T, K> {
    fn clone(&self) -> Self {
        Self {
            next: self.next.clone(),
            _shape: PhantomData,
        }
    }
}

/// Validates the request body as `T` before calling `next`.
///
/// On failure the continuation is never called; the response is a 400 with
/// the structured validation failure.
pub fn validate_body<T, K, H>(next: K) -> BodyValidator<T, K>
where
    T: Shape,
    K: FnOnce(T) -> H,
    H: Handler,
{
    BodyValidator {
        next,
        _shape: PhantomData,
    }
}

impl<T, K, H> Handler for BodyValidator<T, K>
where
    T: Shape,
    K: FnOnce(T) -> H,
    H: Handler,
{
    fn handle(self, ctx: &ExtractionContext) -> HttpResponse {
        match Validated::<T>::from_request(ctx) {
            Ok(Validated(value)) => (self.next)(value).handle(ctx),
            Err(err) => {
                tracing::debug!(error = %err, "request body rejected");
                err.into_response()
            }
        }
    }
}

/// Runs its continuation only when a named header is present.
#[derive(Debug, Clone)]
pub struct HeaderExtractor<K> {
    name: String,
    next: K,
}

/// Looks up `name` (case-insensitively) before calling `next`.
///
/// A missing header is answered with 400 and the plain-text body
/// `No header <name>`. This checks presence only.
pub fn extract_header<K, H>(name: impl Into<String>, next: K) -> HeaderExtractor<K>
where
    K: FnOnce(HeaderValues) -> H,
    H: Handler,
{
    HeaderExtractor {
        name: name.into(),
        next,
    }
}

impl<K, H> Handler for HeaderExtractor<K>
where
    K: FnOnce(HeaderValues) -> H,
    H: Handler,
{
    fn handle(self, ctx: &ExtractionContext) -> HttpResponse {
        match header_values(ctx, &self.name) {
            Ok(values) => (self.next)(values).handle(ctx),
            Err(err) => {
                tracing::debug!(header = %self.name, error = %err, "required header rejected");
                err.into_response()
            }
        }
    }
}

/// Turns asserted credentials into a verified [`UserId`].
pub struct IdentityGuard<K> {
    verifier: Arc<dyn IdentityVerifier>,
    values: HeaderValues,
    next: K,
}

/// Verifies the credentials in `values` before calling `next`.
///
/// Repeated credentials are rejected without consulting the verifier. Any
/// rejection is a 400 whose envelope points at the `authorization` header.
pub fn verify_identity<K, H>(
    verifier: Arc<dyn IdentityVerifier>,
    values: HeaderValues,
    next: K,
) -> IdentityGuard<K>
where
    K: FnOnce(UserId) -> H,
    H: Handler,
{
    IdentityGuard {
        verifier,
        values,
        next,
    }
}

impl<K, H> Handler for IdentityGuard<K>
where
    K: FnOnce(UserId) -> H,
    H: Handler,
{
    fn handle(self, ctx: &ExtractionContext) -> HttpResponse {
        let verified = match &self.values {
            HeaderValues::Single(credentials) => self.verifier.verify(credentials),
            HeaderValues::Multiple(all) => Err(AuthFailure::Ambiguous { count: all.len() }),
        };

        match verified {
            Ok(caller) => (self.next)(caller).handle(ctx),
            Err(failure) => {
                tracing::debug!(error = %failure, "caller identity rejected");
                ExtractionError::invalid_credentials(CREDENTIALS_HEADER, &failure).into_response()
            }
        }
    }
}

/// Terminal stage: computes a reply once and writes it.
#[derive(Debug, Clone, Copy)]
pub struct Responder<F> {
    thunk: F,
}

/// Wraps a thunk producing the final status and payload.
pub fn respond<F>(thunk: F) -> Responder<F>
where
    F: FnOnce() -> Result<Reply, HandlerError>,
{
    Responder { thunk }
}

impl<F> Handler for Responder<F>
where
    F: FnOnce() -> Result<Reply, HandlerError>,
{
    fn handle(self, _ctx: &ExtractionContext) -> HttpResponse {
        match (self.thunk)() {
            Ok((status, payload)) => payload.into_response(status),
            Err(err) => {
                tracing::error!(error = %err, "failed to produce response");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}
