//! The create-project route.

use std::sync::Arc;

use http::StatusCode;
use meridian_core::{
    create_project, CreateProjectRequest, CreateProjectResponse, IdentityVerifier, UserDirectory,
};
use meridian_extract::response::{Payload, Reply};
use meridian_extract::{ExtractionContext, HttpResponse};

use crate::handler::{Handler, HandlerError};
use crate::pipeline::{extract_header, respond, validate_body, verify_identity, CREDENTIALS_HEADER};

/// Body sent when the caller is not a known user.
pub const USER_NOT_FOUND_MESSAGE: &str = "Sry, no user found";

/// Maps an operation outcome to a status and payload.
///
/// Adding a variant to [`CreateProjectResponse`] without an arm here is a
/// compile error.
pub fn render_outcome(outcome: CreateProjectResponse) -> Result<Reply, HandlerError> {
    match outcome {
        CreateProjectResponse::Created(project) => {
            Ok((StatusCode::CREATED, Payload::json(&project)?))
        }
        CreateProjectResponse::UserNotFound(_) => Ok((
            StatusCode::NOT_FOUND,
            Payload::text(USER_NOT_FOUND_MESSAGE),
        )),
    }
}

/// Handler for `POST /`.
///
/// Body validation, then the `Authorization` header, then identity
/// verification, then the operation itself.
#[derive(Clone)]
pub struct CreateProjectRoute {
    directory: Arc<dyn UserDirectory>,
    verifier: Arc<dyn IdentityVerifier>,
}

/// Builds the create-project handler.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use http::{Method, StatusCode};
/// use meridian_core::{StaticUserDirectory, UuidIdentityVerifier};
/// use meridian_extract::ExtractionContextBuilder;
/// use meridian_server::handler::Handler;
/// use meridian_server::create_project_handler;
///
/// let route = create_project_handler(
///     Arc::new(StaticUserDirectory::none()),
///     Arc::new(UuidIdentityVerifier),
/// );
/// let ctx = ExtractionContextBuilder::new()
///     .method(Method::POST)
///     .header("authorization", "3fa85f64-5717-4562-b3fc-2c963f66afa6")
///     .body(r#"{"name":"Demo"}"#)
///     .build();
///
/// let response = route.handle(&ctx);
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// assert_eq!(response.body().as_ref(), b"Sry, no user found");
/// ```
pub fn create_project_handler(
    directory: Arc<dyn UserDirectory>,
    verifier: Arc<dyn IdentityVerifier>,
) -> CreateProjectRoute {
    CreateProjectRoute {
        directory,
        verifier,
    }
}

impl Handler for CreateProjectRoute {
    fn handle(self, ctx: &ExtractionContext) -> HttpResponse {
        let Self {
            directory,
            verifier,
        } = self;

        validate_body::<CreateProjectRequest, _, _>(move |request| {
            extract_header(CREDENTIALS_HEADER, move |credentials| {
                verify_identity(verifier, credentials, move |caller| {
                    respond(move || {
                        render_outcome(create_project(&*directory, caller, request))
                    })
                })
            })
        })
        .handle(ctx)
    }
}
