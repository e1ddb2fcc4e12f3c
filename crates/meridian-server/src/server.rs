//! HTTP server.
//!
//! Hyper over Tokio, one task per connection. The server exposes a single
//! route, `POST /`, answered by the handler it was built with.
//!
//! # Request flow
//!
//! 1. The body is buffered, bounded by `max_body_bytes` and `request_timeout`.
//! 2. A request id is taken from `x-request-id` or generated.
//! 3. [`Server::dispatch`] picks 404, 405 or the handler.
//! 4. The response carries `x-request-id` back.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use meridian_core::{RandomUserDirectory, UuidIdentityVerifier};
//! use meridian_server::{create_project_handler, Server, ServerConfig};
//!
//! let handler = create_project_handler(
//!     Arc::new(RandomUserDirectory::new()),
//!     Arc::new(UuidIdentityVerifier),
//! );
//! Server::new(ServerConfig::default(), handler).run().await?;
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderName, ALLOW};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use meridian_core::RequestId;
use meridian_extract::response::{error_response, text_response};
use meridian_extract::{ExtractionContext, ExtractionError, HttpResponse};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::handler::{erase, ErasedHandler, Handler};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Header used to correlate a request with its log lines.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The only routed path.
pub const ROUTE_PATH: &str = "/";

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address is invalid or already in use.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O failure on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The project service HTTP server.
pub struct Server {
    config: ServerConfig,
    route: ErasedHandler,
}

impl Server {
    /// Creates a server answering `POST /` with `handler`.
    ///
    /// The handler is cloned for every request.
    pub fn new<H>(config: ServerConfig, handler: H) -> Self
    where
        H: Handler + Clone + Send + Sync + 'static,
    {
        Self {
            config,
            route: erase(handler),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Runs until `shutdown` is triggered, then waits up to the configured
    /// shutdown timeout for open connections.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!("invalid address '{}': {e}", self.config.http_addr()))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        tracing::info!(%addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                tracing::warn!(%remote_addr, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "draining connections"
        );

        if tokio::time::timeout(timeout, tracker.wait_for_idle()).await.is_err() {
            tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                tracing::debug!(%remote_addr, "closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(
        self: &Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        let (parts, body) = req.into_parts();
        let max = self.config.max_body_bytes();

        let collected = tokio::time::timeout(
            self.config.request_timeout(),
            Limited::new(body, max).collect(),
        )
        .await;

        let response = match collected {
            Ok(Ok(collected)) => self.dispatch(Request::from_parts(parts, collected.to_bytes())),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                tracing::debug!(max, "request body over limit");
                ExtractionError::payload_too_large(max, max.saturating_add(1)).into_response()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read request body");
                error_response(
                    StatusCode::BAD_REQUEST,
                    "BODY_READ_ERROR",
                    "failed to read request body",
                )
            }
            Err(_) => {
                tracing::warn!("request body timed out");
                error_response(
                    StatusCode::REQUEST_TIMEOUT,
                    "REQUEST_TIMEOUT",
                    "request body was not received in time",
                )
            }
        };

        Ok(response.map(Full::new))
    }

    /// Answers one buffered request.
    ///
    /// This is everything the server does after the body has been read,
    /// so it can be driven directly without a socket.
    pub fn dispatch(&self, request: Request<Bytes>) -> HttpResponse {
        let started = Instant::now();
        let request_id = RequestId::from_header_or_new(
            request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
        );
        let _entered = span.enter();

        let mut response = self.route_request(request, request_id);

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }

        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );

        response
    }

    fn route_request(&self, request: Request<Bytes>, request_id: RequestId) -> HttpResponse {
        if request.uri().path() != ROUTE_PATH {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        if request.method() != Method::POST {
            let mut response = error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                format!("method {} is not allowed on {ROUTE_PATH}", request.method()),
            );
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
            return response;
        }

        let max = self.config.max_body_bytes();
        if request.body().len() > max {
            return ExtractionError::payload_too_large(max, request.body().len()).into_response();
        }

        let (parts, body) = request.into_parts();
        let ctx = ExtractionContext::new(parts.method, parts.uri, parts.headers, body)
            .with_request_id(request_id);

        match catch_unwind(AssertUnwindSafe(|| (self.route)(&ctx))) {
            Ok(response) => response,
            Err(_) => {
                tracing::error!("handler panicked");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
