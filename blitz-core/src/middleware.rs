//! Middleware system and handler composer
//!
//! Middleware is composed around a terminal handler once, when a route is
//! registered. The result is a single `BoxedHandler`; serving a request never
//! walks a middleware list.

use crate::handler::{BoxedHandler, Handler, HandlerFuture};
use crate::logging::{debug, error, info};
use crate::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Header checked by [`Auth`] unless configured otherwise
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// The rest of the chain as seen from inside a middleware.
///
/// Calling [`Next::run`] invokes the inner middleware (or the terminal
/// handler). Dropping it without running short-circuits the chain.
#[derive(Clone, Debug)]
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    pub fn new(inner: BoxedHandler) -> Self {
        Self { inner }
    }

    pub async fn run(self, req: HttpRequest) -> Result<HttpResponse, Error> {
        self.inner.call(req).await
    }
}

/// Middleware trait for wrapping handlers with pre/post logic
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error>;
}

/// One middleware bound to the handler it wraps
#[derive(Clone)]
struct Layered {
    middleware: Arc<dyn Middleware>,
    next: BoxedHandler,
}

impl Handler for Layered {
    type Future = HandlerFuture;

    fn call(&self, req: HttpRequest) -> Self::Future {
        let middleware = self.middleware.clone();
        let next = Next::new(self.next.clone());
        Box::pin(async move { middleware.handle(req, next).await })
    }
}

/// Wrap `terminal` with `middlewares`, first element outermost.
///
/// ```
/// use blitz_core::{compose, handler, logger, HttpRequest, HttpResponse, Error};
///
/// let composed = compose(
///     handler(|_req: HttpRequest| async { Ok::<_, Error>(HttpResponse::ok()) }),
///     &[logger()],
/// );
/// # let _ = composed;
/// ```
pub fn compose(terminal: BoxedHandler, middlewares: &[Arc<dyn Middleware>]) -> BoxedHandler {
    middlewares.iter().rev().fold(terminal, |next, middleware| {
        BoxedHandler::new(Layered {
            middleware: middleware.clone(),
            next,
        })
    })
}

/// Middleware built from an async closure
pub struct FnMiddleware<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(HttpRequest, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        (self.f)(req, next).await
    }
}

/// Adapt an async closure into a middleware.
pub fn middleware_fn<F, Fut>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(HttpRequest, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(FnMiddleware { f })
}

// ========== Bundled Middleware ==========

/// Request logger. Logs method and path, then always calls through.
#[derive(Debug, Default, Clone)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for Logger {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let start = Instant::now();
        let method = req.method.clone();
        let path = req.path.clone();

        info!(method = %method, path = %path, "HTTP request received");

        let result = next.run(req).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                info!(
                    method = %method,
                    path = %path,
                    status = response.status,
                    duration_ms = duration.as_millis(),
                    "HTTP response sent"
                );
            }
            Err(err) => {
                error!(
                    method = %method,
                    path = %path,
                    duration_ms = duration.as_millis(),
                    error = %err,
                    "HTTP request failed"
                );
            }
        }

        result
    }
}

/// Authorization gate.
///
/// Rejects with `401 Unauthorized` when the configured header is missing or
/// empty. The value itself is not validated.
#[derive(Debug, Clone)]
pub struct Auth {
    header: String,
}

impl Auth {
    pub fn new() -> Self {
        Self {
            header: DEFAULT_AUTH_HEADER.to_string(),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn header_name(&self) -> &str {
        &self.header
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for Auth {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        match req.header(&self.header) {
            Some(value) if !value.is_empty() => next.run(req).await,
            _ => {
                debug!(path = %req.path, header = %self.header, "Rejecting unauthorized request");
                Ok(HttpResponse::unauthorized())
            }
        }
    }
}

/// Shorthand for `Arc::new(Logger::new())`
pub fn logger() -> Arc<dyn Middleware> {
    Arc::new(Logger::new())
}

/// Shorthand for `Arc::new(Auth::new())`
pub fn auth() -> Arc<dyn Middleware> {
    Arc::new(Auth::new())
}
