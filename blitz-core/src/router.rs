//! Registration surface
//!
//! `Router` is the mutable, single-owner configuration phase. Every mutation
//! recomposes what it touched and recompiles the fast path before returning.
//! `freeze` ends the configuration phase and yields a `Dispatcher` for
//! concurrent serving.

use crate::dispatch::{self, CompiledRoutes, Dispatcher, RouterOptions, compile};
use crate::handler::{IntoHandler, handler};
use crate::logging::debug;
use crate::method::MethodSlot;
use crate::middleware::Middleware;
use crate::route_group::RouteGroup;
use crate::routing::{RouteTable, normalize_path};
use crate::{Error, HttpRequest, HttpResponse};
use std::fmt;
use std::sync::Arc;

/// HTTP request router
///
/// ```
/// use blitz_core::{Error, HttpRequest, HttpResponse, Router, get_params};
///
/// # tokio_test::block_on(async {
/// let mut router = Router::new();
/// router.get(
///     "/api",
///     |_req: HttpRequest| async { Ok::<_, Error>(HttpResponse::text("Welcome")) },
///     vec![],
/// );
/// router.any(
///     "*",
///     |req: HttpRequest| async move {
///         Ok::<_, Error>(HttpResponse::text(format!("Not found: {}", get_params(&req))))
///     },
///     vec![],
/// );
///
/// let response = router.serve(HttpRequest::new("GET", "/random")).await.unwrap();
/// assert_eq!(response.body_str(), "Not found: random");
/// # });
/// ```
pub struct Router {
    table: RouteTable,
    global: Vec<Arc<dyn Middleware>>,
    compiled: Option<CompiledRoutes>,
    options: RouterOptions,
}

impl Router {
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            table: RouteTable::new(),
            global: Vec::new(),
            compiled: None,
            options,
        }
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Register a handler for one method slot.
    ///
    /// `MethodSlot::Any` fills the fallback slot consulted when a route has
    /// no handler for the concrete method.
    pub fn handle<H, Args>(
        &mut self,
        slot: MethodSlot,
        path: &str,
        h: H,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        let kind = self
            .table
            .insert(slot, path, handler(h), middlewares, &self.global);
        debug!(slot = ?slot, path = %path, kind = %kind, "Route registered");
        self.recompile();
        self
    }

    pub fn get<H, Args>(&mut self, path: &str, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        self.handle(MethodSlot::Get, path, h, mws)
    }

    pub fn post<H, Args>(&mut self, path: &str, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        self.handle(MethodSlot::Post, path, h, mws)
    }

    pub fn put<H, Args>(&mut self, path: &str, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        self.handle(MethodSlot::Put, path, h, mws)
    }

    pub fn delete<H, Args>(&mut self, path: &str, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        self.handle(MethodSlot::Delete, path, h, mws)
    }

    pub fn patch<H, Args>(&mut self, path: &str, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        self.handle(MethodSlot::Patch, path, h, mws)
    }

    /// Register for GET, POST, PUT, DELETE and PATCH at once.
    ///
    /// The path `"*"` registers the catch-all instead.
    pub fn any<H, Args>(&mut self, path: &str, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        if is_catch_all(path) {
            return self.catch_all(h, mws);
        }
        let boxed = handler(h);
        for slot in MethodSlot::CONCRETE {
            self.table
                .insert(slot, path, boxed.clone(), mws.clone(), &self.global);
        }
        debug!(path = %path, "Route registered for all methods");
        self.recompile();
        self
    }

    /// Register the fallback used when nothing else matches.
    ///
    /// The handler sees the normalized request path through
    /// [`HttpRequest::route_param`].
    pub fn catch_all<H, Args>(&mut self, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        self.table.set_catch_all(handler(h), mws, &self.global);
        debug!("Catch-all registered");
        self.recompile();
        self
    }

    /// Append global middleware.
    ///
    /// Global middleware runs outside every per-route middleware and applies
    /// to routes registered before this call as well as after it.
    pub fn use_middleware<I>(&mut self, mws: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        let before = self.global.len();
        self.global.extend(mws);
        if self.global.len() == before {
            return self;
        }
        self.table.recompose(&self.global);
        debug!(global = self.global.len(), "Global middleware updated");
        self.recompile();
        self
    }

    /// Open a group sharing `prefix` and `mws`
    pub fn group(&mut self, prefix: &str, mws: Vec<Arc<dyn Middleware>>) -> RouteGroup<'_> {
        RouteGroup::new(self, prefix, mws)
    }

    fn recompile(&mut self) {
        self.compiled = compile(&self.table);
    }

    /// Route and handle one request against the current configuration
    pub async fn serve(&self, req: HttpRequest) -> Result<HttpResponse, Error> {
        dispatch::dispatch(&self.table, self.compiled.as_ref(), &self.options, req).await
    }

    /// Freeze the configuration into a shareable [`Dispatcher`]
    pub fn freeze(self) -> Dispatcher {
        Dispatcher::new(self.table, self.compiled, self.options)
    }

    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    pub fn global_middleware_count(&self) -> usize {
        self.global.len()
    }

    /// Whether the static fast path is currently built
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("global_middleware", &self.global.len())
            .field("compiled", &self.compiled.is_some())
            .field("options", &self.options)
            .finish()
    }
}

pub(crate) fn is_catch_all(path: &str) -> bool {
    normalize_path(path) == "*"
}
