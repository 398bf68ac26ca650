//! Compiler and dispatcher
//!
//! `compile` flattens a route table into lookup structures that only hold the
//! composed handlers: a hash map for static paths plus the pre-split patterns
//! of the parameterized and wildcard routes. The result is an immutable
//! snapshot. The router recompiles after every mutation, so the snapshot
//! never lags behind the table it was built from.

use crate::handler::BoxedHandler;
use crate::logging::{debug, trace};
use crate::method::MethodSlot;
use crate::routing::{PathPattern, Route, RouteMatch, RouteTable, normalize_path, resolve_in};
use crate::{Error, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Methods advertised by the automatic `OPTIONS` response
pub const DEFAULT_ALLOW: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"];

/// Router-wide behavior switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Answer every `OPTIONS` request with `204` and an `Allow` header
    pub auto_options: bool,
    /// Methods listed in that `Allow` header
    pub allow: Vec<String>,
}

impl RouterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_options(mut self, enabled: bool) -> Self {
        self.auto_options = enabled;
        self
    }

    pub fn allow<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Value of the `Allow` header, e.g. `GET,POST,PUT,DELETE,PATCH,OPTIONS`
    pub fn allow_header(&self) -> String {
        self.allow.join(",")
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            auto_options: true,
            allow: DEFAULT_ALLOW.iter().map(|m| m.to_string()).collect(),
        }
    }
}

type Slots = [Option<BoxedHandler>; MethodSlot::COUNT];

fn patterned(routes: &[Route]) -> Vec<(PathPattern, Slots)> {
    routes
        .iter()
        .map(|route| (route.matcher().clone(), route.composed_slots()))
        .collect()
}

/// Immutable lookup snapshot of a [`RouteTable`]
#[derive(Debug, Clone)]
pub struct CompiledRoutes {
    statics: HashMap<String, Slots>,
    params: Vec<(PathPattern, Slots)>,
    wildcards: Vec<(PathPattern, Slots)>,
    catch_all: Option<Slots>,
}

/// Build the fast path for `table`.
///
/// Returns `None` while the static partition is empty; the dispatcher then
/// resolves against the table directly.
pub fn compile(table: &RouteTable) -> Option<CompiledRoutes> {
    if table.static_len() == 0 {
        return None;
    }

    let statics = table
        .statics()
        .map(|route| (route.pattern().to_string(), route.composed_slots()))
        .collect();

    Some(CompiledRoutes {
        statics,
        params: patterned(table.params()),
        wildcards: patterned(table.wildcards()),
        catch_all: table.catch_all().map(Route::composed_slots),
    })
}

impl CompiledRoutes {
    pub fn static_len(&self) -> usize {
        self.statics.len()
    }

    /// Same resolution order as [`RouteTable::resolve`]
    pub fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        resolve_in(
            method,
            path,
            self.statics.get(path),
            self.params.iter().map(|(p, s)| (p, s)),
            self.wildcards.iter().map(|(p, s)| (p, s)),
            self.catch_all.as_ref(),
        )
    }
}

/// Resolve `req` and attach what the match captured.
///
/// Returns the early `OPTIONS` response, the handler to run, or neither.
pub(crate) fn select(
    table: &RouteTable,
    compiled: Option<&CompiledRoutes>,
    options: &RouterOptions,
    req: &mut HttpRequest,
) -> Result<BoxedHandler, HttpResponse> {
    if options.auto_options && req.method == "OPTIONS" {
        let allow = options.allow_header();
        return Err(HttpResponse::no_content().with_header("Allow", allow));
    }

    let path = normalize_path(&req.path);
    let found = match compiled {
        Some(compiled) => compiled.resolve(&req.method, path),
        None => table.resolve(&req.method, path),
    };

    match found {
        Some(m) => {
            trace!(
                method = %req.method,
                path = %req.path,
                kind = %m.kind,
                compiled = compiled.is_some(),
                "Route matched"
            );
            let handler = m.handler.clone();
            if !m.params.is_empty() {
                req.path_params.extend(m.params);
            }
            req.route_param = m.route_param;
            Ok(handler)
        }
        None => {
            debug!(method = %req.method, path = %req.path, "No route matched");
            Err(HttpResponse::not_found())
        }
    }
}

pub(crate) async fn dispatch(
    table: &RouteTable,
    compiled: Option<&CompiledRoutes>,
    options: &RouterOptions,
    mut req: HttpRequest,
) -> Result<HttpResponse, Error> {
    match select(table, compiled, options, &mut req) {
        Ok(handler) => handler.call(req).await,
        Err(response) => Ok(response),
    }
}

struct Frozen {
    table: RouteTable,
    compiled: Option<CompiledRoutes>,
    options: RouterOptions,
}

/// A frozen router.
///
/// Produced by [`Router::freeze`](crate::Router::freeze). Cloning is an `Arc`
/// bump and every clone serves from the same immutable routes, so a
/// dispatcher can be shared across connections and tasks freely.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Frozen>,
}

impl Dispatcher {
    pub(crate) fn new(
        table: RouteTable,
        compiled: Option<CompiledRoutes>,
        options: RouterOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Frozen {
                table,
                compiled,
                options,
            }),
        }
    }

    /// Route and handle one request.
    ///
    /// Unmatched requests get a `404` response. Errors returned by handlers
    /// or middleware are passed through unchanged.
    pub async fn serve(&self, req: HttpRequest) -> Result<HttpResponse, Error> {
        let inner = &self.inner;
        dispatch(&inner.table, inner.compiled.as_ref(), &inner.options, req).await
    }

    pub fn is_compiled(&self) -> bool {
        self.inner.compiled.is_some()
    }

    pub fn route_count(&self) -> usize {
        self.inner.table.len()
    }

    pub fn options(&self) -> &RouterOptions {
        &self.inner.options
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.inner.table.len())
            .field("compiled", &self.inner.compiled.is_some())
            .field("options", &self.inner.options)
            .finish()
    }
}
