//! Route groups
//!
//! A group binds a path prefix and a middleware list to a router. Routes
//! registered through the group get the prefix prepended and run the group's
//! middleware before their own.
//!
//! ```
//! use blitz_core::{Error, HttpRequest, HttpResponse, Router, auth};
//!
//! let mut router = Router::new();
//! let mut api = router.group("/api/v1", vec![]);
//! api.get("/users", |_req: HttpRequest| async { Ok::<_, Error>(HttpResponse::ok()) }, vec![]);
//!
//! let mut admin = api.group("admin", vec![auth()]);
//! admin.delete("/users", |_req: HttpRequest| async { Ok::<_, Error>(HttpResponse::ok()) }, vec![]);
//!
//! assert_eq!(router.route_count(), 2);
//! ```

use crate::handler::IntoHandler;
use crate::method::MethodSlot;
use crate::middleware::Middleware;
use crate::router::{Router, is_catch_all};
use std::sync::Arc;

/// A prefix and middleware list bound to a [`Router`]
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(
        router: &'r mut Router,
        prefix: &str,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            router,
            prefix: prefix.trim_matches('/').to_string(),
            middleware,
        }
    }

    /// Get the prefix for this group, without surrounding `/`
    pub fn get_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get_middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Apply the group's prefix to a path
    ///
    /// ```
    /// use blitz_core::Router;
    ///
    /// let mut router = Router::new();
    /// let group = router.group("/api/v1/", vec![]);
    /// assert_eq!(group.apply_prefix("/users/"), "api/v1/users");
    /// ```
    pub fn apply_prefix(&self, path: &str) -> String {
        format!("{}/{}", self.prefix, path.trim_matches('/'))
            .trim_matches('/')
            .to_string()
    }

    fn inherit(&self, mws: Vec<Arc<dyn Middleware>>) -> Vec<Arc<dyn Middleware>> {
        let mut all = Vec::with_capacity(self.middleware.len() + mws.len());
        all.extend_from_slice(&self.middleware);
        all.extend(mws);
        all
    }

    /// Register a handler for one method slot under the group prefix
    pub fn handle<H, Args>(
        &mut self,
        slot: MethodSlot,
        path: &str,
        h: H,
        mws: Vec<Arc<dyn Middleware>>,
    ) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        let path = self.apply_prefix(path);
        let mws = self.inherit(mws);
        self.router.handle(slot, &path, h, mws);
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

    /// Register for all five methods under the prefix.
    ///
    /// `"*"` sets the router-wide catch-all, unprefixed, wrapped in the
    /// group's middleware.
    pub fn any<H, Args>(&mut self, path: &str, h: H, mws: Vec<Arc<dyn Middleware>>) -> &mut Self
    where
        H: IntoHandler<Args>,
    {
        let mws = self.inherit(mws);
        if is_catch_all(path) {
            self.router.catch_all(h, mws);
        } else {
            let path = self.apply_prefix(path);
            self.router.any(&path, h, mws);
        }
        self
    }

    /// Open a nested group. Prefixes and middleware lists concatenate.
    pub fn group(&mut self, prefix: &str, mws: Vec<Arc<dyn Middleware>>) -> RouteGroup<'_> {
        let prefix = self.apply_prefix(prefix);
        let middleware = self.inherit(mws);
        RouteGroup::new(&mut *self.router, &prefix, middleware)
    }
}
