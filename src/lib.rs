//! blitzhttp - a small HTTP router
//!
//! Middleware is composed once, at registration. Exact-match routes are served
//! from a compiled lookup that is rebuilt after every change, and anything
//! unmatched falls through to parameterized, wildcard and catch-all routes.

// Re-export core functionality
pub use blitz_core::*;

/// Re-exported so `#[async_trait]` middleware impls need no extra dependency
pub use async_trait::async_trait;

// Re-export optional crates
#[cfg(feature = "config")]
pub use blitz_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Auth,
        BoxedHandler,
        Dispatcher,
        Error,
        HttpMethod,
        HttpRequest,
        HttpResponse,
        Logger,
        MethodSlot,
        Middleware,
        Next,
        RouteGroup,
        Router,
        RouterOptions,
        Server,
        async_trait,
        auth,
        get_params,
        handler,
        logger,
        middleware_fn,
    };
}
