//! Core library for the blitzhttp router
//!
//! Request/response types, the handler and middleware contracts, the route
//! table, compiler and dispatcher, and the serving adapters.

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;
pub mod method;
pub mod middleware;
pub mod route_group;
pub mod router;
pub mod routing;
pub mod server;
pub mod status;

// Re-export commonly used types
pub use self::http::*;
pub use dispatch::{CompiledRoutes, DEFAULT_ALLOW, Dispatcher, RouterOptions, compile};
pub use error::*;
pub use handler::*;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use method::*;
pub use middleware::*;
pub use route_group::RouteGroup;
pub use router::Router;
pub use routing::*;
pub use server::Server;
pub use status::*;
