//! HTTP methods and the fixed handler-slot index used by routes

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods understood by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// The handler slot this method dispatches to, if routes can hold one
    pub fn slot(&self) -> Option<MethodSlot> {
        match self {
            HttpMethod::GET => Some(MethodSlot::Get),
            HttpMethod::POST => Some(MethodSlot::Post),
            HttpMethod::PUT => Some(MethodSlot::Put),
            HttpMethod::DELETE => Some(MethodSlot::Delete),
            HttpMethod::PATCH => Some(MethodSlot::Patch),
            HttpMethod::HEAD | HttpMethod::OPTIONS => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index into a route's fixed array of handler slots.
///
/// The five concrete slots mirror the registrable verbs. `Any` is a
/// fallback slot: it is only filled by an explicit registration against
/// `MethodSlot::Any` and is consulted when the concrete slot is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodSlot {
    Get = 0,
    Post,
    Put,
    Delete,
    Patch,
    Any,
}

impl MethodSlot {
    /// Number of slots held by every route
    pub const COUNT: usize = 6;

    /// The slots a catch-all or `any` registration fills
    pub const CONCRETE: [MethodSlot; 5] = [
        MethodSlot::Get,
        MethodSlot::Post,
        MethodSlot::Put,
        MethodSlot::Delete,
        MethodSlot::Patch,
    ];

    /// Map a raw request method to its slot.
    ///
    /// Matching is exact (`"get"` is not `GET`), as the wire format is.
    #[inline]
    pub fn for_method(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(MethodSlot::Get),
            "POST" => Some(MethodSlot::Post),
            "PUT" => Some(MethodSlot::Put),
            "DELETE" => Some(MethodSlot::Delete),
            "PATCH" => Some(MethodSlot::Patch),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}
