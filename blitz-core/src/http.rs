//! HTTP request and response types

use crate::HttpStatus;
use std::collections::HashMap;

/// HTTP request wrapper
///
/// `path` never contains the query string; [`HttpRequest::new`] splits it off
/// and decodes it into `query_params`.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// Value attached by the dispatcher when a catch-all, wildcard or
    /// parameterized route matched.
    pub route_param: Option<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query_params) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), parse_query_string(q)),
            None => (path, HashMap::new()),
        };

        Self {
            method: method.into(),
            path,
            query_params,
            ..Self::default()
        }
    }

    /// Add a header (builder style)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Get a named `:param` segment captured by a parameterized route
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// The matched value attached by the dispatcher, if any
    pub fn route_param(&self) -> Option<&str> {
        self.route_param.as_deref()
    }
}

/// Returns the matched route parameter, or `""` when none was attached.
///
/// ```
/// use blitz_core::{HttpRequest, get_params};
///
/// let req = HttpRequest::new("GET", "/anything");
/// assert_eq!(get_params(&req), "");
/// ```
pub fn get_params(req: &HttpRequest) -> &str {
    req.route_param().unwrap_or_default()
}

pub(crate) fn parse_query_string(query: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str(query).unwrap_or_default()
}

/// HTTP response wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(HttpStatus::Ok.code())
    }

    pub fn no_content() -> Self {
        Self::new(HttpStatus::NoContent.code())
    }

    pub fn unauthorized() -> Self {
        Self::text_with_status(HttpStatus::Unauthorized.code(), "Unauthorized")
    }

    pub fn not_found() -> Self {
        Self::text_with_status(HttpStatus::NotFound.code(), "404 page not found")
    }

    pub fn internal_server_error() -> Self {
        Self::new(HttpStatus::InternalServerError.code())
    }

    /// 200 response with a plain-text body
    pub fn text(body: impl Into<String>) -> Self {
        Self::text_with_status(HttpStatus::Ok.code(), body)
    }

    pub fn text_with_status(status: u16, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8, lossily
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_splits_query() {
        let req = HttpRequest::new("GET", "/search?q=rust&page=2");
        assert_eq!(req.path, "/search");
        assert_eq!(req.query("q"), Some("rust"));
        assert_eq!(req.query("page"), Some("2"));
    }

    #[test]
    fn test_query_is_percent_decoded() {
        let req = HttpRequest::new("GET", "/s?name=john%20doe");
        assert_eq!(req.query("name"), Some("john doe"));
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let req = HttpRequest::new("GET", "/").with_header("Authorization", "Bearer x");
        assert_eq!(req.header("authorization"), Some("Bearer x"));
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer x"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn test_get_params_defaults_to_empty() {
        let mut req = HttpRequest::new("GET", "/x");
        assert_eq!(get_params(&req), "");

        req.route_param = Some("x".to_string());
        assert_eq!(get_params(&req), "x");
    }

    #[test]
    fn test_response_helpers() {
        assert_eq!(HttpResponse::ok().status, 200);
        assert_eq!(HttpResponse::no_content().status, 204);
        assert_eq!(HttpResponse::unauthorized().status, 401);
        assert_eq!(HttpResponse::unauthorized().body_str(), "Unauthorized");

        let not_found = HttpResponse::not_found();
        assert_eq!(not_found.status, 404);
        assert_eq!(not_found.body_str(), "404 page not found");
        assert_eq!(
            not_found.header("content-type"),
            Some("text/plain; charset=utf-8")
        );
    }
}
