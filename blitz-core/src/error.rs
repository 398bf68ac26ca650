//! Error types for blitzhttp
//!
//! The dispatcher never produces an `Error`: an unmatched request is a 404
//! response and a rejected one a 401 response. These errors come from
//! handlers, middleware and the serving adapter, and the router passes them
//! through unchanged.

use crate::{HttpResponse, HttpStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the HTTP status for this error
    pub fn http_status(&self) -> HttpStatus {
        match self {
            Error::BadRequest(_) => HttpStatus::BadRequest,
            Error::Http(_) => HttpStatus::BadGateway,
            Error::Config(_) | Error::Internal(_) | Error::Io(_) => {
                HttpStatus::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.http_status().code()
    }

    /// Render this error as a JSON response.
    ///
    /// Used by the serving adapter once a handler has failed; the router
    /// itself does not catch handler errors.
    pub fn into_response(self) -> HttpResponse {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status,
        });

        match serde_json::to_vec(&body) {
            Ok(bytes) => HttpResponse::new(status)
                .with_header("Content-Type", "application/json")
                .with_body(bytes),
            Err(_) => HttpResponse::internal_server_error(),
        }
    }
}

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Self {
        Error::Http(err.to_string())
    }
}
