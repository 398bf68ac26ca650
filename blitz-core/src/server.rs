//! Hosting adapters
//!
//! `Server` runs a frozen `Dispatcher` over hyper's HTTP/1 connection handler
//! on tokio, and `Dispatcher` implements `tower_service::Service` so it can be
//! mounted inside any tower stack. Handler errors become responses here, not
//! in the dispatcher.

use crate::dispatch::Dispatcher;
use crate::logging::{debug, error, info};
use crate::http::parse_query_string;
use crate::{Error, HttpRequest, HttpResponse};
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_service::Service;

// ============================================================================
// HTTP Crate Conversions
// ============================================================================

impl HttpRequest {
    /// Build from an `http::Request`.
    ///
    /// The path is percent-decoded before routing; the query string is
    /// decoded into `query_params`.
    pub fn from_http(req: Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();

        let mut request = HttpRequest {
            method: parts.method.as_str().to_string(),
            path: decode_path(parts.uri.path()),
            query_params: parts.uri.query().map(parse_query_string).unwrap_or_default(),
            ..HttpRequest::default()
        };
        for (name, value) in &parts.headers {
            if let Ok(value) = value.to_str() {
                request.headers.insert(name.to_string(), value.to_string());
            }
        }
        request.body = body.to_vec();
        request
    }
}

fn decode_path(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(path) => path.into_owned(),
        Err(_) => {
            debug!(path = %raw, "Path is not valid UTF-8 once decoded, routing it as sent");
            raw.to_string()
        }
    }
}

impl HttpResponse {
    /// Convert into an `http::Response`.
    ///
    /// Headers that are not valid HTTP tokens are dropped; an invalid status
    /// code becomes `500`.
    pub fn into_http(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers = response.headers_mut();
        for (key, value) in self.headers {
            match (
                HeaderName::try_from(key.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => debug!(header = %key, "Dropping invalid response header"),
            }
        }
        response
    }
}

// ============================================================================
// Tower Service
// ============================================================================

impl Service<HttpRequest> for Dispatcher {
    type Response = HttpResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: HttpRequest) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { dispatcher.serve(req).await })
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP/1 server for a [`Dispatcher`]
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind a listener, e.g. `Server::bind("127.0.0.1:8080")`
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the listener fails
    pub async fn serve(self, dispatcher: Dispatcher) -> Result<(), Error> {
        self.serve_with_shutdown(dispatcher, std::future::pending())
            .await
    }

    /// Serve until `signal` resolves. Connections already accepted run to
    /// completion on their own tasks.
    pub async fn serve_with_shutdown<F>(
        self,
        dispatcher: Dispatcher,
        signal: F,
    ) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = self.local_addr()?;
        info!(%addr, routes = dispatcher.route_count(), "Server listening");

        tokio::pin!(signal);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => accepted?,
                _ = &mut signal => {
                    info!(%addr, "Shutdown signal received");
                    return Ok(());
                }
            };

            let io = TokioIo::new(stream);
            let dispatcher = dispatcher.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let dispatcher = dispatcher.clone();
                    async move { Ok::<_, Infallible>(handle_request(req, &dispatcher).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!(%peer, error = %err, "Error serving connection");
                }
            });
        }
    }
}

/// Handle one hyper request end to end
async fn handle_request<B>(req: Request<B>, dispatcher: &Dispatcher) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            return Error::BadRequest(format!("failed to read request body: {err}"))
                .into_response()
                .into_http();
        }
    };

    let request = HttpRequest::from_http(Request::from_parts(parts, body));
    let response = match dispatcher.serve(request).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, status = err.status_code(), "Handler failed");
            err.into_response()
        }
    };
    response.into_http()
}
