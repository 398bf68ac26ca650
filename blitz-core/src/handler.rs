//! Handler contract
//!
//! A handler is any `Fn(HttpRequest) -> impl Future<Output = Result<HttpResponse, Error>>`.
//! Handlers stay monomorphized behind the `Handler` trait and are type-erased
//! once, at registration, into a `BoxedHandler`. Composed middleware chains are
//! themselves `BoxedHandler`s, so a request pays one vtable call per layer.

use crate::{Error, HttpRequest, HttpResponse};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by type-erased handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// A handler that can process HTTP requests.
pub trait Handler: Clone + Send + Sync + 'static {
    /// The future returned by `call`.
    type Future: Future<Output = Result<HttpResponse, Error>> + Send + 'static;

    /// Handle an HTTP request.
    fn call(&self, req: HttpRequest) -> Self::Future;
}

/// Trait for converting function types into handlers.
///
/// ```ignore
/// router.get("/", my_handler, vec![]);  // Works for any IntoHandler
/// ```
pub trait IntoHandler<Args>: Clone + Send + Sync + 'static {
    type Handler: Handler;

    fn into_handler(self) -> Self::Handler;

    /// Type-erase into a `BoxedHandler`.
    fn into_boxed(self) -> BoxedHandler
    where
        Self: Sized,
    {
        BoxedHandler::new(self.into_handler())
    }
}

/// A function handler that wraps an async function.
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    #[inline(always)]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(HttpRequest) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    type Future = Fut;

    #[inline(always)]
    fn call(&self, req: HttpRequest) -> Self::Future {
        (self.f)(req)
    }
}

impl<F, Fut> IntoHandler<(HttpRequest,)> for F
where
    F: Fn(HttpRequest) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    type Handler = FnHandler<F>;

    #[inline(always)]
    fn into_handler(self) -> Self::Handler {
        FnHandler::new(self)
    }
}

impl IntoHandler<()> for BoxedHandler {
    type Handler = BoxedHandler;

    fn into_handler(self) -> Self::Handler {
        self
    }

    fn into_boxed(self) -> BoxedHandler {
        self
    }
}

/// Type-erased handler for storing in route slots.
///
/// Cloning is an `Arc` bump; two clones share identity (see [`BoxedHandler::ptr_eq`]).
pub struct BoxedHandler {
    inner: Arc<dyn ErasedHandler>,
}

impl BoxedHandler {
    #[inline]
    pub fn new<H: Handler>(handler: H) -> Self {
        Self {
            inner: Arc::new(HandlerWrapper {
                handler,
                _marker: PhantomData,
            }),
        }
    }

    #[inline(always)]
    pub fn call(&self, req: HttpRequest) -> HandlerFuture {
        self.inner.call(req)
    }

    /// Whether both values refer to the same underlying handler
    pub fn ptr_eq(&self, other: &BoxedHandler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Clone for BoxedHandler {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Handler for BoxedHandler {
    type Future = HandlerFuture;

    #[inline(always)]
    fn call(&self, req: HttpRequest) -> Self::Future {
        BoxedHandler::call(self, req)
    }
}

impl std::fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedHandler").finish_non_exhaustive()
    }
}

trait ErasedHandler: Send + Sync {
    fn call(&self, req: HttpRequest) -> HandlerFuture;
}

struct HandlerWrapper<H: Handler> {
    handler: H,
    _marker: PhantomData<fn() -> H::Future>,
}

impl<H: Handler> ErasedHandler for HandlerWrapper<H> {
    #[inline(always)]
    fn call(&self, req: HttpRequest) -> HandlerFuture {
        Box::pin(self.handler.call(req))
    }
}

/// Create a type-erased handler from an async function.
///
/// ```
/// use blitz_core::{handler, Error, HttpRequest, HttpResponse};
///
/// async fn hello(_req: HttpRequest) -> Result<HttpResponse, Error> {
///     Ok(HttpResponse::text("hello"))
/// }
///
/// let h = handler(hello);
/// # let _ = h;
/// ```
#[inline]
pub fn handler<H, Args>(h: H) -> BoxedHandler
where
    H: IntoHandler<Args>,
{
    h.into_boxed()
}
