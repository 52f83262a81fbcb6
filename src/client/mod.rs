//! The client pipeline: an ordered middleware stack in front of a transport.
//!
//! A [`Client`] owns the middleware stack and a [`Transport`]. Each call to
//! [`Client::send`] walks the request through every middleware in
//! registration order and finally hands it to the transport.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::Result;
use crate::middleware::{BoxFuture, Middleware, MiddlewareHandler, Next, from_middleware};
use crate::{Request, Response};

/// The final stage of the pipeline: performs the actual exchange.
///
/// Any `Fn(Request) -> impl Future<Output = Result<Response>> + Send` that is
/// also `Send + Sync + 'static` implements this trait automatically via the
/// blanket impl below.
pub trait Transport: Send + Sync + 'static {
    /// Send the request and resolve with the origin's response.
    fn send(&self, request: Request) -> BoxFuture<Result<Response>>;
}

impl<T, F> Transport for T
where
    T: Fn(Request) -> F + Send + Sync + 'static,
    F: Future<Output = Result<Response>> + Send + 'static,
{
    fn send(&self, request: Request) -> BoxFuture<Result<Response>> {
        Box::pin((self)(request))
    }
}

/// A request pipeline terminating in a [`Transport`].
///
/// # Examples
///
/// ```rust,no_run
/// use rttp_cache::{Client, Request, Response, StatusCode, Method};
/// use rttp_cache::middleware::LoggerMiddleware;
///
/// # async fn demo() -> rttp_cache::error::Result<()> {
/// let client = Client::new(|_req: Request| async {
///     Ok::<_, rttp_cache::Error>(Response::new(StatusCode::Ok).body("Hello!"))
/// })
/// .with(LoggerMiddleware);
///
/// let response = client.send(Request::new(Method::Get, "https://example.com/")).await?;
/// assert_eq!(response.status(), StatusCode::Ok);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    middlewares: Vec<MiddlewareHandler>,
    transport: MiddlewareHandler,
}

impl Client {
    /// Creates a client with an empty middleware stack.
    pub fn new<T: Transport>(transport: T) -> Self {
        let transport = Arc::new(transport);
        let terminal: MiddlewareHandler =
            Arc::new(move |ctx: Context, _next: Next| transport.send(ctx.into_request()));
        Self {
            middlewares: Vec::new(),
            transport: terminal,
        }
    }

    /// Appends a middleware. Middleware run in the order they were added.
    #[must_use]
    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(from_middleware(Arc::new(middleware)));
        self
    }

    /// Sends a request through the pipeline.
    ///
    /// # Errors
    ///
    /// Any error raised by a middleware or the transport, unchanged.
    pub async fn send(&self, request: Request) -> Result<Response> {
        debug!(
            method = %request.method(),
            uri = %request.uri(),
            layers = self.middlewares.len(),
            "dispatching request"
        );

        let mut chain = self.middlewares.clone();
        chain.push(Arc::clone(&self.transport));
        Next::new(chain).run(Context::new(request)).await
    }
}
