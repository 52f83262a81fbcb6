//! Middleware pipeline — composable before/after logic around the transport.
//!
//! This module defines the core types for building an ordered middleware stack.
//! Each middleware wraps the next layer, enabling request rewriting,
//! short-circuit responses, and response decoration without coupling the
//! transport to infrastructure concerns such as caching.
//!
//! ## Core types
//!
//! - [`Middleware`] — trait implemented by all middleware.
//! - [`Next`] — cursor into the remaining middleware chain; call [`Next::run`] to
//!   advance to the next layer.
//! - [`MiddlewareHandler`] — type-erased, cheaply-cloneable middleware function.
//! - [`from_middleware`] — converts a [`Middleware`] into a [`MiddlewareHandler`].
//! - [`LoggerMiddleware`] — built-in request/response logger.

use std::{future::Future, pin::Pin, sync::Arc};
use tokio::time::Instant;

use crate::{Response, context::Context, error::Result};

/// A pinned, boxed, `Send` future — the return type of every pipeline stage.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A cursor into the remaining middleware chain for a single request.
///
/// `Next` is passed to each middleware's [`Middleware::handle`] implementation.
/// Calling [`Next::run`] advances the cursor by one position and invokes the next
/// middleware (or fails with [`Error::ChainExhausted`](crate::Error::ChainExhausted)
/// when the chain ends without reaching a transport).
///
/// `Next` is consumed on each call to [`run`](Self::run), so it cannot be called
/// more than once per middleware invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use rttp_cache::{Response, context::Context, error::Result};
/// use rttp_cache::middleware::{BoxFuture, Middleware, Next};
///
/// struct PassThrough;
///
/// impl Middleware for PassThrough {
///     fn handle(&self, ctx: Context, next: Next) -> BoxFuture<Result<Response>> {
///         Box::pin(async move { next.run(ctx).await })
///     }
/// }
/// ```
pub struct Next {
    middlewares: Vec<MiddlewareHandler>,
    // Tracks which middleware to invoke on the next `run` call.
    index: usize,
}

/// A type-erased, reference-counted middleware function.
///
/// Every entry in the middleware stack is stored as a `MiddlewareHandler`.
/// The [`Arc`] wrapper makes handlers cheap to clone so that [`Next`] can
/// advance through the chain without copying closures.
///
/// Construct one with [`from_middleware`] or by wrapping a closure directly:
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use rttp_cache::{Response, context::Context, error::Result};
/// use rttp_cache::middleware::{BoxFuture, MiddlewareHandler, Next};
///
/// let handler: MiddlewareHandler =
///     Arc::new(|ctx: Context, next: Next| -> BoxFuture<Result<Response>> {
///         Box::pin(async move { next.run(ctx).await })
///     });
/// ```
pub type MiddlewareHandler =
    Arc<dyn Fn(Context, Next) -> BoxFuture<Result<Response>> + Send + Sync + 'static>;

/// Converts a [`Middleware`] implementation into a [`MiddlewareHandler`].
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use rttp_cache::middleware::{LoggerMiddleware, from_middleware};
///
/// let handler = from_middleware(Arc::new(LoggerMiddleware));
/// ```
pub fn from_middleware<M>(middleware: Arc<M>) -> MiddlewareHandler
where
    M: Middleware + 'static,
{
    Arc::new(move |ctx: Context, next: Next| middleware.handle(ctx, next))
}

impl Next {
    /// Creates a new `Next` positioned at the start of the given middleware stack.
    pub fn new(middlewares: Vec<MiddlewareHandler>) -> Self {
        Self {
            middlewares,
            index: 0,
        }
    }

    /// Invokes the next middleware in the chain and returns its response.
    ///
    /// Advances the internal cursor by one, clones the handler at the current
    /// position, and awaits it.
    ///
    /// # Errors
    ///
    /// Whatever the downstream stage returns, unchanged, or
    /// [`Error::ChainExhausted`](crate::Error::ChainExhausted) when no stage is left.
    pub async fn run(mut self, ctx: Context) -> Result<Response> {
        if self.index < self.middlewares.len() {
            let handler = self.middlewares[self.index].clone();
            self.index += 1;
            handler(ctx, self).await
        } else {
            Err(crate::Error::ChainExhausted)
        }
    }
}

/// The core trait for all pipeline middleware.
///
/// Implementors receive a [`Context`] and a [`Next`] cursor. They may:
///
/// - **Pass through** — call `next.run(ctx).await` without modification.
/// - **Short-circuit** — return a [`Response`] directly without calling `next`.
/// - **Decorate** — rewrite the request, call `next.run(ctx).await`, inspect the
///   response, and return a modified copy.
///
/// # Contract
///
/// - Implementations **must** be `Send + Sync` because middleware is shared across
///   Tokio tasks.
/// - `handle` **must** return a pinned, `Send` future so it can be awaited across
///   `.await` points in multi-threaded runtimes.
/// - Errors from `next` **should** be propagated, not swallowed.
pub trait Middleware: Send + Sync {
    /// Handle the request and optionally delegate to the next middleware.
    fn handle(&self, ctx: Context, next: Next) -> BoxFuture<Result<Response>>;
}

/// Built-in middleware that logs each request's method, URI, status, and duration.
///
/// Emits a single `tracing::info!` line after the downstream stage completes,
/// in the format:
///
/// ```text
/// METHOD uri - STATUS (duration)
/// ```
///
/// Failed exchanges are logged at `warn` level and the error is returned as is.
pub struct LoggerMiddleware;

impl Middleware for LoggerMiddleware {
    fn handle(&self, ctx: Context, next: Next) -> BoxFuture<Result<Response>> {
        Box::pin(async move {
            let start = Instant::now();
            let method = ctx.request().method().as_str().to_string();
            let uri = ctx.request().uri().to_string();

            let result = next.run(ctx).await;
            let duration = start.elapsed();

            match &result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    tracing::info!("{} {} - {} ({:?})", method, uri, status, duration);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "{} {} - failed ({:?})", method, uri, duration);
                }
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, Request, StatusCode};

    fn responder(status: StatusCode) -> MiddlewareHandler {
        Arc::new(move |_ctx: Context, _next: Next| -> BoxFuture<Result<Response>> {
            Box::pin(async move { Ok(Response::new(status)) })
        })
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let ctx = Context::new(Request::new(Method::Get, "/"));
        let result = Next::new(vec![]).run(ctx).await;
        assert!(matches!(result, Err(crate::Error::ChainExhausted)));
    }

    #[tokio::test]
    async fn logger_passes_response_through() {
        let chain = vec![
            from_middleware(Arc::new(LoggerMiddleware)),
            responder(StatusCode::Gone),
        ];
        let ctx = Context::new(Request::new(Method::Get, "/gone"));
        let response = Next::new(chain).run(ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::Gone);
    }

    #[tokio::test]
    async fn middleware_can_rewrite_request() {
        let tag: MiddlewareHandler =
            Arc::new(|mut ctx: Context, next: Next| -> BoxFuture<Result<Response>> {
                Box::pin(async move {
                    ctx.request_mut().headers_mut().set("X-Tag", "1");
                    next.run(ctx).await
                })
            });
        let echo: MiddlewareHandler =
            Arc::new(|ctx: Context, _next: Next| -> BoxFuture<Result<Response>> {
                Box::pin(async move {
                    let tag = ctx.request().headers().get_line("x-tag");
                    Ok(Response::new(StatusCode::Ok).header("X-Seen", tag))
                })
            });

        let ctx = Context::new(Request::new(Method::Get, "/"));
        let response = Next::new(vec![tag, echo]).run(ctx).await.unwrap();
        assert_eq!(response.headers().get("x-seen"), Some("1"));
    }
}
