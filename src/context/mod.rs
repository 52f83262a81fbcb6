//! Per-request context passed along the middleware chain.

use crate::Request;

/// Per-request context.
///
/// Owned by whichever middleware currently holds it; a middleware may rewrite
/// the request before handing the context to [`Next::run`](crate::middleware::Next::run).
#[derive(Debug, Clone)]
pub struct Context {
    request: Request,
}

impl Context {
    /// Create a new context from a request
    pub fn new(request: Request) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Consume the context, returning the request for the transport.
    pub fn into_request(self) -> Request {
        self.request
    }
}

impl From<Request> for Context {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}
