//! Outgoing HTTP/1.1 requests.

use bytes::Bytes;

use super::{Headers, Method};

/// An HTTP/1.1 request travelling through the client pipeline.
///
/// The target URI is kept exactly as given (absolute-form such as
/// `https://example.com/a?b` or origin-form such as `/a?b`); [`path`](Self::path)
/// is derived from it. The body is stored as a [`Bytes`] buffer, so cloning a
/// request is cheap.
///
/// # Examples
///
/// ```
/// use rttp_cache::http::{Method, Request};
///
/// let request = Request::new(Method::Get, "https://example.com/hello?name=world")
///     .header("Accept", "text/html");
///
/// assert_eq!(request.uri(), "https://example.com/hello?name=world");
/// assert_eq!(request.path(), "/hello");
/// assert_eq!(request.headers().get("accept"), Some("text/html"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    path: String,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let path = target_path(&uri);
        Self {
            method,
            uri,
            path,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request target exactly as supplied.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the request path (without scheme, authority or query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request headers for in-place modification.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Returns the request body bytes.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }
}

// Absolute-form targets lose their scheme and authority; the query and
// fragment are dropped. An empty path is `/`.
fn target_path(target: &str) -> String {
    let target = target.split('#').next().unwrap_or_default();
    let rest = match target.find("://") {
        Some(scheme_end) => {
            let after_scheme = &target[scheme_end + 3..];
            match after_scheme.find(['/', '?']) {
                Some(pos) => &after_scheme[pos..],
                None => "",
            }
        }
        None => target,
    };

    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() {
        "/".to_owned()
    } else {
        path.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_form_target() {
        let req = Request::new(Method::Get, "/search?q=rust&page=2");
        assert_eq!(req.uri(), "/search?q=rust&page=2");
        assert_eq!(req.path(), "/search");
    }

    #[test]
    fn absolute_form_target() {
        let req = Request::new(Method::Get, "https://example.com");
        assert_eq!(req.path(), "/");

        let req = Request::new(Method::Get, "http://example.com:8080/foo/bar?x=1#frag");
        assert_eq!(req.path(), "/foo/bar");

        let req = Request::new(Method::Get, "https://example.com?x=1");
        assert_eq!(req.path(), "/");
    }

    #[test]
    fn builder_sets_headers_and_body() {
        let req = Request::new(Method::Post, "/submit")
            .header("Content-Type", "text/plain")
            .body("payload");
        assert_eq!(req.headers().get("content-type"), Some("text/plain"));
        assert_eq!(req.body_bytes(), &Bytes::from_static(b"payload"));
    }
}
