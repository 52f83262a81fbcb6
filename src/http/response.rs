//! HTTP/1.1 responses.
//!
//! Provides a fluent builder API for constructing responses and a parser for
//! responses read off the wire by a transport.

use bytes::Bytes;
use thiserror::Error;

use super::{Body, Headers, StatusCode, UnknownStatus};

/// Errors that can occur while parsing an HTTP/1.1 response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response is incomplete — more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing status code")]
    MissingStatus,

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
}

/// An HTTP/1.1 response handed back through the pipeline.
///
/// # Examples
///
/// ```
/// use rttp_cache::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::Ok)
///     .header("Cache-Control", "max-age=60")
///     .body("hello");
///
/// assert_eq!(response.status(), StatusCode::Ok);
/// assert_eq!(response.headers().get("cache-control"), Some("max-age=60"));
/// assert!(response.body_ref().is_seekable());
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Body,
}

impl Response {
    /// Maximum number of headers we accept when parsing a response.
    const MAX_HEADERS: usize = 64;

    /// Creates a new response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Body::empty(),
        }
    }

    /// Creates a response from already captured parts.
    pub fn from_parts(status: StatusCode, headers: Headers, body: Body) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Parses a complete HTTP/1.1 response; everything after the header block
    /// becomes the buffered body.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Incomplete`] — the header block is not complete.
    /// - [`ResponseError::Parse`] — the data is malformed.
    /// - [`ResponseError::UnknownStatus`] — the status code is outside `100..=999`.
    pub fn parse(buf: &[u8]) -> Result<Self, ResponseError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw = httparse::Response::new(&mut headers);

        let body_offset = match raw.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(ResponseError::Incomplete),
        };

        let status = StatusCode::try_from(raw.code.ok_or(ResponseError::MissingStatus)?)?;

        let mut header_map = Headers::with_capacity(raw.headers.len());
        for header in raw.headers.iter() {
            if let Ok(value) = std::str::from_utf8(header.value) {
                header_map.insert(header.name, value);
            }
        }

        Ok(Self {
            status,
            headers: header_map,
            body: Body::Full(Bytes::copy_from_slice(&buf[body_offset..])),
        })
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends a header in-place. Intended for middleware pipelines that receive
    /// a `Response` from downstream and need to decorate it without consuming it.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Replaces all values of a header in-place.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body without consuming it.
    pub fn body_ref(&self) -> &Body {
        &self.body
    }

    /// Returns the body for reading or replacement.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Consumes the response, returning its body.
    pub fn into_body(self) -> Body {
        self.body
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok_response() {
        let raw = b"HTTP/1.1 200 OK\r\nCache-Control: max-age=40\r\nAge: 15\r\nContent-Length: 4\r\n\r\nbody";
        let response = Response::parse(raw).unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.headers().get("age"), Some("15"));
        assert_eq!(
            response.body_ref().as_bytes(),
            Some(&Bytes::from_static(b"body"))
        );
    }

    #[test]
    fn parse_not_modified() {
        let raw = b"HTTP/1.1 304 Not Modified\r\nETag: \"v2\"\r\n\r\n";
        let response = Response::parse(raw).unwrap();
        assert_eq!(response.status(), StatusCode::NotModified);
        assert_eq!(response.headers().get("etag"), Some("\"v2\""));
    }

    #[test]
    fn parse_incomplete() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-";
        assert!(matches!(Response::parse(raw), Err(ResponseError::Incomplete)));
    }

    #[test]
    fn parse_unlisted_status() {
        let raw = b"HTTP/1.1 418 I'm a teapot\r\nContent-Length: 5\r\n\r\nshort";
        let response = Response::parse(raw).unwrap();
        assert_eq!(response.status(), StatusCode::Other(418));
        assert_eq!(response.status().as_u16(), 418);
        assert_eq!(
            response.body_ref().as_bytes(),
            Some(&Bytes::from_static(b"short"))
        );
    }

    #[test]
    fn set_header_replaces() {
        let mut response = Response::new(StatusCode::Ok).header("X-Cache", "MISS");
        response.set_header("x-cache", "HIT");
        let values: Vec<_> = response.headers().get_all("X-Cache").collect();
        assert_eq!(values, vec!["HIT"]);
    }
}
