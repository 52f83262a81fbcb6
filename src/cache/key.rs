//! Cache key generators.
//!
//! A generator turns a request into the string that identifies its cached
//! response. The plugin digests that string with the configured
//! [`HashAlgorithm`](super::HashAlgorithm) before talking to the store.

use crate::Request;

/// Derives the cache key for a request.
///
/// Implementations must be deterministic and must not depend on anything but
/// the request. Header lookups are case-insensitive.
pub trait CacheKeyGenerator: Send + Sync {
    fn generate(&self, request: &Request) -> String;
}

/// Keys on the request line and the body: `METHOD URI BODY`.
///
/// An empty body adds nothing, so a bodiless `GET` yields `"GET https://example.com/"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleGenerator;

impl CacheKeyGenerator for SimpleGenerator {
    fn generate(&self, request: &Request) -> String {
        request_line_and_body(request)
    }
}

/// Same key as [`SimpleGenerator`]; for identifying requests outside of caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLineAndBodyGenerator;

impl CacheKeyGenerator for RequestLineAndBodyGenerator {
    fn generate(&self, request: &Request) -> String {
        request_line_and_body(request)
    }
}

/// Keys on the request line plus the credentials a shared cache must not mix up.
///
/// Appends ` Name:"value"` for each header name (default `Authorization` and
/// `Cookie`), using the comma-joined header line and an empty string for
/// absent headers. The body is ignored.
#[derive(Debug, Clone)]
pub struct SharedCacheKeyGenerator {
    header_names: Vec<String>,
}

impl SharedCacheKeyGenerator {
    pub fn new(header_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            header_names: header_names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for SharedCacheKeyGenerator {
    fn default() -> Self {
        Self::new(["Authorization", "Cookie"])
    }
}

impl CacheKeyGenerator for SharedCacheKeyGenerator {
    fn generate(&self, request: &Request) -> String {
        request_line_and_headers(request, &self.header_names)
    }
}

/// Keys on the request line plus an arbitrary, caller-chosen list of headers,
/// in the spirit of a `Vary` response header.
#[derive(Debug, Clone)]
pub struct HeaderCacheKeyGenerator {
    header_names: Vec<String>,
}

impl HeaderCacheKeyGenerator {
    pub fn new(header_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            header_names: header_names.into_iter().map(Into::into).collect(),
        }
    }
}

impl CacheKeyGenerator for HeaderCacheKeyGenerator {
    fn generate(&self, request: &Request) -> String {
        request_line_and_headers(request, &self.header_names)
    }
}

fn request_line_and_body(request: &Request) -> String {
    let body = String::from_utf8_lossy(request.body_bytes());
    if body.is_empty() {
        format!("{} {}", request.method(), request.uri())
    } else {
        format!("{} {} {}", request.method(), request.uri(), body)
    }
}

fn request_line_and_headers(request: &Request, header_names: &[String]) -> String {
    let headers: String = header_names
        .iter()
        .map(|name| format!(" {}:\"{}\"", name, request.headers().get_line(name)))
        .collect();
    format!("{} {}{}", request.method(), request.uri(), headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    fn get(uri: &str) -> Request {
        Request::new(Method::Get, uri)
    }

    #[test]
    fn simple_without_body_has_no_trailing_space() {
        let key = SimpleGenerator.generate(&get("http://example.com/foo"));
        assert_eq!(key, "GET http://example.com/foo");
    }

    #[test]
    fn simple_with_body() {
        let request = Request::new(Method::Post, "http://example.com/foo").body("bar");
        assert_eq!(SimpleGenerator.generate(&request), "POST http://example.com/foo bar");
    }

    #[test]
    fn request_line_and_body_matches_simple() {
        let request = Request::new(Method::Put, "/items/1").body("{\"a\":1}");
        assert_eq!(
            RequestLineAndBodyGenerator.generate(&request),
            SimpleGenerator.generate(&request)
        );
        assert_eq!(
            RequestLineAndBodyGenerator.generate(&get("/")),
            "GET /"
        );
    }

    #[test]
    fn shared_includes_credentials() {
        let request = get("http://example.com/foo")
            .header("Authorization", "bar")
            .header("Cookie", "baz");
        assert_eq!(
            SharedCacheKeyGenerator::default().generate(&request),
            "GET http://example.com/foo Authorization:\"bar\" Cookie:\"baz\""
        );
    }

    #[test]
    fn shared_with_missing_headers() {
        let request = get("http://example.com/foo").header("cookie", "a=1");
        assert_eq!(
            SharedCacheKeyGenerator::default().generate(&request),
            "GET http://example.com/foo Authorization:\"\" Cookie:\"a=1\""
        );
    }

    #[test]
    fn header_generator_uses_given_order() {
        let request = get("http://example.com/foo")
            .header("Accept", "text/html")
            .header("accept-language", "en")
            .header("Accept-Language", "fr");
        let generator = HeaderCacheKeyGenerator::new(["Accept-Language", "Accept"]);
        assert_eq!(
            generator.generate(&request),
            "GET http://example.com/foo Accept-Language:\"en, fr\" Accept:\"text/html\""
        );
    }

    #[test]
    fn header_generator_without_headers_is_request_line() {
        let generator = HeaderCacheKeyGenerator::new(Vec::<String>::new());
        assert_eq!(generator.generate(&get("/plain")), "GET /plain");
    }

    #[test]
    fn generators_ignore_unlisted_headers_and_body() {
        let generator = SharedCacheKeyGenerator::new(["Authorization"]);
        let a = get("/a").header("Authorization", "t").header("X-Trace", "1");
        let b = get("/a").header("authorization", "t").body("ignored");
        assert_eq!(generator.generate(&a), generator.generate(&b));
    }

    #[test]
    fn generators_are_deterministic() {
        let request = Request::new(Method::Post, "/q").header("Cookie", "c").body("x");
        let generators: Vec<Box<dyn CacheKeyGenerator>> = vec![
            Box::new(SimpleGenerator),
            Box::new(RequestLineAndBodyGenerator),
            Box::new(SharedCacheKeyGenerator::default()),
            Box::new(HeaderCacheKeyGenerator::new(["Cookie"])),
        ];
        for generator in &generators {
            assert_eq!(
                generator.generate(&request),
                generator.generate(&request.clone())
            );
        }
    }
}
