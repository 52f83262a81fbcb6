//! The record persisted for each cached response.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::http::{Headers, Response, StatusCode, StreamFactory};

/// Status line and headers of a cached response; the body lives on the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: Headers,
}

/// A cached response together with its freshness bookkeeping.
///
/// Serialized with camelCase keys. Entries written before `createdAt` or
/// `etag` were tracked still decode; they simply can't be revalidated
/// conditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub response: CachedResponse,
    pub body: Bytes,
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Unix seconds after which the entry must be revalidated; `None` defers
    /// to the store's own expiry.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub etag: Vec<String>,
}

impl CacheEntry {
    /// Captures `response` (whose body has already been drained into `body`).
    pub fn capture(
        response: &Response,
        body: Bytes,
        created_at: i64,
        expires_at: Option<i64>,
    ) -> Self {
        Self {
            response: CachedResponse {
                status: response.status(),
                headers: response.headers().clone(),
            },
            body,
            created_at: Some(created_at),
            expires_at,
            etag: response
                .headers()
                .get_all("etag")
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Returns `true` if the entry may be served at `now` without revalidation.
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    /// The first non-empty stored ETag.
    pub fn etag(&self) -> Option<&str> {
        self.etag
            .iter()
            .map(String::as_str)
            .find(|etag| !etag.is_empty())
    }

    /// Rebuilds the response with a body freshly created by `factory`.
    pub fn to_response(&self, factory: &dyn StreamFactory) -> Response {
        Response::from_parts(
            self.response.status,
            self.response.headers.clone(),
            factory.create_stream(self.body.clone()),
        )
    }
}
