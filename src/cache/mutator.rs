//! Response decoration after the caching decision is made.

use crate::{Request, Response};

use super::entry::CacheEntry;

/// Post-processes the response leaving the cache layer.
///
/// Runs once the caching decision is final, so it can only change what the
/// caller observes, never what gets stored.
pub trait ResponseMutator: Send + Sync {
    /// `cache_hit` is `true` when the response was served from `entry`.
    fn mutate(
        &self,
        request: &Request,
        response: Response,
        cache_hit: bool,
        entry: Option<&CacheEntry>,
    ) -> Response;
}

/// Marks responses with a `HIT`/`MISS` header.
#[derive(Debug, Clone)]
pub struct AddHeaderResponseMutator {
    header_name: String,
}

impl AddHeaderResponseMutator {
    pub fn new(header_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
        }
    }
}

impl Default for AddHeaderResponseMutator {
    fn default() -> Self {
        Self::new("X-Cache")
    }
}

impl ResponseMutator for AddHeaderResponseMutator {
    fn mutate(
        &self,
        _request: &Request,
        mut response: Response,
        cache_hit: bool,
        _entry: Option<&CacheEntry>,
    ) -> Response {
        response.set_header(self.header_name.as_str(), if cache_hit { "HIT" } else { "MISS" });
        response
    }
}
