//! The caching middleware.
//!
//! For every request with a cacheable method the plugin derives a key, looks
//! it up in the store and then either
//!
//! 1. serves a fresh entry without calling the next stage,
//! 2. adds `If-Modified-Since`/`If-None-Match` for a stale entry and forwards, or
//! 3. forwards unchanged on a miss.
//!
//! When the response comes back a `304` refreshes the stored entry and is
//! answered from it; any other cacheable response is captured and stored.
//!
//! Nothing here locks around the read-then-write sequence: two concurrent
//! misses for the same key both reach the origin and the last write wins.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::Context;
use crate::error::Result;
use crate::http::{BufferedStreamFactory, StatusCode, StreamFactory};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::{Request, Response};

use super::clock::{Clock, SystemClock};
use super::config::CacheConfig;
use super::entry::CacheEntry;
use super::http_date::format_rfc850_date;
use super::mutator::ResponseMutator;
use super::policy;
use super::store::CacheStore;

/// HTTP caching middleware backed by a [`CacheStore`].
///
/// # Examples
///
/// ```rust,no_run
/// use rttp_cache::cache::{AddHeaderResponseMutator, CacheConfig, CacheOptions, CachePlugin, MemoryStore};
/// use rttp_cache::{Client, Request, Response, StatusCode};
///
/// # fn build() -> Result<Client, rttp_cache::Error> {
/// let config = CacheConfig::client_cache(CacheOptions { default_ttl: Some(60), ..Default::default() })?;
/// let cache = CachePlugin::new(MemoryStore::new(), config)
///     .with_mutator(AddHeaderResponseMutator::default());
///
/// let client = Client::new(|_req: Request| async {
///     Ok::<_, rttp_cache::Error>(Response::new(StatusCode::Ok).body("hello"))
/// })
/// .with(cache);
/// # Ok(client)
/// # }
/// ```
#[derive(Clone)]
pub struct CachePlugin {
    store: Arc<dyn CacheStore>,
    stream_factory: Arc<dyn StreamFactory>,
    config: Arc<CacheConfig>,
    mutators: Vec<Arc<dyn ResponseMutator>>,
    clock: Arc<dyn Clock>,
}

// Carried from the lookup to the response handling of one request.
struct CacheLookup {
    key: String,
    entry: Option<CacheEntry>,
    storable: bool,
}

impl CachePlugin {
    pub fn new(store: impl CacheStore + 'static, config: CacheConfig) -> Self {
        Self {
            store: Arc::new(store),
            stream_factory: Arc::new(BufferedStreamFactory),
            config: Arc::new(config),
            mutators: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the factory used to materialize bodies from stored bytes.
    #[must_use]
    pub fn with_stream_factory(mut self, factory: impl StreamFactory + 'static) -> Self {
        self.stream_factory = Arc::new(factory);
        self
    }

    /// Adds a response mutator. Mutators run in the order they were added.
    #[must_use]
    pub fn with_mutator(mut self, mutator: impl ResponseMutator + 'static) -> Self {
        self.mutators.push(Arc::new(mutator));
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The store key for `request`: the generator output, digested.
    pub fn cache_key(&self, request: &Request) -> String {
        let raw = self.config.key_generator().generate(request);
        self.config.hash_algo().digest(&raw)
    }

    async fn process(self, mut ctx: Context, next: Next) -> Result<Response> {
        if !self.config.is_cacheable_method(ctx.request().method().as_str()) {
            trace!(method = %ctx.request().method(), "method not cacheable, passing through");
            return next.run(ctx).await;
        }

        let lookup = self.lookup(ctx.request())?;

        if let Some(entry) = &lookup.entry {
            if entry.is_fresh(self.clock.now()) {
                debug!(key = %lookup.key, "serving fresh cache hit");
                let response = entry.to_response(self.stream_factory.as_ref());
                return Ok(self.mutate(ctx.request(), response, true, Some(entry)));
            }

            debug!(key = %lookup.key, "cached response is stale, revalidating");
            add_validators(ctx.request_mut(), entry);
        } else {
            debug!(key = %lookup.key, "cache miss");
        }

        let request = ctx.request().clone();
        let response = next.run(ctx).await?;
        self.handle_response(&request, response, lookup).await
    }

    fn lookup(&self, request: &Request) -> Result<CacheLookup> {
        let key = self.cache_key(request);
        let entry = self.store.get(&key)?;
        let storable = !self.config.is_blacklisted(request.path());
        Ok(CacheLookup {
            key,
            entry,
            storable,
        })
    }

    async fn handle_response(
        &self,
        request: &Request,
        mut response: Response,
        lookup: CacheLookup,
    ) -> Result<Response> {
        let now = self.clock.now();

        if response.status() == StatusCode::NotModified {
            let Some(mut entry) = lookup.entry else {
                // We sent no validators, so this 304 is the caller's business.
                trace!(key = %lookup.key, "304 without a cached entry");
                return Ok(self.mutate(request, response, false, None));
            };

            let max_age = policy::max_age(&response, &self.config, now);
            entry.expires_at = policy::expires_at(max_age, now);
            let etags: Vec<String> = response
                .headers()
                .get_all("etag")
                .map(str::to_owned)
                .collect();
            if !etags.is_empty() {
                entry.etag = etags;
            }

            if lookup.storable {
                let ttl = policy::store_ttl(max_age, self.config.cache_lifetime());
                self.store.set(&lookup.key, entry.clone(), ttl)?;
                debug!(
                    key = %lookup.key,
                    expires_at = ?entry.expires_at,
                    ttl = ?ttl,
                    "revalidated cached response"
                );
            }

            let refreshed = entry.to_response(self.stream_factory.as_ref());
            return Ok(self.mutate(request, refreshed, true, Some(&entry)));
        }

        if !lookup.storable {
            trace!(
                key = %lookup.key,
                path = request.path(),
                "path is blacklisted, not storing"
            );
        } else if policy::is_cacheable(&response, &self.config) {
            let body = response.body_mut().collect().await?;
            if !response.body_ref().is_seekable() {
                *response.body_mut() = self.stream_factory.create_stream(body.clone());
            }

            let max_age = policy::max_age(&response, &self.config, now);
            let ttl = policy::store_ttl(max_age, self.config.cache_lifetime());
            let expires_at = policy::expires_at(max_age, now);
            let entry = CacheEntry::capture(&response, body, now, expires_at);
            debug!(
                key = %lookup.key,
                expires_at = ?entry.expires_at,
                ttl = ?ttl,
                "storing response"
            );
            self.store.set(&lookup.key, entry, ttl)?;
        } else {
            trace!(
                key = %lookup.key,
                status = response.status().as_u16(),
                "response not cacheable"
            );
        }

        Ok(self.mutate(request, response, false, None))
    }

    fn mutate(
        &self,
        request: &Request,
        response: Response,
        cache_hit: bool,
        entry: Option<&CacheEntry>,
    ) -> Response {
        self.mutators.iter().fold(response, |response, mutator| {
            mutator.mutate(request, response, cache_hit, entry)
        })
    }
}

impl Middleware for CachePlugin {
    fn handle(&self, ctx: Context, next: Next) -> BoxFuture<Result<Response>> {
        let plugin = self.clone();
        Box::pin(plugin.process(ctx, next))
    }
}

fn add_validators(request: &mut Request, entry: &CacheEntry) {
    if let Some(created_at) = entry.created_at {
        request
            .headers_mut()
            .set("If-Modified-Since", format_rfc850_date(created_at));
    }
    if let Some(etag) = entry.etag() {
        request.headers_mut().set("If-None-Match", etag);
    }
}
