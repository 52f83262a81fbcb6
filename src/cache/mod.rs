//! HTTP response caching.
//!
//! [`CachePlugin`] is a [`Middleware`](crate::middleware::Middleware) that
//! stores cacheable responses in a [`CacheStore`] and answers later requests
//! from it, revalidating stale entries with conditional requests.
//!
//! The pieces are usable on their own:
//!
//! - [`CacheConfig`] / [`CacheOptions`]: validated settings.
//! - [`CacheKeyGenerator`] implementations: how a request maps to a key.
//! - [`policy`]: storability and freshness rules.
//! - [`CacheEntry`]: the persisted record.
//! - [`ResponseMutator`]: decorates responses on the way out.

mod clock;
mod config;
mod entry;
mod hash;
pub mod http_date;
mod key;
mod mutator;
mod plugin;
pub mod policy;
mod store;

pub use clock::{Clock, SystemClock};
pub use config::{CacheConfig, CacheOptions, ConfigError, DEFAULT_CACHE_LIFETIME};
pub use entry::{CacheEntry, CachedResponse};
pub use hash::HashAlgorithm;
pub use key::{
    CacheKeyGenerator, HeaderCacheKeyGenerator, RequestLineAndBodyGenerator,
    SharedCacheKeyGenerator, SimpleGenerator,
};
pub use mutator::{AddHeaderResponseMutator, ResponseMutator};
pub use plugin::CachePlugin;
pub use store::{CacheStore, MemoryStore, StoreError};
