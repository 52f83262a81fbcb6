//! # rttp-cache
//!
//! An HTTP caching layer for an async client pipeline.
//!
//! Requests travel through an ordered middleware stack before reaching a
//! [`Transport`](client::Transport). The [`CachePlugin`] middleware answers
//! from a [`CacheStore`](cache::CacheStore) when it can, revalidates stale
//! entries with `If-Modified-Since`/`If-None-Match`, and stores whatever the
//! origin says may be stored.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rttp_cache::cache::{AddHeaderResponseMutator, CacheConfig, CacheOptions, MemoryStore};
//! use rttp_cache::{CachePlugin, Client, Method, Request, Response, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CacheConfig::client_cache(CacheOptions {
//!         default_ttl: Some(60),
//!         ..Default::default()
//!     })?;
//!
//!     let client = Client::new(|_req: Request| async {
//!         Ok::<_, rttp_cache::Error>(Response::new(StatusCode::Ok).body("Hello, World!"))
//!     })
//!     .with(CachePlugin::new(MemoryStore::new(), config).with_mutator(AddHeaderResponseMutator::default()));
//!
//!     let first = client.send(Request::new(Method::Get, "https://example.com/")).await?;
//!     let second = client.send(Request::new(Method::Get, "https://example.com/")).await?;
//!     assert_eq!(first.headers().get("x-cache"), Some("MISS"));
//!     assert_eq!(second.headers().get("x-cache"), Some("HIT"));
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod middleware;

pub use cache::CachePlugin;
pub use client::{Client, Transport};
pub use error::{Error, Result};
pub use http::{Body, Headers, Method, Request, Response, StatusCode};
