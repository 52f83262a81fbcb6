//! A client with a caching layer in front of a fake origin.
//!
//! The origin serves a document with `max-age=1` and an ETag, and answers
//! `304 Not Modified` when the ETag is presented back. Run with
//! `RUST_LOG=rttp_cache=debug` to watch hits, misses and revalidation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rttp_cache::cache::{AddHeaderResponseMutator, CacheConfig, CacheOptions, MemoryStore};
use rttp_cache::middleware::LoggerMiddleware;
use rttp_cache::{CachePlugin, Client, Error, Method, Request, Response};
use tracing_subscriber::EnvFilter;

const DOCUMENT: &[u8] = b"HTTP/1.1 200 OK\r\n\
Cache-Control: max-age=1\r\n\
ETag: \"v1\"\r\n\
Content-Type: text/plain\r\n\
Content-Length: 13\r\n\
\r\n\
Hello, cache!";

const NOT_MODIFIED: &[u8] = b"HTTP/1.1 304 Not Modified\r\n\
Cache-Control: max-age=1\r\n\
ETag: \"v1\"\r\n\
\r\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let origin_hits = Arc::new(AtomicUsize::new(0));
    let counter = origin_hits.clone();

    let origin = move |req: Request| {
        counter.fetch_add(1, Ordering::SeqCst);
        let raw = if req.headers().get("if-none-match") == Some("\"v1\"") {
            NOT_MODIFIED
        } else {
            DOCUMENT
        };
        async move { Response::parse(raw).map_err(Error::transport) }
    };

    let config = CacheConfig::client_cache(CacheOptions {
        default_ttl: Some(60),
        ..Default::default()
    })?;

    let cache = CachePlugin::new(MemoryStore::new(), config)
        .with_mutator(AddHeaderResponseMutator::default());
    let client = Client::new(origin).with(LoggerMiddleware).with(cache);

    for round in 1..=3 {
        let mut response = client
            .send(Request::new(Method::Get, "https://example.com/greeting"))
            .await?;
        let body = response.body_mut().collect().await?;

        println!(
            "round {round}: {} {} ({})",
            response.status(),
            String::from_utf8_lossy(&body),
            response.headers().get("x-cache").unwrap_or("-"),
        );

        if round == 2 {
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    println!("origin contacted {} times", origin_hits.load(Ordering::SeqCst));
    Ok(())
}
