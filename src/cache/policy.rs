//! Freshness and storability rules.
//!
//! Pure functions over response headers and the configuration; the plugin
//! supplies the current time.

use crate::http::{Headers, Response, StatusCode};

use super::config::CacheConfig;
use super::http_date::parse_http_date;

/// Statuses that may be stored.
const CACHEABLE_STATUSES: [StatusCode; 7] = [
    StatusCode::Ok,
    StatusCode::NonAuthoritativeInformation,
    StatusCode::MultipleChoices,
    StatusCode::MovedPermanently,
    StatusCode::Found,
    StatusCode::NotFound,
    StatusCode::Gone,
];

/// A `Cache-Control` directive: present, possibly with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    pub value: Option<&'a str>,
}

/// Finds the first occurrence of directive `name` across every `Cache-Control`
/// line. Names compare case-insensitively; quoted values are unquoted.
pub fn cache_control_directive<'a>(headers: &'a Headers, name: &str) -> Option<Directive<'a>> {
    headers
        .get_all("cache-control")
        .flat_map(|line| line.split(','))
        .find_map(|directive| {
            let (key, value) = match directive.split_once('=') {
                Some((key, value)) => (key, Some(value.trim().trim_matches('"'))),
                None => (directive, None),
            };
            key.trim()
                .eq_ignore_ascii_case(name)
                .then_some(Directive { value })
        })
}

/// Returns `true` if `response` may be written to the cache.
pub fn is_cacheable(response: &Response, config: &CacheConfig) -> bool {
    if !CACHEABLE_STATUSES.contains(&response.status()) {
        return false;
    }
    if !config.respect_cache_headers() {
        return true;
    }

    let headers = response.headers();
    if cache_control_directive(headers, "no-store").is_some() {
        return false;
    }
    config.cache_private_responses() || cache_control_directive(headers, "private").is_none()
}

/// Freshness lifetime of `response` in seconds, relative to `now`.
///
/// May be negative (already stale). `None` means "no HTTP expiry"; the entry
/// then lives as long as the store keeps it.
pub fn max_age(response: &Response, config: &CacheConfig, now: i64) -> Option<i64> {
    if !config.respect_cache_headers() {
        return config.default_ttl();
    }

    let headers = response.headers();
    if let Some(max_age) = cache_control_directive(headers, "max-age")
        .and_then(|directive| directive.value)
        .and_then(|value| value.parse::<i64>().ok())
    {
        let age = headers
            .get("age")
            .and_then(|age| age.trim().parse::<i64>().ok())
            .unwrap_or(0);
        return Some(max_age.saturating_sub(age));
    }

    if let Some(expires) = headers.get("expires") {
        return match parse_http_date(expires) {
            Some(expires) => Some(expires.saturating_sub(now)),
            None => config.default_ttl(),
        };
    }

    config.default_ttl()
}

/// When the response stops being fresh, in unix seconds.
pub fn expires_at(max_age: Option<i64>, now: i64) -> Option<i64> {
    max_age.map(|max_age| now.saturating_add(max_age))
}

/// How long the store should keep the entry: the freshness window plus the
/// configured `cache_lifetime`, so a stale entry survives long enough to be
/// revalidated.
pub fn store_ttl(max_age: Option<i64>, cache_lifetime: Option<i64>) -> Option<i64> {
    match (cache_lifetime, max_age) {
        (Some(lifetime), Some(max_age)) => Some(lifetime.saturating_add(max_age)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}
