//! Caching configuration.
//!
//! [`CacheOptions`] is the raw, serde-friendly shape (every field defaulted);
//! [`CacheConfig`] is the validated, immutable form the plugin runs on.
//! Validation happens once, at construction, and rejects bad values instead
//! of coercing them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::HashAlgorithm;
use super::key::{CacheKeyGenerator, SimpleGenerator};

/// Default extra store lifetime: 30 days.
pub const DEFAULT_CACHE_LIFETIME: i64 = 86_400 * 30;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid cacheable method {0:?}: expected an uppercase HTTP token")]
    InvalidMethod(String),

    #[error("unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),

    #[error("invalid blacklisted path pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to parse cache options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw caching options.
///
/// # Examples
///
/// ```
/// use rttp_cache::cache::{CacheConfig, CacheOptions};
///
/// let options: CacheOptions = serde_json::from_str(r#"{ "default_ttl": 60 }"#).unwrap();
/// let config = CacheConfig::from_options(options).unwrap();
/// assert_eq!(config.default_ttl(), Some(60));
/// assert_eq!(config.cache_lifetime(), Some(86_400 * 30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Whether to honour `Cache-Control`/`Expires` or always use `default_ttl`.
    pub respect_cache_headers: bool,

    /// Freshness in seconds when headers don't say (or are ignored).
    /// `None` means entries never go stale on their own.
    pub default_ttl: Option<i64>,

    /// Seconds an entry is kept beyond its freshness window so a stale entry
    /// can still be revalidated with a `304`.
    pub cache_lifetime: Option<i64>,

    /// Digest used on generated keys.
    pub hash_algo: String,

    /// Request methods that may be served from and stored in the cache.
    pub methods: Vec<String>,

    /// Regular expressions; responses to matching request paths are never stored.
    pub blacklisted_paths: Vec<String>,

    /// Store responses marked `Cache-Control: private` (for single-user caches).
    pub cache_private_responses: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            respect_cache_headers: true,
            default_ttl: Some(0),
            cache_lifetime: Some(DEFAULT_CACHE_LIFETIME),
            hash_algo: HashAlgorithm::default().as_str().to_owned(),
            methods: vec!["GET".into(), "HEAD".into()],
            blacklisted_paths: Vec::new(),
            cache_private_responses: false,
        }
    }
}

/// Validated caching configuration.
#[derive(Clone)]
pub struct CacheConfig {
    respect_cache_headers: bool,
    default_ttl: Option<i64>,
    cache_lifetime: Option<i64>,
    hash_algo: HashAlgorithm,
    methods: BTreeSet<String>,
    blacklisted_paths: Vec<Regex>,
    cache_private_responses: bool,
    key_generator: Arc<dyn CacheKeyGenerator>,
}

impl CacheConfig {
    /// Validates raw options.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidMethod`] — a method is not an uppercase token.
    /// - [`ConfigError::UnsupportedHashAlgorithm`] — unknown digest name.
    /// - [`ConfigError::InvalidPattern`] — a blacklist pattern does not compile.
    pub fn from_options(options: CacheOptions) -> Result<Self, ConfigError> {
        let hash_algo = options.hash_algo.parse()?;

        let mut methods = BTreeSet::new();
        for method in options.methods {
            if !is_uppercase_token(&method) {
                return Err(ConfigError::InvalidMethod(method));
            }
            methods.insert(method);
        }

        let blacklisted_paths = options
            .blacklisted_paths
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern)
                    .map_err(|source| ConfigError::InvalidPattern { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            respect_cache_headers: options.respect_cache_headers,
            default_ttl: options.default_ttl,
            cache_lifetime: options.cache_lifetime,
            hash_algo,
            methods,
            blacklisted_paths,
            cache_private_responses: options.cache_private_responses,
            key_generator: Arc::new(SimpleGenerator),
        })
    }

    /// Parses and validates options from JSON.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON or wrongly typed values, and
    /// everything [`from_options`](Self::from_options) rejects.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_options(serde_json::from_str(json)?)
    }

    /// Profile for caches shared between users: `private` responses are not stored.
    ///
    /// # Errors
    ///
    /// See [`from_options`](Self::from_options).
    pub fn server_cache(options: CacheOptions) -> Result<Self, ConfigError> {
        Self::from_options(CacheOptions {
            cache_private_responses: false,
            ..options
        })
    }

    /// Profile for a single user's cache: `private` responses may be stored.
    ///
    /// # Errors
    ///
    /// See [`from_options`](Self::from_options).
    pub fn client_cache(options: CacheOptions) -> Result<Self, ConfigError> {
        Self::from_options(CacheOptions {
            cache_private_responses: true,
            ..options
        })
    }

    /// Replaces the key generator (defaults to [`SimpleGenerator`]).
    #[must_use]
    pub fn with_key_generator(mut self, generator: impl CacheKeyGenerator + 'static) -> Self {
        self.key_generator = Arc::new(generator);
        self
    }

    pub fn respect_cache_headers(&self) -> bool {
        self.respect_cache_headers
    }

    pub fn default_ttl(&self) -> Option<i64> {
        self.default_ttl
    }

    pub fn cache_lifetime(&self) -> Option<i64> {
        self.cache_lifetime
    }

    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    pub fn cache_private_responses(&self) -> bool {
        self.cache_private_responses
    }

    pub fn key_generator(&self) -> &dyn CacheKeyGenerator {
        self.key_generator.as_ref()
    }

    /// Returns `true` if `method` (compared upper-cased) may use the cache.
    pub fn is_cacheable_method(&self, method: &str) -> bool {
        self.methods.contains(&method.to_ascii_uppercase())
    }

    /// Returns `true` if responses for `path` must never be stored.
    pub fn is_blacklisted(&self, path: &str) -> bool {
        self.blacklisted_paths.iter().any(|re| re.is_match(path))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            respect_cache_headers: true,
            default_ttl: Some(0),
            cache_lifetime: Some(DEFAULT_CACHE_LIFETIME),
            hash_algo: HashAlgorithm::default(),
            methods: ["GET", "HEAD"].into_iter().map(String::from).collect(),
            blacklisted_paths: Vec::new(),
            cache_private_responses: false,
            key_generator: Arc::new(SimpleGenerator),
        }
    }
}

impl TryFrom<CacheOptions> for CacheConfig {
    type Error = ConfigError;

    fn try_from(options: CacheOptions) -> Result<Self, Self::Error> {
        Self::from_options(options)
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("respect_cache_headers", &self.respect_cache_headers)
            .field("default_ttl", &self.default_ttl)
            .field("cache_lifetime", &self.cache_lifetime)
            .field("hash_algo", &self.hash_algo)
            .field("methods", &self.methods)
            .field("blacklisted_paths", &self.blacklisted_paths)
            .field("cache_private_responses", &self.cache_private_responses)
            .finish_non_exhaustive()
    }
}

// RFC 9110 tchar, minus lowercase letters.
fn is_uppercase_token(method: &str) -> bool {
    !method.is_empty()
        && method.bytes().all(|b| {
            b.is_ascii_uppercase()
                || b.is_ascii_digit()
                || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with_methods(methods: &[&str]) -> CacheOptions {
        CacheOptions {
            methods: methods.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults() {
        let config = CacheConfig::from_options(CacheOptions::default()).unwrap();
        assert!(config.respect_cache_headers());
        assert_eq!(config.default_ttl(), Some(0));
        assert_eq!(config.cache_lifetime(), Some(2_592_000));
        assert_eq!(config.hash_algo(), HashAlgorithm::Sha1);
        assert!(config.is_cacheable_method("GET"));
        assert!(config.is_cacheable_method("head"));
        assert!(!config.is_cacheable_method("POST"));
        assert!(!config.cache_private_responses());
    }

    #[test]
    fn rejects_invalid_methods() {
        let cases: [&[&str]; 4] = [
            &["GET", "HEAD", "POST "],
            &["GET", "HEAD\"", "POST"],
            &["GET", "head", "POST"],
            &[""],
        ];
        for bad in cases {
            let result = CacheConfig::from_options(options_with_methods(bad));
            assert!(matches!(result, Err(ConfigError::InvalidMethod(_))), "{bad:?}");
        }
    }

    #[test]
    fn accepts_extension_methods() {
        let options = options_with_methods(&["GET", "POST", "M-SEARCH"]);
        let config = CacheConfig::from_options(options).unwrap();
        assert!(config.is_cacheable_method("POST"));
        assert!(config.is_cacheable_method("M-SEARCH"));
    }

    #[test]
    fn rejects_unknown_hash() {
        let options = CacheOptions {
            hash_algo: "crc32".into(),
            ..Default::default()
        };
        assert!(matches!(
            CacheConfig::from_options(options),
            Err(ConfigError::UnsupportedHashAlgorithm(_))
        ));
    }

    #[test]
    fn rejects_bad_pattern() {
        let options = CacheOptions {
            blacklisted_paths: vec!["/foo(".into()],
            ..Default::default()
        };
        assert!(matches!(
            CacheConfig::from_options(options),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn blacklist_matches_path() {
        let options = CacheOptions {
            blacklisted_paths: vec!["^/foo".into()],
            ..Default::default()
        };
        let config = CacheConfig::from_options(options).unwrap();
        assert!(config.is_blacklisted("/foo"));
        assert!(config.is_blacklisted("/foo/bar"));
        assert!(!config.is_blacklisted("/"));
    }

    #[test]
    fn json_nulls_and_types() {
        let config =
            CacheConfig::from_json(r#"{ "default_ttl": null, "cache_lifetime": null }"#).unwrap();
        assert_eq!(config.default_ttl(), None);
        assert_eq!(config.cache_lifetime(), None);

        let result = CacheConfig::from_json(r#"{ "respect_cache_headers": "yes" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn profiles() {
        let client = CacheConfig::client_cache(CacheOptions::default()).unwrap();
        assert!(client.cache_private_responses());
        let server = CacheConfig::server_cache(CacheOptions {
            cache_private_responses: true,
            ..Default::default()
        })
        .unwrap();
        assert!(!server.cache_private_responses());
    }
}
