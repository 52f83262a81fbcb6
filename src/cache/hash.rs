//! Fixed-length cache key digests.

use std::fmt;
use std::str::FromStr;

use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use super::ConfigError;

/// Digest applied to generated cache keys before they reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Hashes `key` and returns the lowercase hex digest.
    pub fn digest(self, key: &str) -> String {
        match self {
            Self::Sha1 => hex::encode(Sha1::digest(key.as_bytes())),
            Self::Sha224 => hex::encode(Sha224::digest(key.as_bytes())),
            Self::Sha256 => hex::encode(Sha256::digest(key.as_bytes())),
            Self::Sha384 => hex::encode(Sha384::digest(key.as_bytes())),
            Self::Sha512 => hex::encode(Sha512::digest(key.as_bytes())),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha1" => Ok(Self::Sha1),
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(ConfigError::UnsupportedHashAlgorithm(other.to_owned())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_digest() {
        assert_eq!(
            HashAlgorithm::Sha1.digest("foo"),
            "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33"
        );
    }

    #[test]
    fn digest_lengths() {
        assert_eq!(HashAlgorithm::Sha224.digest("GET /").len(), 56);
        assert_eq!(HashAlgorithm::Sha256.digest("GET /").len(), 64);
        assert_eq!(HashAlgorithm::Sha384.digest("GET /").len(), 96);
        assert_eq!(HashAlgorithm::Sha512.digest("GET /").len(), 128);
    }

    #[test]
    fn digest_stability() {
        let a = HashAlgorithm::Sha256.digest("GET https://example.com/");
        let b = HashAlgorithm::Sha256.digest("GET https://example.com/");
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_names() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!(matches!(
            "md4".parse::<HashAlgorithm>(),
            Err(ConfigError::UnsupportedHashAlgorithm(name)) if name == "md4"
        ));
    }
}
