//! Message bodies and the factory that materializes them.
//!
//! A [`Body`] is either a fully buffered [`Bytes`] value, which can be read any
//! number of times, or a single-pass [`AsyncRead`] stream that is gone once it
//! has been drained.

use std::fmt;
use std::io;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

/// An HTTP message body.
///
/// # Examples
///
/// ```
/// use rttp_cache::http::Body;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut body = Body::from("hello");
/// assert!(body.is_seekable());
/// assert_eq!(body.collect().await.unwrap(), "hello");
/// // buffered bodies can be read again
/// assert_eq!(body.collect().await.unwrap(), "hello");
/// # });
/// ```
pub enum Body {
    /// A buffered body. Every read sees the full content.
    Full(Bytes),
    /// A single-pass stream.
    Stream(Box<dyn AsyncRead + Send + Unpin>),
}

impl Body {
    /// Creates an empty buffered body.
    pub fn empty() -> Self {
        Self::Full(Bytes::new())
    }

    /// Wraps a single-pass reader.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::Stream(Box::new(reader))
    }

    /// Returns `true` if reading the body leaves it intact for the next reader.
    pub fn is_seekable(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Reads the whole body.
    ///
    /// Buffered bodies are returned without being consumed. A stream is read to
    /// its end and is exhausted afterwards; callers that still need to hand the
    /// body on must replace it.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying reader.
    pub async fn collect(&mut self) -> io::Result<Bytes> {
        match self {
            Self::Full(bytes) => Ok(bytes.clone()),
            Self::Stream(reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }

    /// Returns the buffered content, or `None` for a stream.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Full(bytes) => Some(bytes),
            Self::Stream(_) => None,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Full(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Full(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Full(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::Full(Bytes::from_static(text.as_bytes()))
    }
}

/// Creates fresh bodies over captured content.
///
/// Used whenever a response has to be rebuilt from stored bytes; each call must
/// return an independent body so no two responses share a read cursor.
pub trait StreamFactory: Send + Sync {
    /// Builds a new body reading `content` from the start.
    fn create_stream(&self, content: Bytes) -> Body;
}

/// The default [`StreamFactory`]: hands out buffered bodies sharing the same
/// immutable allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferedStreamFactory;

impl StreamFactory for BufferedStreamFactory {
    fn create_stream(&self, content: Bytes) -> Body {
        Body::Full(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_is_single_pass() {
        let mut body = Body::from_reader(&b"chunked"[..]);
        assert!(!body.is_seekable());
        assert_eq!(body.collect().await.unwrap(), "chunked");
        assert_eq!(body.collect().await.unwrap(), "");
    }

    #[tokio::test]
    async fn factory_bodies_are_independent() {
        let content = Bytes::from_static(b"shared");
        let factory = BufferedStreamFactory;
        let mut first = factory.create_stream(content.clone());
        let mut second = factory.create_stream(content);
        assert_eq!(first.collect().await.unwrap(), "shared");
        assert_eq!(second.collect().await.unwrap(), "shared");
    }

    #[test]
    fn debug_does_not_dump_content() {
        assert_eq!(format!("{:?}", Body::from("abc")), "Full(3)");
        assert_eq!(format!("{:?}", Body::from_reader(&b""[..])), "Stream(..)");
    }
}
