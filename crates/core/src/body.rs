//! Owned request and response bodies
//!
//! A [`Body`] is either a buffered chunk of bytes or a boxed byte stream.
//! Dropping a body releases whatever it wraps, including a pooled HTTP
//! connection, so callers never need an explicit close.

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};

/// Boxed stream of body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Reader over a body, see [`Body::into_reader`]
pub type BodyReader = StreamReader<ByteStream, Bytes>;

pub struct Body {
    kind: Kind,
}

enum Kind {
    Full(Bytes),
    Stream(ByteStream),
}

impl Body {
    pub fn empty() -> Self {
        Self::from(Bytes::new())
    }

    /// Wrap a stream of chunks
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            kind: Kind::Stream(Box::pin(stream)),
        }
    }

    /// Stream the contents of an async reader, e.g. a `tokio::fs::File`
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::from_stream(ReaderStream::new(reader))
    }

    /// The buffered contents, if this body is not a stream
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.kind {
            Kind::Full(bytes) => Some(bytes),
            Kind::Stream(_) => None,
        }
    }

    pub fn into_stream(self) -> ByteStream {
        match self.kind {
            Kind::Full(bytes) if bytes.is_empty() => Box::pin(futures::stream::empty()),
            Kind::Full(bytes) => Box::pin(futures::stream::once(async move { Ok(bytes) })),
            Kind::Stream(stream) => stream,
        }
    }

    pub fn into_reader(self) -> BodyReader {
        StreamReader::new(self.into_stream())
    }

    /// Read the whole body into memory
    pub async fn collect(self) -> io::Result<Bytes> {
        self.collect_limited(usize::MAX).await
    }

    /// Read at most `limit` bytes, discarding the rest
    pub async fn collect_limited(self, limit: usize) -> io::Result<Bytes> {
        let mut stream = match self.kind {
            Kind::Full(mut bytes) => {
                bytes.truncate(limit);
                return Ok(bytes);
            }
            Kind::Stream(stream) => stream,
        };

        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let room = limit - buf.len();
            if chunk.len() >= room {
                buf.extend_from_slice(&chunk[..room]);
                break;
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Full(bytes) => f.debug_tuple("Body::Full").field(&bytes.len()).finish(),
            Kind::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            kind: Kind::Full(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(data: Vec<u8>) -> Self {
        Self::from(Bytes::from(data))
    }
}

impl From<String> for Body {
    fn from(data: String) -> Self {
        Self::from(Bytes::from(data))
    }
}

impl From<&'static str> for Body {
    fn from(data: &'static str) -> Self {
        Self::from(Bytes::from_static(data.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    fn chunked(parts: &[&'static str]) -> Body {
        let chunks: Vec<io::Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        Body::from_stream(futures::stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_collect_stream() {
        let body = chunked(&["hello ", "object ", "storage"]);
        let data = body.collect().await.unwrap();
        assert_eq!(&data[..], b"hello object storage");
    }

    #[tokio::test]
    async fn test_collect_limited_truncates() {
        let body = chunked(&["0123", "4567", "89"]);
        let data = body.collect_limited(6).await.unwrap();
        assert_eq!(&data[..], b"012345");

        let full = Body::from("abcdef");
        assert_eq!(&full.collect_limited(3).await.unwrap()[..], b"abc");
    }

    #[tokio::test]
    async fn test_collect_propagates_stream_error() {
        let chunks: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::from(io::ErrorKind::ConnectionReset)),
        ];
        let body = Body::from_stream(futures::stream::iter(chunks));
        let err = body.collect().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn test_reader_round_trip() {
        let body = Body::from_reader(&b"streamed from a reader"[..]);
        let mut reader = body.into_reader();
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "streamed from a reader");
    }

    #[test]
    fn test_as_bytes() {
        assert_eq!(Body::from("abc").as_bytes().map(|b| b.len()), Some(3));
        assert!(chunked(&["x"]).as_bytes().is_none());
        assert!(Body::empty().as_bytes().unwrap().is_empty());
    }
}
