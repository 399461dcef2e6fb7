//! Response bodies returned by applications.

use std::fmt;
use std::io;

use bytes::Bytes;

use crate::filter::FileMarker;

/// Lazy sequence of body chunks.
pub type Chunks = Box<dyn Iterator<Item = io::Result<Bytes>> + Send>;

/// What an application returns as its response body.
pub enum Body {
    /// Opaque chunk sequence, streamed as-is.
    Chunks(Chunks),
    /// Intent to send a file, produced by the redirect filter's file wrapper.
    File(FileMarker),
}

impl Body {
    /// Body that yields no chunks.
    pub fn empty() -> Self {
        Body::Chunks(Box::new(std::iter::empty()))
    }

    /// Body from an infallible sequence of chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Body::Chunks(Box::new(chunks.into_iter().map(Ok)))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Body::File(_))
    }

    /// Flatten into chunks for the host to stream.
    pub fn into_chunks(self) -> Chunks {
        match self {
            Body::Chunks(chunks) => chunks,
            Body::File(marker) => Box::new(marker),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Chunks(_) => f.write_str("Body::Chunks(..)"),
            Body::File(marker) => f.debug_tuple("Body::File").field(marker).finish(),
        }
    }
}

impl From<Bytes> for Body {
    fn from(chunk: Bytes) -> Self {
        Body::from_chunks(std::iter::once(chunk))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::from(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::from(Bytes::from(s))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::from(Bytes::from(v))
    }
}
