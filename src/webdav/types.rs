use std::fmt;

use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri};

/// WebDAV Depth
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
}

impl Depth {
    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
        }
    }
}

/// Basic-auth credentials. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A fully validated HTTP request, ready for the transport.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Uri,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Acknowledgement returned by operations that carry no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Success payload of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Ack(Ack),
    /// Raw response body of a download.
    Body(Bytes),
    /// The server's multistatus document, byte for byte.
    Listing(Bytes),
}

impl Payload {
    /// Acknowledgement view; data-carrying payloads acknowledge as "completed".
    pub fn into_ack(self) -> Ack {
        match self {
            Payload::Ack(ack) => ack,
            Payload::Body(_) | Payload::Listing(_) => Ack::new("completed"),
        }
    }

    /// Byte view; acknowledgements carry no bytes.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Payload::Ack(_) => Bytes::new(),
            Payload::Body(bytes) | Payload::Listing(bytes) => bytes,
        }
    }
}

/// One `<D:response>` of a multistatus listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DavEntry {
    pub href: String,
    /// Last path segment of `href`, percent-decoded.
    pub name: String,
    pub status: Option<String>,
    pub displayname: Option<String>,
    pub is_collection: bool,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub creation_date: Option<String>,
}
