//! Error taxonomy for WebDAV operations and trust configuration.
//!
//! Parameter, credential, encoding, certificate and request errors are raised
//! synchronously, before any network activity. `Transport` and `Server` are
//! only ever delivered through an operation's asynchronous result.

use std::error::Error as StdError;

use thiserror::Error;

/// Longest slice of a server error body rendered into the error message.
const BODY_PREVIEW_CHARS: usize = 1024;

/// Coarse classification of a [`DavError`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    MissingParameter,
    InvalidCredentials,
    Encoding,
    Certificate,
    InvalidRequest,
    Transport,
    Server,
}

#[derive(Debug, Error)]
pub enum DavError {
    /// The caller omitted a required field; no I/O was attempted.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Credentials cannot be turned into a Basic authorization header.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(&'static str),

    /// Upload content is not valid Base64 (optionally behind a data-URL marker).
    #[error("malformed upload content: {0}")]
    Encoding(#[source] base64::DecodeError),

    /// Bytes supplied as a pinned authority are not a usable X.509 certificate.
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// The URL or a header value cannot be represented as an HTTP request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, DNS, TLS or timeout failure; no HTTP status is available.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// An HTTP response arrived with a status outside 2xx.
    #[error("{}", render_server_error(context, *status, body.as_deref()))]
    Server {
        status: u16,
        context: &'static str,
        body: Option<String>,
    },
}

impl DavError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DavError::MissingParameter(_) => FailureKind::MissingParameter,
            DavError::InvalidCredentials(_) => FailureKind::InvalidCredentials,
            DavError::Encoding(_) => FailureKind::Encoding,
            DavError::Certificate(_) => FailureKind::Certificate,
            DavError::InvalidRequest(_) => FailureKind::InvalidRequest,
            DavError::Transport { .. } => FailureKind::Transport,
            DavError::Server { .. } => FailureKind::Server,
        }
    }

    /// HTTP status carried by a [`DavError::Server`] failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            DavError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Best-effort response body text carried by a [`DavError::Server`] failure.
    pub fn body(&self) -> Option<&str> {
        match self {
            DavError::Server { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        DavError::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn timeout() -> Self {
        DavError::transport("timeout")
    }

    /// Wrap a lower-level failure, flattening its `source()` chain into the message.
    pub(crate) fn transport_from<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DavError::Transport {
            message: error_chain(&err),
            source: Some(Box::new(err)),
        }
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = cause.source();
    }
    message
}

fn render_server_error(context: &str, status: u16, body: Option<&str>) -> String {
    let mut out = format!("{context}: server responded with status {status}");
    if let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) {
        out.push_str(" - ");
        if body.chars().count() > BODY_PREVIEW_CHARS {
            out.extend(body.chars().take(BODY_PREVIEW_CHARS));
            out.push_str("...");
        } else {
            out.push_str(body);
        }
    }
    out
}
