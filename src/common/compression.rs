//! Response decompression for HTTP content encoding.
//!
//! Requests advertise `br, zstd, gzip`; bodies that come back encoded are
//! decoded before they reach the caller, so payload bytes are always the
//! entity the server stored. Request bodies are never compressed.

use std::error::Error as StdError;

use anyhow::Result;
use async_compression::tokio::bufread::{BrotliDecoder, GzipDecoder, ZstdDecoder};
use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::BodyStream;
use hyper::body::Body;
use hyper::{HeaderMap, header, http};
use tokio::io::{AsyncBufRead, AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

/// Supported content encodings for response decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Br,
    Gzip,
    Zstd,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Identity => "identity",
            ContentEncoding::Br => "br",
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Zstd => "zstd",
        }
    }
}

/// Detect the response `Content-Encoding` header and return the ordered chain of encodings.
///
/// The vector is ordered from outermost encoding to innermost (as received). When empty, the
/// payload is identity encoded.
pub fn detect_encodings(headers: &HeaderMap) -> Vec<ContentEncoding> {
    let Some(val) = headers.get(header::CONTENT_ENCODING) else {
        return Vec::new();
    };

    let Ok(raw) = val.to_str() else {
        return Vec::new();
    };

    raw.split(',')
        .filter_map(|token| {
            let enc = token.trim().to_ascii_lowercase();
            Some(match enc.as_str() {
                "br" => ContentEncoding::Br,
                "gzip" | "x-gzip" => ContentEncoding::Gzip,
                "zstd" | "zst" => ContentEncoding::Zstd,
                _ => return None,
            })
        })
        .collect()
}

/// Insert an `Accept-Encoding` header (`br, zstd, gzip`) if not already present.
pub fn add_accept_encoding(h: &mut HeaderMap) {
    if !h.contains_key(header::ACCEPT_ENCODING) {
        h.insert(
            header::ACCEPT_ENCODING,
            http::HeaderValue::from_static("br, zstd, gzip"),
        );
    }
}

/// Aggregate a response body, undoing each encoding in reverse order.
pub async fn decompress_body<B>(body: B, encodings: &[ContentEncoding]) -> Result<Bytes>
where
    B: Body<Data = Bytes> + Send + Unpin + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let stream = BodyStream::new(body)
        .map_ok(|frame| frame.into_data().unwrap_or_default())
        .map_err(std::io::Error::other);
    let reader = BufReader::new(StreamReader::new(stream));
    let mut out = Vec::with_capacity(32 * 1024);
    let mut current: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(reader);

    for encoding in encodings.iter().rev() {
        current = match encoding {
            ContentEncoding::Identity => current,
            ContentEncoding::Br => Box::new(BufReader::new(BrotliDecoder::new(current))),
            ContentEncoding::Gzip => Box::new(BufReader::new(GzipDecoder::new(current))),
            ContentEncoding::Zstd => Box::new(BufReader::new(ZstdDecoder::new(current))),
        };
    }

    current.read_to_end(&mut out).await?;
    Ok(Bytes::from(out))
}
