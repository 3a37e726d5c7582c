use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;

use crate::error::DavError;

/// Body of an upload: raw bytes, or Base64 text optionally behind a data-URL
/// marker such as `data:application/octet-stream;base64,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadContent {
    Raw(Bytes),
    Encoded(String),
}

impl UploadContent {
    /// Resolve to the exact bytes that will be transmitted.
    pub fn into_bytes(self) -> Result<Bytes, DavError> {
        match self {
            UploadContent::Raw(bytes) => Ok(bytes),
            UploadContent::Encoded(text) => decode_upload_content(&text),
        }
    }
}

impl From<Bytes> for UploadContent {
    fn from(value: Bytes) -> Self {
        UploadContent::Raw(value)
    }
}

impl From<Vec<u8>> for UploadContent {
    fn from(value: Vec<u8>) -> Self {
        UploadContent::Raw(Bytes::from(value))
    }
}

impl From<String> for UploadContent {
    fn from(value: String) -> Self {
        UploadContent::Encoded(value)
    }
}

impl From<&str> for UploadContent {
    fn from(value: &str) -> Self {
        UploadContent::Encoded(value.to_owned())
    }
}

/// Decode the payload after the first comma when a marker is present,
/// otherwise the whole string.
pub fn decode_upload_content(text: &str) -> Result<Bytes, DavError> {
    let payload = match text.split_once(',') {
        Some((_, rest)) => rest,
        None => text,
    };
    B64.decode(payload.trim())
        .map(Bytes::from)
        .map_err(DavError::Encoding)
}
