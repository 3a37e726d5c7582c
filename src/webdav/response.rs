use bytes::Bytes;
use hyper::StatusCode;

use crate::error::DavError;
use crate::webdav::operations::OperationKind;
use crate::webdav::types::Payload;

/// A completed HTTP exchange. The body is read even for error statuses so it
/// can be surfaced for diagnostics; reading it may itself have failed.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) body: Result<Bytes, DavError>,
}

/// Turn the outcome of one dispatch into the operation's result.
///
/// 2xx yields the operation's payload. Any other status yields
/// [`DavError::Server`] with the body text when it could be read; a body read
/// failure never replaces the status-derived error.
pub(crate) fn decode_response(
    kind: OperationKind,
    outcome: Result<RawResponse, DavError>,
) -> Result<Payload, DavError> {
    let response = outcome?;

    if response.status.is_success() {
        let body = if kind.reads_body() {
            response.body?
        } else {
            Bytes::new()
        };
        return Ok(kind.success(body));
    }

    let body = response
        .body
        .ok()
        .filter(|bytes| !bytes.is_empty())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

    Err(DavError::Server {
        status: response.status.as_u16(),
        context: kind.failure_context(),
        body,
    })
}
