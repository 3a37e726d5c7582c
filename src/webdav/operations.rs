//! The WebDAV verbs the client supports and how each one is built.
//!
//! Every operation goes through the same pipeline: validate parameters,
//! build a [`RequestDescriptor`], dispatch, decode. What differs per verb
//! lives in the [`OperationKind`] table below.

use std::fmt;

use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, header};
use url::Url;

use crate::common::auth::basic_auth_header;
use crate::common::encoding::UploadContent;
use crate::error::DavError;
use crate::webdav::types::{Ack, Credentials, Depth, Payload, RequestDescriptor};
use crate::webdav::xml::{LISTING_PROPERTIES, build_propfind_body};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateCollection,
    CollectionExists,
    ListContents,
    UploadFile,
    DownloadFile,
    DeleteResource,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::CreateCollection => "create_collection",
            OperationKind::CollectionExists => "collection_exists",
            OperationKind::ListContents => "list_contents",
            OperationKind::UploadFile => "upload_file",
            OperationKind::DownloadFile => "download_file",
            OperationKind::DeleteResource => "delete_resource",
        }
    }

    pub fn method(self) -> Result<Method, DavError> {
        let method = match self {
            OperationKind::CreateCollection => Method::from_bytes(b"MKCOL"),
            OperationKind::CollectionExists | OperationKind::ListContents => {
                Method::from_bytes(b"PROPFIND")
            }
            OperationKind::UploadFile => Ok(Method::PUT),
            OperationKind::DownloadFile => Ok(Method::GET),
            OperationKind::DeleteResource => Ok(Method::DELETE),
        };
        method.map_err(|err| DavError::InvalidRequest(err.to_string()))
    }

    fn depth(self) -> Option<Depth> {
        match self {
            OperationKind::CollectionExists => Some(Depth::Zero),
            OperationKind::ListContents => Some(Depth::One),
            _ => None,
        }
    }

    fn requires_content(self) -> bool {
        matches!(self, OperationKind::UploadFile)
    }

    /// Whether a successful response body is part of the payload.
    pub(crate) fn reads_body(self) -> bool {
        matches!(
            self,
            OperationKind::ListContents | OperationKind::DownloadFile
        )
    }

    pub(crate) fn failure_context(self) -> &'static str {
        match self {
            OperationKind::CreateCollection => "failed to create collection",
            OperationKind::CollectionExists => "collection does not exist",
            OperationKind::ListContents => "failed to list collection contents",
            OperationKind::UploadFile => "upload failed",
            OperationKind::DownloadFile => "download failed",
            OperationKind::DeleteResource => "delete failed",
        }
    }

    pub(crate) fn success(self, body: Bytes) -> Payload {
        match self {
            OperationKind::CreateCollection => Payload::Ack(Ack::new("collection created")),
            OperationKind::CollectionExists => Payload::Ack(Ack::new("exists")),
            OperationKind::ListContents => Payload::Listing(body),
            OperationKind::UploadFile => Payload::Ack(Ack::new("file uploaded")),
            OperationKind::DownloadFile => Payload::Body(body),
            OperationKind::DeleteResource => Payload::Ack(Ack::new("resource deleted")),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-supplied parameters, mirroring a structured bridge request where
/// any field may be absent. Empty strings count as absent.
#[derive(Clone, Default)]
pub struct OperationRequest {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub content: Option<UploadContent>,
}

impl OperationRequest {
    pub fn new(url: &str, username: &str, password: &str) -> Self {
        Self {
            url: Some(url.to_owned()),
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
            content: None,
        }
    }

    /// Request for `url` with no credentials yet.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.username = Some(credentials.username);
        self.password = Some(credentials.password);
        self
    }

    pub fn with_content(mut self, content: impl Into<UploadContent>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Validate and build the request for `kind`. Fails before any I/O.
    pub fn prepare(self, kind: OperationKind) -> Result<RequestDescriptor, DavError> {
        let url = required(self.url, "url")?;
        let username = required(self.username, "username")?;
        let password = required(self.password, "password")?;
        let content = if kind.requires_content() {
            Some(self.content.ok_or(DavError::MissingParameter("content"))?)
        } else {
            None
        };

        let method = kind.method()?;
        let url = parse_url(&url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            basic_auth_header(&username, &password)?,
        );
        if let Some(depth) = kind.depth() {
            headers.insert("Depth", header::HeaderValue::from_static(depth.as_str()));
        }

        let body = match kind {
            OperationKind::ListContents => {
                headers.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/xml; charset=utf-8"),
                );
                Some(Bytes::from(build_propfind_body(LISTING_PROPERTIES)))
            }
            OperationKind::UploadFile => {
                headers.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/octet-stream"),
                );
                content.map(UploadContent::into_bytes).transpose()?
            }
            _ => None,
        };

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            body,
        })
    }
}

impl fmt::Debug for OperationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRequest")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("content", &self.content.as_ref().map(|_| "<content>"))
            .finish()
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, DavError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(DavError::MissingParameter(field))
}

fn parse_url(raw: &str) -> Result<Uri, DavError> {
    let parsed = Url::parse(raw).map_err(|err| DavError::InvalidRequest(format!("{raw}: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DavError::InvalidRequest(format!(
            "unsupported URL scheme `{}`",
            parsed.scheme()
        )));
    }
    parsed
        .as_str()
        .parse::<Uri>()
        .map_err(|err| DavError::InvalidRequest(format!("{raw}: {err}")))
}
