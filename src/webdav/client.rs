use std::sync::{Arc, Mutex, PoisonError, RwLock};

use bytes::Bytes;

use crate::common::encoding::UploadContent;
use crate::common::http::TransportOptions;
use crate::error::DavError;
use crate::tls::{PinnedAuthority, TrustMode, TrustPolicy};
use crate::webdav::handle::OperationHandle;
use crate::webdav::operations::{OperationKind, OperationRequest};
use crate::webdav::transport::WebDavTransport;
use crate::webdav::types::{Ack, Payload};

/// WebDAV client with a swappable TLS trust policy.
///
/// Cloning is cheap and clones share the active transport, so a trust change
/// made through one clone is seen by every other. Trust changes replace the
/// transport atomically; operations already dispatched keep the transport
/// they captured.
#[derive(Clone, Debug)]
pub struct WebDavClient {
    active: Arc<RwLock<Arc<WebDavTransport>>>,
    /// Serializes trust changes. `active` is write-locked only to store the
    /// rebuilt transport, never while building it.
    swap: Arc<Mutex<()>>,
}

impl Default for WebDavClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebDavClient {
    /// Client in [`TrustMode::Default`] with default [`TransportOptions`].
    pub fn new() -> Self {
        Self::with_options(TransportOptions::default())
    }

    pub fn with_options(options: TransportOptions) -> Self {
        let transport = WebDavTransport::new(TrustPolicy::default(), options);
        Self {
            active: Arc::new(RwLock::new(Arc::new(transport))),
            swap: Arc::new(Mutex::new(())),
        }
    }

    /// Snapshot of the transport new operations are dispatched on.
    pub fn transport(&self) -> Arc<WebDavTransport> {
        let guard = self.active.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn trust_mode(&self) -> TrustMode {
        self.transport().policy().mode()
    }

    // ----------- Trust configuration -----------

    /// Enter or leave insecure mode. Leaving it restores the pinned authority
    /// if one was configured, otherwise default trust.
    ///
    /// Returns a bare [`Ack`] rather than `Result<Ack, _>`: toggling the flag
    /// cannot fail, so bridge callers expecting a fallible result can wrap it
    /// in `Ok`.
    pub fn set_insecure_mode(&self, enabled: bool) -> Ack {
        let transport = self.swap_policy(|policy| policy.with_insecure_mode(enabled));
        if enabled {
            tracing::warn!("TLS certificate and hostname verification disabled");
        }
        tracing::info!(mode = transport.policy().mode().name(), "trust mode changed");
        Ack::new(format!("insecure mode set to {enabled}"))
    }

    /// Pin a single certificate (DER, PEM, or Base64 DER) as the only trusted root.
    ///
    /// On a parse failure the active trust mode is left unchanged.
    pub fn set_pinned_authority(&self, certificate: &[u8]) -> Result<Ack, DavError> {
        let authority = PinnedAuthority::from_bytes(certificate)?;
        self.swap_policy(|policy| policy.with_pinned_authority(authority));
        tracing::info!(mode = "pinned-authority", "trust mode changed");
        Ok(Ack::new("certificate uploaded successfully"))
    }

    /// Alias of [`WebDavClient::set_pinned_authority`].
    pub fn upload_trusted_certificate(&self, certificate: &[u8]) -> Result<Ack, DavError> {
        self.set_pinned_authority(certificate)
    }

    /// Forget the pinned certificate.
    pub fn clear_pinned_authority(&self) -> Ack {
        let transport = self.swap_policy(TrustPolicy::without_pinned_authority);
        tracing::info!(mode = transport.policy().mode().name(), "trust mode changed");
        Ack::new("pinned certificate cleared")
    }

    fn swap_policy<F>(&self, update: F) -> Arc<WebDavTransport>
    where
        F: FnOnce(&TrustPolicy) -> TrustPolicy,
    {
        let _serial = self.swap.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.transport();
        // Building may read the platform root store; dispatch keeps running
        // on `current` meanwhile.
        let next = Arc::new(current.rebuild(update(current.policy())));
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
        next
    }

    // ----------- Dispatch -----------

    /// Validate `request` and start it on the current transport.
    ///
    /// Parameter, encoding and URL errors are returned here, before any I/O.
    /// Transport and server errors arrive through the returned handle.
    pub fn dispatch(
        &self,
        kind: OperationKind,
        request: OperationRequest,
    ) -> Result<OperationHandle, DavError> {
        let descriptor = request.prepare(kind)?;
        Ok(self.transport().dispatch(kind, descriptor))
    }

    /// Like [`WebDavClient::dispatch`], delivering the result to `on_complete`
    /// on a worker task.
    pub fn dispatch_with_callback<F>(
        &self,
        kind: OperationKind,
        request: OperationRequest,
        on_complete: F,
    ) -> Result<(), DavError>
    where
        F: FnOnce(Result<Payload, DavError>) + Send + 'static,
    {
        let handle = self.dispatch(kind, request)?;
        tokio::spawn(async move { on_complete(handle.await) });
        Ok(())
    }

    // ----------- Operations -----------

    /// `MKCOL`
    pub async fn create_collection(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Ack, DavError> {
        self.run_ack(OperationKind::CreateCollection, OperationRequest::new(url, username, password))
            .await
    }

    /// `PROPFIND` with `Depth: 0`; a non-2xx status is a "does not exist" server error.
    pub async fn collection_exists(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Ack, DavError> {
        self.run_ack(OperationKind::CollectionExists, OperationRequest::new(url, username, password))
            .await
    }

    /// `PROPFIND` with `Depth: 1`, returning the multistatus document untouched.
    ///
    /// Use [`crate::parse_listing`] to turn it into entries.
    pub async fn list_contents(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Bytes, DavError> {
        self.run_bytes(OperationKind::ListContents, OperationRequest::new(url, username, password))
            .await
    }

    /// `PUT` raw bytes, or Base64 text with an optional `data:...;base64,` marker.
    pub async fn upload_file(
        &self,
        url: &str,
        username: &str,
        password: &str,
        content: impl Into<UploadContent>,
    ) -> Result<Ack, DavError> {
        let request = OperationRequest::new(url, username, password).with_content(content);
        self.run_ack(OperationKind::UploadFile, request).await
    }

    /// `GET`, returning the raw response body.
    pub async fn download_file(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Bytes, DavError> {
        self.run_bytes(OperationKind::DownloadFile, OperationRequest::new(url, username, password))
            .await
    }

    /// Alias of [`WebDavClient::download_file`].
    pub async fn get_file_content(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Bytes, DavError> {
        self.download_file(url, username, password).await
    }

    /// `DELETE`
    pub async fn delete_resource(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Ack, DavError> {
        self.run_ack(OperationKind::DeleteResource, OperationRequest::new(url, username, password))
            .await
    }

    async fn run_ack(&self, kind: OperationKind, request: OperationRequest) -> Result<Ack, DavError> {
        self.dispatch(kind, request)?.await.map(Payload::into_ack)
    }

    async fn run_bytes(
        &self,
        kind: OperationKind,
        request: OperationRequest,
    ) -> Result<Bytes, DavError> {
        self.dispatch(kind, request)?.await.map(Payload::into_bytes)
    }
}
