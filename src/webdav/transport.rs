use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{Request, header};
use tokio::time::Instant;

use crate::common::compression::{add_accept_encoding, decompress_body, detect_encodings};
use crate::common::http::{
    HyperClient, IdleTimer, RequestBody, TransportOptions, build_hyper_client,
};
use crate::error::DavError;
use crate::tls::TrustPolicy;
use crate::webdav::handle::{OperationHandle, OperationState, StateCell};
use crate::webdav::operations::OperationKind;
use crate::webdav::response::{RawResponse, decode_response};
use crate::webdav::types::RequestDescriptor;

/// One HTTP client bound to one immutable [`TrustPolicy`].
///
/// Transports are never reconfigured: a trust change builds a new one via
/// [`WebDavTransport::rebuild`]. Operations hold an `Arc` to the transport
/// they were dispatched on, so they finish with the trust material they
/// started with.
pub struct WebDavTransport {
    client: HyperClient,
    policy: TrustPolicy,
    options: TransportOptions,
    generation: u64,
}

impl WebDavTransport {
    pub fn new(policy: TrustPolicy, options: TransportOptions) -> Self {
        Self::build(policy, options, 0)
    }

    fn build(policy: TrustPolicy, options: TransportOptions, generation: u64) -> Self {
        let client = build_hyper_client(policy.current_tls_config(), &options);
        Self {
            client,
            policy,
            options,
            generation,
        }
    }

    /// A fresh transport for `policy`, keeping these options.
    pub fn rebuild(&self, policy: TrustPolicy) -> Self {
        Self::build(policy, self.options.clone(), self.generation + 1)
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Number of rebuilds that led to this transport.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run `descriptor` on a Tokio worker and return immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(
        self: &Arc<Self>,
        kind: OperationKind,
        descriptor: RequestDescriptor,
    ) -> OperationHandle {
        let state = Arc::new(StateCell::default());
        let task_state = Arc::clone(&state);
        let transport = Arc::clone(self);

        let task = tokio::spawn(async move {
            task_state.advance(OperationState::Dispatched);
            let outcome = transport.execute(descriptor).await;
            let result = decode_response(kind, outcome);
            match &result {
                Ok(_) => task_state.advance(OperationState::Succeeded),
                Err(err) => {
                    tracing::debug!(operation = %kind, error = %err, "operation failed");
                    task_state.advance(OperationState::Failed);
                }
            }
            result
        });

        OperationHandle::new(kind, state, task)
    }

    /// Send one request and aggregate its (decompressed) body.
    ///
    /// `read_timeout` bounds each stretch without progress, not the transfer
    /// as a whole. Until the connection is up the budget also includes
    /// `connect_timeout`.
    pub(crate) async fn execute(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<RawResponse, DavError> {
        let RequestDescriptor {
            method,
            url,
            mut headers,
            body,
        } = descriptor;

        if self.options.accept_compressed {
            add_accept_encoding(&mut headers);
        }
        if let Some(user_agent) = &self.options.user_agent
            && !headers.contains_key(header::USER_AGENT)
            && let Ok(value) = header::HeaderValue::from_str(user_agent)
        {
            headers.insert(header::USER_AGENT, value);
        }

        tracing::debug!(
            %method,
            %url,
            trust = self.policy.mode().name(),
            generation = self.generation,
            "dispatching WebDAV request"
        );
        let started = Instant::now();

        let mut req_builder = Request::builder().method(method).uri(url);
        if let Some(req_headers) = req_builder.headers_mut() {
            req_headers.extend(headers);
        }
        let timer = IdleTimer::new(
            self.options.read_timeout,
            self.options.connect_timeout + self.options.read_timeout,
        );
        let req = req_builder
            .body(RequestBody::new(body.unwrap_or_default()).with_timer(timer.clone()))
            .map_err(|err| DavError::InvalidRequest(err.to_string()))?;

        let resp = tokio::select! {
            resp = self.client.request(req) => resp.map_err(classify_client_error)?,
            () = timer.expired() => return Err(DavError::timeout()),
        };
        timer.touch();

        let status = resp.status();
        let encodings = if self.options.accept_compressed {
            detect_encodings(resp.headers())
        } else {
            Vec::new()
        };

        let progress = timer.clone();
        let incoming = resp.into_body().map_frame(move |frame| {
            progress.touch();
            frame
        });
        let body = tokio::select! {
            read = decompress_body(incoming, &encodings) => read.map_err(|err| {
                if chain_timed_out(&err) {
                    return DavError::timeout();
                }
                DavError::Transport {
                    message: format!("failed to read response body: {err:#}"),
                    source: Some(err.into()),
                }
            }),
            () = timer.expired() => Err(DavError::timeout()),
        };

        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            body_len = body.as_ref().map(Bytes::len).ok(),
            "WebDAV response received"
        );

        Ok(RawResponse { status, body })
    }
}

impl std::fmt::Debug for WebDavTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDavTransport")
            .field("trust", &self.policy.mode().name())
            .field("generation", &self.generation)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn classify_client_error(err: hyper_util::client::legacy::Error) -> DavError {
    if is_timeout(&err) {
        return DavError::Transport {
            message: "timeout".into(),
            source: Some(Box::new(err)),
        };
    }
    DavError::transport_from(err)
}

fn chain_timed_out(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| is_timeout(cause))
}

fn is_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(io_err) = cause.downcast_ref::<io::Error>()
            && io_err.kind() == io::ErrorKind::TimedOut
        {
            return true;
        }
        current = cause.source();
    }
    false
}
