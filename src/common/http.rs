use std::collections::VecDeque;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use hyper::body::{Body, Frame, SizeHint};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use rustls::ClientConfig;
use tokio::time::Instant;

/// Type alias for the Hyper client every transport snapshot owns.
pub type HyperClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, RequestBody>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POOL_IDLE_PER_HOST: usize = 32;
const UPLOAD_CHUNK: usize = 64 * 1024;

/// Knobs applied to every transport the client builds.
///
/// The defaults tolerate slow self-hosted servers over cellular links: 30 s to
/// connect and 30 s without progress once connected. `read_timeout` is an
/// inactivity limit, not a bound on the whole transfer: every request chunk
/// sent and every response frame received restarts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    /// Advertise `Accept-Encoding: br, zstd, gzip` and decode compressed bodies.
    pub accept_compressed: bool,
    pub user_agent: Option<String>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_IDLE_PER_HOST,
            accept_compressed: true,
            user_agent: Some(concat!("dav-trust/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl TransportOptions {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_pool_max_idle_per_host(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.accept_compressed = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Build a Hyper client with HTTP/2, connection pooling and the given rustls
/// configuration. Plain `http://` URLs are still accepted by the connector.
pub fn build_hyper_client(tls: ClientConfig, options: &TransportOptions) -> HyperClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(options.connect_timeout));

    let https = HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new())
        .http2_adaptive_window(true)
        .pool_max_idle_per_host(options.pool_max_idle_per_host)
        .build::<_, RequestBody>(https)
}

/// Deadline that moves forward whenever the exchange makes progress.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    origin: Instant,
    idle: Duration,
    /// Milliseconds after `origin`.
    deadline: Arc<AtomicU64>,
}

impl IdleTimer {
    /// Expires after `initial`, or `idle` after the latest [`IdleTimer::touch`].
    pub fn new(idle: Duration, initial: Duration) -> Self {
        Self {
            origin: Instant::now(),
            idle,
            deadline: Arc::new(AtomicU64::new(millis(initial))),
        }
    }

    /// Record progress.
    pub fn touch(&self) {
        let next = millis(self.origin.elapsed() + self.idle);
        self.deadline.fetch_max(next, Ordering::AcqRel);
    }

    /// Resolve once no progress was recorded for the idle period.
    pub async fn expired(&self) {
        loop {
            let deadline =
                self.origin + Duration::from_millis(self.deadline.load(Ordering::Acquire));
            if Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep_until(deadline).await;
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Request body handed to hyper in bounded chunks with an exact length, so
/// uploads keep a `Content-Length` and each chunk pulled counts as progress.
#[derive(Debug, Default)]
pub struct RequestBody {
    chunks: VecDeque<Bytes>,
    remaining: u64,
    timer: Option<IdleTimer>,
}

impl RequestBody {
    pub fn new(body: Bytes) -> Self {
        let remaining = body.len() as u64;
        let mut chunks = VecDeque::with_capacity(body.len().div_ceil(UPLOAD_CHUNK));
        let mut start = 0;
        while start < body.len() {
            let end = (start + UPLOAD_CHUNK).min(body.len());
            chunks.push_back(body.slice(start..end));
            start = end;
        }
        Self {
            chunks,
            remaining,
            timer: None,
        }
    }

    pub fn with_timer(mut self, timer: IdleTimer) -> Self {
        self.timer = Some(timer);
        self
    }
}

impl Body for RequestBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let Some(chunk) = this.chunks.pop_front() else {
            return Poll::Ready(None);
        };
        this.remaining -= chunk.len() as u64;
        if let Some(timer) = &this.timer {
            timer.touch();
        }
        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.chunks.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}
