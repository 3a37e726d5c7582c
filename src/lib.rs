//! WebDAV client core with a swappable TLS trust policy.
//!
//! This library issues the WebDAV operations a sync client needs (MKCOL,
//! PROPFIND, GET, PUT, DELETE) over hyper 1.x and rustls, under one of three
//! trust modes that can be changed at runtime.
//!
//! # Features
//!
//! - Three trust modes: platform default, insecure trust-all, and a single
//!   pinned certificate authority
//! - Atomic trust switching: in-flight operations finish on the transport they
//!   were dispatched on, later ones see the new mode
//! - Non-blocking dispatch with a future handle or a completion callback
//! - HTTP Basic authentication computed per call, never cached
//! - Typed failures separating caller mistakes from transport and server errors
//! - Transparent response decompression (br/zstd/gzip)
//! - Optional parsing of `207 Multi-Status` listings
//!
//! # Examples
//!
//! ## Basic operations
//!
//! ```no_run
//! use dav_trust::{WebDavClient, parse_listing};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = WebDavClient::new();
//!     let base = "https://dav.example.com/remote.php/dav/files/alice";
//!
//!     client.create_collection(&format!("{base}/notes/"), "alice", "secret").await?;
//!     client
//!         .upload_file(&format!("{base}/notes/todo.md"), "alice", "secret", b"- milk".to_vec())
//!         .await?;
//!
//!     let listing = client.list_contents(&format!("{base}/notes/"), "alice", "secret").await?;
//!     for entry in parse_listing(&listing)? {
//!         println!("{} (collection: {})", entry.name, entry.is_collection);
//!     }
//!
//!     let body = client.download_file(&format!("{base}/notes/todo.md"), "alice", "secret").await?;
//!     assert_eq!(&body[..], b"- milk");
//!     Ok(())
//! }
//! ```
//!
//! ## Trust configuration
//!
//! A self-hosted server with a private CA can be pinned. Hostname checks are
//! skipped in that mode so servers reached by IP address keep working.
//!
//! ```no_run
//! use dav_trust::{TrustMode, WebDavClient};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = WebDavClient::new();
//!     let ca = std::fs::read("home-ca.pem")?;
//!     client.upload_trusted_certificate(&ca)?;
//!     assert!(matches!(client.trust_mode(), TrustMode::PinnedAuthority(_)));
//!
//!     client.collection_exists("https://192.168.1.20/dav/", "alice", "secret").await?;
//!
//!     // Temporarily trust everything, then fall back to the pinned CA.
//!     client.set_insecure_mode(true);
//!     client.set_insecure_mode(false);
//!     Ok(())
//! }
//! ```
//!
//! ## Dispatch handles and callbacks
//!
//! ```no_run
//! use dav_trust::{OperationKind, OperationRequest, WebDavClient};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = WebDavClient::new();
//!     let request = OperationRequest::new("https://dav.example.com/a.txt", "alice", "secret");
//!
//!     // Validation errors surface here, synchronously.
//!     let handle = client.dispatch(OperationKind::DownloadFile, request.clone())?;
//!     let payload = handle.await?;
//!     println!("{} bytes", payload.into_bytes().len());
//!
//!     client.dispatch_with_callback(OperationKind::DeleteResource, request, |result| {
//!         match result {
//!             Ok(ack) => println!("deleted: {}", ack.into_ack()),
//!             Err(err) => eprintln!("delete failed: {err}"),
//!         }
//!     })?;
//!     Ok(())
//! }
//! ```
pub mod common;
pub mod error;
pub mod tls;
pub mod webdav;

pub use common::compression::{ContentEncoding, add_accept_encoding, detect_encodings};
pub use common::{TransportOptions, UploadContent, basic_auth_header, decode_upload_content};
pub use error::{DavError, FailureKind};
pub use tls::{PinnedAuthority, TrustMode, TrustPolicy};
pub use webdav::{
    Ack, Credentials, DavEntry, Depth, OperationHandle, OperationKind, OperationRequest,
    OperationState, Payload, RequestDescriptor, WebDavClient, WebDavTransport, parse_listing,
};
