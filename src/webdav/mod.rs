pub mod client;
pub mod handle;
pub mod listing;
pub mod operations;
pub mod response;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::WebDavClient;
pub use handle::{OperationHandle, OperationState};
pub use listing::parse_listing;
pub use operations::{OperationKind, OperationRequest};
pub use transport::WebDavTransport;
pub use types::{Ack, Credentials, DavEntry, Depth, Payload, RequestDescriptor};
pub use xml::{LISTING_PROPERTIES, build_propfind_body};
