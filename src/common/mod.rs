pub mod auth;
pub mod compression;
pub mod encoding;
pub mod http;

pub use auth::basic_auth_header;
pub use compression::{ContentEncoding, add_accept_encoding, decompress_body, detect_encodings};
pub use encoding::{UploadContent, decode_upload_content};
pub use http::{HyperClient, TransportOptions, build_hyper_client};
