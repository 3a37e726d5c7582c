pub mod certificate;
pub mod policy;
mod verifier;

pub use certificate::PinnedAuthority;
pub use policy::{TrustMode, TrustPolicy};
