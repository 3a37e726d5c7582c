use std::sync::Arc;

use hyper_rustls::ConfigBuilderExt;
use rustls::ClientConfig;

use crate::tls::certificate::PinnedAuthority;
use crate::tls::verifier::InsecureVerifier;

/// The trust mode currently in force.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustMode {
    /// Platform roots with standard chain and hostname verification.
    Default,
    /// Any chain, any hostname. Unsafe.
    InsecureTrustAll,
    /// Only chains rooted at the pinned certificate; hostnames not checked.
    PinnedAuthority(PinnedAuthority),
}

impl TrustMode {
    pub fn name(&self) -> &'static str {
        match self {
            TrustMode::Default => "default",
            TrustMode::InsecureTrustAll => "insecure",
            TrustMode::PinnedAuthority(_) => "pinned-authority",
        }
    }
}

/// Immutable trust settings. Every change produces a new value, so a
/// transport built from one policy never observes another policy's material.
///
/// Insecure mode overrides a pinned authority without forgetting it: turning
/// insecure mode off falls back to the pinned certificate if one was set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustPolicy {
    insecure: bool,
    pinned: Option<PinnedAuthority>,
}

impl TrustPolicy {
    pub fn mode(&self) -> TrustMode {
        match (&self.pinned, self.insecure) {
            (_, true) => TrustMode::InsecureTrustAll,
            (Some(authority), false) => TrustMode::PinnedAuthority(authority.clone()),
            (None, false) => TrustMode::Default,
        }
    }

    pub fn with_insecure_mode(&self, enabled: bool) -> Self {
        Self {
            insecure: enabled,
            pinned: self.pinned.clone(),
        }
    }

    /// Pin `authority` and leave insecure mode.
    pub fn with_pinned_authority(&self, authority: PinnedAuthority) -> Self {
        Self {
            insecure: false,
            pinned: Some(authority),
        }
    }

    pub fn without_pinned_authority(&self) -> Self {
        Self {
            insecure: self.insecure,
            pinned: None,
        }
    }

    /// Produce the rustls configuration matching [`TrustPolicy::mode`].
    pub fn current_tls_config(&self) -> ClientConfig {
        match self.mode() {
            TrustMode::Default => platform_tls_config(),
            TrustMode::InsecureTrustAll => {
                // `builder()` installs the default provider the verifier reads.
                let builder = ClientConfig::builder();
                let verifier = InsecureVerifier::from_default_provider();
                builder
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(verifier))
                    .with_no_client_auth()
            }
            TrustMode::PinnedAuthority(authority) => ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(authority.verifier())
                .with_no_client_auth(),
        }
    }
}

/// Native roots when the platform store is readable, the bundled WebPKI store otherwise.
fn platform_tls_config() -> ClientConfig {
    match ClientConfig::builder().with_native_roots() {
        Ok(builder) => builder.with_no_client_auth(),
        Err(err) => {
            tracing::debug!(error = %err, "native roots unavailable, falling back to webpki roots");
            ClientConfig::builder()
                .with_webpki_roots()
                .with_no_client_auth()
        }
    }
}
