use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use rustls::RootCertStore;
use rustls::client::WebPkiServerVerifier;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::pem::PemObject;

use crate::error::DavError;
use crate::tls::verifier::PinnedAuthorityVerifier;

const PEM_MARKER: &[u8] = b"-----BEGIN";
const DER_SEQUENCE_TAG: u8 = 0x30;

/// A single operator-supplied certificate used as the sole trust root.
///
/// Construction parses the certificate and prepares its verifier up front, so
/// a value of this type is always usable and switching to it cannot fail.
#[derive(Clone)]
pub struct PinnedAuthority {
    der: CertificateDer<'static>,
    verifier: Arc<PinnedAuthorityVerifier>,
}

impl PinnedAuthority {
    /// Accepts DER, PEM, or Base64 text of the DER encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DavError> {
        let der = parse_certificate(bytes)?;

        let mut roots = RootCertStore::empty();
        roots
            .add(der.clone())
            .map_err(|err| DavError::Certificate(err.to_string()))?;
        let inner = WebPkiServerVerifier::builder(Arc::new(roots))
            .build()
            .map_err(|err| DavError::Certificate(err.to_string()))?;

        Ok(Self {
            verifier: Arc::new(PinnedAuthorityVerifier::new(der.clone(), inner)),
            der,
        })
    }

    /// DER encoding of the pinned certificate.
    pub fn der(&self) -> &[u8] {
        self.der.as_ref()
    }

    pub(crate) fn verifier(&self) -> Arc<PinnedAuthorityVerifier> {
        Arc::clone(&self.verifier)
    }
}

impl PartialEq for PinnedAuthority {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for PinnedAuthority {}

impl fmt::Debug for PinnedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedAuthority")
            .field("der_len", &self.der.as_ref().len())
            .finish()
    }
}

fn parse_certificate(bytes: &[u8]) -> Result<CertificateDer<'static>, DavError> {
    // DER is binary: its trailing bytes may look like whitespace.
    if bytes.first() == Some(&DER_SEQUENCE_TAG) {
        return Ok(CertificateDer::from(bytes.to_vec()));
    }

    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() {
        return Err(DavError::Certificate("certificate is empty".into()));
    }

    if trimmed.starts_with(PEM_MARKER) {
        return CertificateDer::from_pem_slice(trimmed)
            .map_err(|err| DavError::Certificate(format!("unreadable PEM certificate: {err:?}")));
    }

    let text = std::str::from_utf8(trimmed)
        .map_err(|_| DavError::Certificate("certificate is neither DER, PEM nor Base64".into()))?;
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let der = B64
        .decode(compact)
        .map_err(|err| DavError::Certificate(format!("invalid Base64 certificate: {err}")))?;
    Ok(CertificateDer::from(der))
}
