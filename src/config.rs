//! Configuration for signature creation.

use crate::signatures::DigestAlgorithm;

/// Default estimated signature size in bytes.
pub const DEFAULT_ESTIMATED_SIZE: usize = 8192;

/// Signature creation configuration.
///
/// The reserved /Contents buffer is `estimated_size * 2 + 2` bytes, which is
/// generous enough for RSA-4096 signatures with a short certificate chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureConfig {
    /// Upper bound for the DER-encoded signature container.
    pub estimated_size: usize,

    /// Digest used by the RSA handlers.
    pub digest_algorithm: DigestAlgorithm,

    /// Add the signing-time signed attribute.
    pub include_signing_time: bool,

    /// Add the ESS signing-certificate-v2 attribute to CAdES signatures.
    pub signing_certificate_v2: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            estimated_size: DEFAULT_ESTIMATED_SIZE,
            digest_algorithm: DigestAlgorithm::Sha256,
            include_signing_time: true,
            signing_certificate_v2: true,
        }
    }

    /// Set the estimated signature size.
    pub fn with_estimated_size(mut self, size: usize) -> Self {
        self.estimated_size = size;
        self
    }

    /// Set the digest algorithm for RSA signatures.
    pub fn with_digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }

    /// Enable or disable the signing-time attribute.
    pub fn with_signing_time(mut self, enable: bool) -> Self {
        self.include_signing_time = enable;
        self
    }

    /// Enable or disable the signing-certificate-v2 attribute.
    pub fn with_signing_certificate_v2(mut self, enable: bool) -> Self {
        self.signing_certificate_v2 = enable;
        self
    }

    /// Size in bytes of the /Contents buffer a real signature is padded to.
    pub fn contents_len(&self) -> usize {
        self.estimated_size * 2 + 2
    }
}
