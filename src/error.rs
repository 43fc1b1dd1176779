//! Error types for the signature subsystem.
//!
//! This module defines all error types that can occur while signing or
//! validating PDF signatures.

/// Result type alias for signature operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during signing and validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Signing was requested without a private key or certificate
    #[error("Missing signing credential: {0}")]
    MissingCredential(String),

    /// The supplied key type does not fit the requested signature format
    #[error("Credential mismatch: {0}")]
    CredentialMismatch(String),

    /// Embedded or supplied certificate bytes could not be parsed
    #[error("Certificate parse error: {0}")]
    CertificateParse(String),

    /// Contents bytes are not a structurally valid signature container
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// Signature container is valid but the cryptographic check failed
    #[error("Signature verification failed: {0}")]
    VerificationFailed(String),

    /// No handler accepts the Filter/SubFilter pair
    #[error("Unsupported signature format: filter {filter:?}, sub-filter {sub_filter:?}")]
    UnsupportedSignatureFormat {
        /// /Filter of the descriptor, if any
        filter: Option<String>,
        /// /SubFilter of the descriptor, if any
        sub_filter: Option<String>,
    },

    /// Encoded signature does not fit the reserved /Contents buffer
    #[error("Signature ({size} bytes) exceeds reserved contents size ({capacity} bytes)")]
    SignatureTooLarge {
        /// Size of the encoded signature
        size: usize,
        /// Size of the reserved buffer
        capacity: usize,
    },

    /// ByteRange is missing, malformed or does not fit the file
    #[error("Invalid ByteRange: {0}")]
    InvalidByteRange(String),

    /// Operation is not allowed in the descriptor's current state
    #[error("Invalid signature state: expected {expected}, found {found}")]
    InvalidSignatureState {
        /// State required by the operation
        expected: String,
        /// State the descriptor is in
        found: String,
    },

    /// Private key could not be decoded
    #[error("Key error: {0}")]
    Key(String),

    /// Building the signature failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// DER encoding error
    #[error("DER error: {0}")]
    Der(#[from] der::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a validation outcome that should be reported
    /// rather than propagated.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Error::MalformedSignature(_) | Error::VerificationFailed(_) | Error::CertificateParse(_)
        )
    }
}
