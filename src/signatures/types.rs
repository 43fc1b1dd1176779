//! Digital signature types and data structures.
//!
//! This module defines the core types used for PDF digital signatures.

use super::oids;
use const_oid::ObjectIdentifier;
use rsa::{Pkcs1v15Sign, Pss};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use spki::AlgorithmIdentifierOwned;

use crate::error::{Error, Result};

/// Digest algorithm used for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    /// SHA-1 (deprecated, but still common in legacy PDFs)
    Sha1,
    /// SHA-256 (recommended)
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// Get the OID for this digest algorithm.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Sha1 => oids::ID_SHA1,
            DigestAlgorithm::Sha256 => oids::ID_SHA256,
            DigestAlgorithm::Sha384 => oids::ID_SHA384,
            DigestAlgorithm::Sha512 => oids::ID_SHA512,
        }
    }

    /// Look up a digest algorithm by OID.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ]
        .into_iter()
        .find(|alg| alg.oid() == *oid)
    }

    /// Get the name of this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Hash `data` with this algorithm.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// AlgorithmIdentifier with absent parameters.
    pub(crate) fn algorithm_identifier(&self) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: self.oid(),
            parameters: None,
        }
    }

    /// PKCS#1 v1.5 padding scheme bound to this digest.
    pub(crate) fn pkcs1v15(&self) -> Pkcs1v15Sign {
        match self {
            DigestAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            DigestAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            DigestAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            DigestAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }

    /// PSS padding scheme bound to this digest, salt length = digest size.
    pub(crate) fn pss(&self) -> Pss {
        match self {
            DigestAlgorithm::Sha1 => Pss::new::<Sha1>(),
            DigestAlgorithm::Sha256 => Pss::new::<Sha256>(),
            DigestAlgorithm::Sha384 => Pss::new::<Sha384>(),
            DigestAlgorithm::Sha512 => Pss::new::<Sha512>(),
        }
    }

    /// `shaNNNWithRSAEncryption` identifier for PKCS#1 v1.5 signatures.
    pub(crate) fn rsa_signature_oid(&self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Sha1 => oids::SHA1_WITH_RSA,
            DigestAlgorithm::Sha256 => oids::SHA256_WITH_RSA,
            DigestAlgorithm::Sha384 => oids::SHA384_WITH_RSA,
            DigestAlgorithm::Sha512 => oids::SHA512_WITH_RSA,
        }
    }

    /// RSASSA-PSS identifier with explicit parameters for this digest.
    pub(crate) fn pss_algorithm_identifier(&self) -> Result<AlgorithmIdentifierOwned> {
        let id = match self {
            DigestAlgorithm::Sha1 => rsa::pss::get_default_pss_signature_algo_id::<Sha1>(),
            DigestAlgorithm::Sha256 => rsa::pss::get_default_pss_signature_algo_id::<Sha256>(),
            DigestAlgorithm::Sha384 => rsa::pss::get_default_pss_signature_algo_id::<Sha384>(),
            DigestAlgorithm::Sha512 => rsa::pss::get_default_pss_signature_algo_id::<Sha512>(),
        };
        id.map_err(|e| Error::Signing(format!("RSASSA-PSS parameters: {}", e)))
    }
}

/// Signature filter (preferred signature handler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureFilter {
    /// Adobe.PPKLite
    #[default]
    PpkLite,
    /// Adobe.PPKMS
    PpkMs,
}

impl SignatureFilter {
    /// Get the PDF name for this filter.
    pub fn as_pdf_name(&self) -> &'static str {
        match self {
            SignatureFilter::PpkLite => "Adobe.PPKLite",
            SignatureFilter::PpkMs => "Adobe.PPKMS",
        }
    }

    /// Parse a PDF name into a filter.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "Adobe.PPKLite" => Some(SignatureFilter::PpkLite),
            "Adobe.PPKMS" => Some(SignatureFilter::PpkMs),
            _ => None,
        }
    }
}

/// Signature sub-filter type (signature format).
///
/// Only formats some handler signs or validates are listed; other names
/// parse to `None` and verify as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureSubFilter {
    /// adbe.pkcs7.detached - PKCS#7 detached signature
    #[default]
    Pkcs7Detached,
    /// adbe.x509.rsa_sha1 - raw RSA signature with the certificate in /Cert
    X509RsaSha1,
    /// ETSI.CAdES.detached - PAdES CAdES signature
    CadesDetached,
}

impl SignatureSubFilter {
    /// Get the PDF name for this sub-filter.
    pub fn as_pdf_name(&self) -> &'static str {
        match self {
            SignatureSubFilter::Pkcs7Detached => "adbe.pkcs7.detached",
            SignatureSubFilter::X509RsaSha1 => "adbe.x509.rsa_sha1",
            SignatureSubFilter::CadesDetached => "ETSI.CAdES.detached",
        }
    }

    /// Parse a PDF name into a sub-filter type.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "adbe.pkcs7.detached" => Some(SignatureSubFilter::Pkcs7Detached),
            "adbe.x509.rsa_sha1" => Some(SignatureSubFilter::X509RsaSha1),
            "ETSI.CAdES.detached" => Some(SignatureSubFilter::CadesDetached),
            _ => None,
        }
    }
}

/// Outcome of a single handler validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// The descriptor carries a signature
    pub is_signed: bool,
    /// The signature verified against the recomputed digest
    pub is_verified: bool,
    /// Why verification did not succeed
    pub reason: Option<String>,
    /// DER of the certificate the signature verified against
    pub certificate: Option<Vec<u8>>,
}

impl ValidationResult {
    /// A successful verification against `certificate`.
    pub fn verified(certificate: Vec<u8>) -> Self {
        Self {
            is_signed: true,
            is_verified: true,
            reason: None,
            certificate: Some(certificate),
        }
    }

    /// A signed but unverified result.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            is_signed: true,
            is_verified: false,
            reason: Some(reason.into()),
            certificate: None,
        }
    }
}

/// Information about an existing signature in a PDF.
#[derive(Debug, Clone, Default)]
pub struct SignatureInfo {
    /// Name of the signer
    pub signer_name: Option<String>,
    /// Signing time
    pub signing_time: Option<String>,
    /// Reason for signing
    pub reason: Option<String>,
    /// Signing location
    pub location: Option<String>,
    /// Contact information
    pub contact_info: Option<String>,
    /// Signature sub-filter type
    pub sub_filter: Option<SignatureSubFilter>,
    /// Whether the signature covers the whole document
    pub covers_whole_document: bool,
    /// Byte range of the signed data
    pub byte_range: Vec<i64>,
    /// Certificate subject common name
    pub certificate_cn: Option<String>,
    /// Certificate issuer
    pub certificate_issuer: Option<String>,
}

/// Result of signature verification.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Overall verification status
    pub status: VerificationStatus,
    /// Signature information
    pub signature_info: SignatureInfo,
    /// Handler validation outcome
    pub validation: ValidationResult,
    /// Verification messages (errors, warnings)
    pub messages: Vec<String>,
    /// Whether the document was modified after signing
    pub document_modified: bool,
    /// Whether the certificate is trusted
    pub certificate_trusted: bool,
    /// Whether the certificate has expired
    pub certificate_expired: bool,
}

impl Default for VerificationResult {
    fn default() -> Self {
        Self {
            status: VerificationStatus::Unknown,
            signature_info: SignatureInfo::default(),
            validation: ValidationResult::default(),
            messages: Vec::new(),
            document_modified: false,
            certificate_trusted: false,
            certificate_expired: false,
        }
    }
}

/// Verification status of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Signature is valid
    Valid,
    /// Signature is invalid (cryptographically)
    Invalid,
    /// Signature validity is unknown (e.g., untrusted certificate)
    Unknown,
    /// Signature is valid but the document was modified
    ValidWithWarnings,
}

impl VerificationStatus {
    /// Check if the status indicates a valid signature.
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationStatus::Valid)
    }

    /// Check if the status indicates any form of validity (including warnings).
    pub fn is_ok(&self) -> bool {
        matches!(self, VerificationStatus::Valid | VerificationStatus::ValidWithWarnings)
    }
}
