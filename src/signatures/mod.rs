//! PDF Digital Signatures module.
//!
//! This module provides functionality for creating and verifying digital signatures
//! in PDF documents according to the PDF specification and PAdES (PDF Advanced
//! Electronic Signatures) standards.
//!
//! ## Features
//!
//! - **Signature Handlers**: RSA, RSA-PSS, ECDSA P-256 and Ed25519 behind one enum
//! - **Placeholder Protocol**: fixed-size /Contents reserved before signing
//! - **Signature Verification**: CMS parsing and digest re-computation over the ByteRange
//! - **ByteRange Calculation**: Proper handling of PDF byte ranges for signing
//!
//! ## Signature Types Supported
//!
//! - PKCS#7 detached signatures (adbe.pkcs7.detached)
//! - PAdES signatures (ETSI.CAdES.detached)
//! - Raw RSA SHA-1 signatures (adbe.x509.rsa_sha1)
//!
//! ## Example
//!
//! ```ignore
//! use pdf_sighandler::signatures::{PdfSigner, SignatureDescriptor, SignatureSubFilter};
//! use pdf_sighandler::signatures::{SignatureVerifier, SigningCredentials};
//! use pdf_sighandler::writer::IncrementalSignatureWriter;
//!
//! let credentials = SigningCredentials::from_pem(&cert_pem, &key_pem)?;
//! let signer = PdfSigner::new(credentials.handler(SignatureSubFilter::CadesDetached)?);
//!
//! let mut writer = IncrementalSignatureWriter::new(pdf_bytes, next_object_id);
//! let mut descriptor = SignatureDescriptor::new().with_reason("Approved");
//! signer.sign(&mut descriptor, &mut writer)?;
//! let signed = writer.into_bytes();
//!
//! let result = SignatureVerifier::new().verify_document(&signed, &descriptor)?;
//! assert!(result.validation.is_verified);
//! ```
//!
//! ## PDF Specification Reference
//!
//! - ISO 32000-1:2008 Section 12.8 - Digital Signatures
//! - ISO 32000-2:2020 Section 12.8 - Digital Signatures
//! - ETSI TS 102 778 - PAdES

mod byterange;
mod cms;
mod descriptor;
mod digest;
mod document;
mod handler;
mod keys;
pub mod oids;
mod signer;
mod types;
mod verifier;

pub use byterange::{ByteRangeCalculator, BYTE_RANGE_PLACEHOLDER};
pub use descriptor::{format_pdf_date, parse_pdf_date, SignatureDescriptor, SignatureState};
pub use digest::DigestSink;
pub use document::{ByteRangeReader, SignatureDocumentWriter};
pub use handler::{HandlerKind, SignatureHandler, SIZING_SENTINEL};
pub use keys::{PrivateKey, SigningCredentials};
pub use signer::PdfSigner;
pub use types::{
    DigestAlgorithm, SignatureFilter, SignatureInfo, SignatureSubFilter, ValidationResult,
    VerificationResult, VerificationStatus,
};
pub use verifier::SignatureVerifier;
