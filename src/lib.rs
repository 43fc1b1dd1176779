// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::large_enum_variant)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Signature Handlers
//!
//! Digital signature handlers for PDF documents: placeholder reservation,
//! byte-range digests, CMS/PKCS#7 signing and validation.
//!
//! ## Core Features
//!
//! - **Handlers**: RSA PKCS#1 v1.5, RSA-PSS, ECDSA P-256, Ed25519 and raw RSA SHA-1
//! - **Two-Pass Signing**: fixed-size /Contents reserved before the file is laid out
//! - **Incremental Writing**: signature object appended after the original bytes
//! - **Verification**: handler selection by /Filter and /SubFilter, digest and signature checks
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_sighandler::signatures::{PdfSigner, SignatureDescriptor, SignatureSubFilter};
//! use pdf_sighandler::signatures::SigningCredentials;
//! use pdf_sighandler::writer::IncrementalSignatureWriter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = SigningCredentials::from_pem(&cert_pem, &key_pem)?;
//! let signer = PdfSigner::new(credentials.handler(SignatureSubFilter::Pkcs7Detached)?);
//!
//! let mut writer = IncrementalSignatureWriter::new(std::fs::read("input.pdf")?, 42);
//! let mut descriptor = SignatureDescriptor::new().with_name("Jane Doe");
//! signer.sign(&mut descriptor, &mut writer)?;
//! std::fs::write("signed.pdf", writer.into_bytes())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// PDF object model
pub mod object;

// Digital signatures
pub mod signatures;

// Incremental writing
pub mod writer;

// Re-exports
pub use config::SignatureConfig;
pub use error::{Error, Result};
pub use signatures::{
    PdfSigner, SignatureDescriptor, SignatureHandler, SignatureVerifier, SigningCredentials,
};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
