//! PDF signature verification.
//!
//! This module handles verification of existing digital signatures in PDF documents.

use super::byterange::ByteRangeCalculator;
use super::descriptor::SignatureDescriptor;
use super::document::ByteRangeReader;
use super::handler::{HandlerKind, SignatureHandler};
use super::types::{
    SignatureInfo, SignatureSubFilter, ValidationResult, VerificationResult, VerificationStatus,
};
use crate::error::{Error, Result};
use crate::object::Object;

/// Verifier for PDF digital signatures.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    /// Trusted root certificates (DER-encoded)
    trusted_roots: Vec<Vec<u8>>,
    /// Validation handlers, tried in order
    handlers: Vec<SignatureHandler>,
}

impl SignatureVerifier {
    /// Create a verifier with one validation handler per algorithm family.
    pub fn new() -> Self {
        let handlers = [
            HandlerKind::RsaDetached,
            HandlerKind::EcdsaDetached,
            HandlerKind::RsaPss,
            HandlerKind::Ed25519Detached,
            HandlerKind::RsaSha1,
        ]
        .into_iter()
        .map(SignatureHandler::validator)
        .collect();

        Self {
            trusted_roots: Vec::new(),
            handlers,
        }
    }

    /// Create a verifier with an explicit handler registry.
    pub fn with_handlers(handlers: Vec<SignatureHandler>) -> Self {
        Self {
            trusted_roots: Vec::new(),
            handlers,
        }
    }

    /// Registered handlers.
    pub fn handlers(&self) -> &[SignatureHandler] {
        &self.handlers
    }

    /// Add a trusted root certificate.
    pub fn add_trusted_root(&mut self, cert_der: Vec<u8>) {
        self.trusted_roots.push(cert_der);
    }

    /// Add multiple trusted root certificates.
    pub fn add_trusted_roots(&mut self, certs: Vec<Vec<u8>>) {
        self.trusted_roots.extend(certs);
    }

    /// First registered handler applicable to `descriptor`.
    pub fn select_handler(&self, descriptor: &SignatureDescriptor) -> Result<&SignatureHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.is_applicable(descriptor))
            .ok_or_else(|| Error::UnsupportedSignatureFormat {
                filter: descriptor.filter.clone(),
                sub_filter: descriptor.sub_filter.clone(),
            })
    }

    /// Extract signature information from a signature dictionary.
    pub fn extract_signature_info(&self, sig_dict: &Object) -> Result<SignatureInfo> {
        Ok(Self::signature_info(&SignatureDescriptor::from_object(sig_dict)?))
    }

    fn signature_info(descriptor: &SignatureDescriptor) -> SignatureInfo {
        SignatureInfo {
            signer_name: descriptor.name.clone(),
            signing_time: descriptor.signing_time.map(|t| t.to_rfc3339()),
            reason: descriptor.reason.clone(),
            location: descriptor.location.clone(),
            contact_info: descriptor.contact_info.clone(),
            sub_filter: descriptor
                .sub_filter
                .as_deref()
                .and_then(SignatureSubFilter::from_pdf_name),
            covers_whole_document: descriptor.byte_range.len() == 4,
            byte_range: descriptor.byte_range.clone(),
            certificate_cn: None,
            certificate_issuer: None,
        }
    }

    /// Validate `descriptor` against the ByteRange bytes supplied by `reader`.
    ///
    /// Malformed containers, failed checks and unusable certificates are
    /// reported in the result. A missing handler or unreadable ByteRange
    /// is an error.
    pub fn verify<R>(&self, descriptor: &SignatureDescriptor, reader: &R) -> Result<VerificationResult>
    where
        R: ByteRangeReader + ?Sized,
    {
        let handler = self.select_handler(descriptor)?;
        let byte_range = descriptor.byte_range_array()?;

        let mut digest = handler.new_digest(descriptor);
        reader.read_byte_range(&byte_range, &mut digest)?;

        let mut result = VerificationResult {
            signature_info: Self::signature_info(descriptor),
            ..VerificationResult::default()
        };

        let validation = match handler.validate(descriptor, &digest) {
            Ok(validation) => validation,
            Err(e) if e.is_validation_failure() => ValidationResult::failed(e.to_string()),
            Err(e) => return Err(e),
        };

        if validation.is_verified {
            result.status = VerificationStatus::Valid;
            if let Some(cert_der) = &validation.certificate {
                self.apply_certificate(&mut result, cert_der);
            }
        } else {
            result.status = VerificationStatus::Invalid;
            let reason = validation.reason.as_deref().unwrap_or("signature not verified");
            result
                .messages
                .push(format!("Signature verification failed: {}", reason));
        }

        log::debug!(
            "{} validation: {:?}",
            handler.kind().name(),
            result.status
        );
        result.validation = validation;
        Ok(result)
    }

    /// Validate `descriptor` against a complete file, also checking that the
    /// ByteRange covers everything but /Contents.
    pub fn verify_document(
        &self,
        pdf_data: &[u8],
        descriptor: &SignatureDescriptor,
    ) -> Result<VerificationResult> {
        let coverage = descriptor
            .byte_range_array()
            .and_then(|br| ByteRangeCalculator::validate_byte_range(&br, pdf_data.len()));

        let mut result = match self.verify(descriptor, pdf_data) {
            Ok(result) => result,
            Err(Error::InvalidByteRange(e)) => {
                let mut signature_info = Self::signature_info(descriptor);
                signature_info.covers_whole_document = false;
                return Ok(VerificationResult {
                    status: VerificationStatus::Invalid,
                    signature_info,
                    validation: ValidationResult::failed(e.clone()),
                    messages: vec![format!("ByteRange validation failed: {}", e)],
                    document_modified: true,
                    ..VerificationResult::default()
                })
            },
            Err(e) => return Err(e),
        };

        if let Err(e) = coverage {
            result.document_modified = true;
            result.signature_info.covers_whole_document = false;
            result
                .messages
                .push(format!("ByteRange validation failed: {}", e));
            if result.status == VerificationStatus::Valid {
                result.status = VerificationStatus::ValidWithWarnings;
            }
        }
        Ok(result)
    }

    fn apply_certificate(&self, result: &mut VerificationResult, cert_der: &[u8]) {
        match x509_parser::parse_x509_certificate(cert_der) {
            Ok((_, cert)) => {
                result.signature_info.certificate_cn = cert
                    .subject()
                    .iter_common_name()
                    .next()
                    .and_then(|cn| cn.as_str().ok())
                    .map(str::to_string);
                result.signature_info.certificate_issuer = Some(cert.issuer().to_string());
                result.certificate_expired = cert.validity().time_to_expiration().is_none();
            },
            Err(e) => {
                log::warn!("Signer certificate could not be inspected: {}", e);
                result
                    .messages
                    .push(format!("Certificate details unavailable: {}", e));
            },
        }

        if !self.trusted_roots.is_empty() {
            result.certificate_trusted = self.is_certificate_trusted(cert_der);
            if !result.certificate_trusted {
                result.status = VerificationStatus::Unknown;
                result
                    .messages
                    .push("Certificate is not trusted".to_string());
            }
        }

        if result.certificate_expired {
            if result.status == VerificationStatus::Valid {
                result.status = VerificationStatus::ValidWithWarnings;
            }
            result.messages.push("Certificate has expired".to_string());
        }
    }

    /// Check if a certificate is in the trusted roots.
    fn is_certificate_trusted(&self, cert_der: &[u8]) -> bool {
        self.trusted_roots.iter().any(|root| root == cert_der)
    }

    /// Quick check if a signature appears valid (without full cryptographic verification).
    pub fn quick_check(&self, sig_dict: &Object) -> Result<bool> {
        let descriptor = SignatureDescriptor::from_object(sig_dict)?;
        Ok(descriptor.byte_range.len() == 4 && self.select_handler(&descriptor).is_ok())
    }
}

impl Default for SignatureVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn make_sig_dict() -> Object {
        let mut dict = HashMap::new();
        dict.insert("Type".to_string(), Object::Name("Sig".to_string()));
        dict.insert("Filter".to_string(), Object::Name("Adobe.PPKLite".to_string()));
        dict.insert("SubFilter".to_string(), Object::Name("adbe.pkcs7.detached".to_string()));
        dict.insert("Name".to_string(), Object::String(b"Test Signer".to_vec()));
        dict.insert("Reason".to_string(), Object::String(b"Testing".to_vec()));
        dict.insert("Location".to_string(), Object::String(b"Test City".to_vec()));
        dict.insert("M".to_string(), Object::String(b"D:20240101120000Z".to_vec()));
        dict.insert(
            "ByteRange".to_string(),
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(100),
                Object::Integer(200),
                Object::Integer(50),
            ]),
        );
        Object::Dictionary(dict)
    }

    #[test]
    fn test_extract_signature_info() {
        let verifier = SignatureVerifier::new();
        let info = verifier.extract_signature_info(&make_sig_dict()).unwrap();

        assert_eq!(info.signer_name, Some("Test Signer".to_string()));
        assert_eq!(info.reason, Some("Testing".to_string()));
        assert_eq!(info.location, Some("Test City".to_string()));
        assert_eq!(info.sub_filter, Some(SignatureSubFilter::Pkcs7Detached));
        assert_eq!(info.byte_range, vec![0, 100, 200, 50]);
        assert_eq!(info.signing_time.as_deref(), Some("2024-01-01T12:00:00+00:00"));
        assert!(info.covers_whole_document);
    }

    #[test]
    fn test_quick_check_valid() {
        let verifier = SignatureVerifier::new();
        assert!(verifier.quick_check(&make_sig_dict()).unwrap());
    }

    #[test]
    fn test_quick_check_missing_byte_range() {
        let verifier = SignatureVerifier::new();
        let mut dict = HashMap::new();
        dict.insert("Type".to_string(), Object::Name("Sig".to_string()));
        dict.insert("SubFilter".to_string(), Object::Name("adbe.pkcs7.detached".to_string()));

        assert!(!verifier.quick_check(&Object::Dictionary(dict)).unwrap());
    }

    #[test]
    fn test_select_handler_order() {
        let verifier = SignatureVerifier::new();
        let descriptor = SignatureDescriptor {
            filter: Some("Adobe.PPKMS".to_string()),
            sub_filter: Some("ETSI.CAdES.detached".to_string()),
            ..SignatureDescriptor::new()
        };
        let handler = verifier.select_handler(&descriptor).unwrap();
        assert_eq!(handler.kind(), HandlerKind::EcdsaDetached);
    }

    #[test]
    fn test_select_handler_unsupported() {
        let verifier = SignatureVerifier::new();
        let descriptor = SignatureDescriptor {
            filter: Some("Adobe.PPKLite".to_string()),
            sub_filter: Some("ETSI.RFC3161".to_string()),
            ..SignatureDescriptor::new()
        };
        let err = verifier.select_handler(&descriptor).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSignatureFormat { .. }));
    }

    #[test]
    fn test_verify_garbage_contents_is_reported() {
        let verifier = SignatureVerifier::new();
        let data = vec![b'A'; 64];
        let descriptor = SignatureDescriptor {
            filter: Some("Adobe.PPKLite".to_string()),
            sub_filter: Some("adbe.pkcs7.detached".to_string()),
            byte_range: vec![0, 10, 20, 44],
            contents: vec![0xFF; 8],
            ..SignatureDescriptor::new()
        };

        let result = verifier.verify(&descriptor, &data).unwrap();
        assert_eq!(result.status, VerificationStatus::Invalid);
        assert!(result.validation.is_signed);
        assert!(!result.validation.is_verified);
        assert!(result.validation.reason.unwrap().contains("Malformed"));
    }

    #[test]
    fn test_trusted_roots() {
        let mut verifier = SignatureVerifier::new();
        let test_cert = vec![1, 2, 3, 4];

        assert!(!verifier.is_certificate_trusted(&test_cert));

        verifier.add_trusted_root(test_cert.clone());
        assert!(verifier.is_certificate_trusted(&test_cert));
    }
}
