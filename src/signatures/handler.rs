//! Signature handlers: one variant per algorithm family.
//!
//! A handler sizes the /Contents placeholder, signs the bytes covered by
//! the ByteRange and validates existing signatures. Every descriptor owns
//! its own handler instance; keys and certificates inside are shared
//! read-only through `Arc`.

use std::fmt;
use std::sync::Arc;

use der::asn1::OctetString;
use der::{Decode, Encode, SliceReader};
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use p256::ecdsa::SigningKey as EcdsaSigningKey;
use rsa::RsaPrivateKey;
use x509_cert::Certificate;

use super::cms::CmsSigner;
use super::descriptor::{SignatureDescriptor, SignatureState};
use super::digest::DigestSink;
use super::keys::{PrivateKey, SignatureAlgorithm};
use super::types::{DigestAlgorithm, SignatureFilter, SignatureSubFilter, ValidationResult};
use crate::config::SignatureConfig;
use crate::error::{Error, Result};

/// Bytes signed during the sizing pass of `init_signature`.
pub const SIZING_SENTINEL: &[u8] = b"calculate the Contents field size";

/// Algorithm family of a [`SignatureHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// RSA PKCS#1 v1.5 in a detached PKCS#7 container
    RsaDetached,
    /// RSASSA-PSS in a CAdES container
    RsaPss,
    /// Raw RSA SHA-1 signature, certificate in /Cert
    RsaSha1,
    /// ECDSA P-256 in a CAdES container
    EcdsaDetached,
    /// Ed25519 in a CAdES container
    Ed25519Detached,
}

impl HandlerKind {
    /// All handler kinds.
    pub const ALL: [HandlerKind; 5] = [
        HandlerKind::RsaDetached,
        HandlerKind::RsaPss,
        HandlerKind::RsaSha1,
        HandlerKind::EcdsaDetached,
        HandlerKind::Ed25519Detached,
    ];

    /// Sub-filter this kind declares.
    pub fn sub_filter(&self) -> SignatureSubFilter {
        match self {
            HandlerKind::RsaDetached => SignatureSubFilter::Pkcs7Detached,
            HandlerKind::RsaSha1 => SignatureSubFilter::X509RsaSha1,
            HandlerKind::RsaPss | HandlerKind::EcdsaDetached | HandlerKind::Ed25519Detached => {
                SignatureSubFilter::CadesDetached
            },
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            HandlerKind::RsaDetached => "RSA detached",
            HandlerKind::RsaPss => "RSA-PSS",
            HandlerKind::RsaSha1 => "RSA SHA-1",
            HandlerKind::EcdsaDetached => "ECDSA detached",
            HandlerKind::Ed25519Detached => "Ed25519 detached",
        }
    }
}

/// Inputs carried by every handler variant.
///
/// Not exported: built by the [`SignatureHandler`] constructors and read
/// through its accessors.
pub struct HandlerInputs<K> {
    key: Option<Arc<K>>,
    certificate: Option<Arc<Certificate>>,
    chain: Arc<Vec<Certificate>>,
    empty_signature_len: Option<usize>,
    config: SignatureConfig,
}

impl<K> Clone for HandlerInputs<K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            certificate: self.certificate.clone(),
            chain: Arc::clone(&self.chain),
            empty_signature_len: self.empty_signature_len,
            config: self.config,
        }
    }
}

impl<K> HandlerInputs<K> {
    fn new(key: Option<Arc<K>>, certificate: Option<Arc<Certificate>>) -> Self {
        Self {
            key,
            certificate,
            chain: Arc::new(Vec::new()),
            empty_signature_len: None,
            config: SignatureConfig::default(),
        }
    }

    fn signing_key(&self) -> Result<Arc<K>> {
        self.key
            .clone()
            .ok_or_else(|| Error::MissingCredential("private key".to_string()))
    }

    fn signing_certificate(&self) -> Result<&Certificate> {
        self.certificate
            .as_deref()
            .ok_or_else(|| Error::MissingCredential("certificate".to_string()))
    }

    fn sign_cms(
        &self,
        key: PrivateKey,
        algorithm: SignatureAlgorithm,
        cades: bool,
        content: &[u8],
    ) -> Result<Vec<u8>> {
        CmsSigner {
            key,
            certificate: self.signing_certificate()?,
            chain: &self.chain,
            algorithm,
            signing_time: self.config.include_signing_time,
            signing_certificate_v2: cades && self.config.signing_certificate_v2,
        }
        .sign_detached(content)
    }
}

/// A signature handler. The variant set is closed.
#[derive(Clone)]
pub enum SignatureHandler {
    /// `adbe.pkcs7.detached` with an RSA key
    RsaDetached(HandlerInputs<RsaPrivateKey>),
    /// `ETSI.CAdES.detached` with RSASSA-PSS
    RsaPss(HandlerInputs<RsaPrivateKey>),
    /// `adbe.x509.rsa_sha1`
    RsaSha1(HandlerInputs<RsaPrivateKey>),
    /// `ETSI.CAdES.detached` with ECDSA P-256
    EcdsaDetached(HandlerInputs<EcdsaSigningKey>),
    /// `ETSI.CAdES.detached` with Ed25519
    Ed25519Detached(HandlerInputs<Ed25519SigningKey>),
}

/// Run `$body` with `$inputs` bound to the variant's key-independent inputs.
macro_rules! with_inputs {
    ($handler:expr, $inputs:ident => $body:expr) => {
        match $handler {
            SignatureHandler::RsaDetached($inputs) => $body,
            SignatureHandler::RsaPss($inputs) => $body,
            SignatureHandler::RsaSha1($inputs) => $body,
            SignatureHandler::EcdsaDetached($inputs) => $body,
            SignatureHandler::Ed25519Detached($inputs) => $body,
        }
    };
}

impl SignatureHandler {
    /// RSA PKCS#1 v1.5 signer for `adbe.pkcs7.detached`.
    pub fn rsa_detached(
        key: impl Into<Arc<RsaPrivateKey>>,
        certificate: impl Into<Arc<Certificate>>,
    ) -> Self {
        SignatureHandler::RsaDetached(HandlerInputs::new(
            Some(key.into()),
            Some(certificate.into()),
        ))
    }

    /// RSASSA-PSS signer for `ETSI.CAdES.detached`.
    pub fn rsa_pss(
        key: impl Into<Arc<RsaPrivateKey>>,
        certificate: impl Into<Arc<Certificate>>,
    ) -> Self {
        SignatureHandler::RsaPss(HandlerInputs::new(Some(key.into()), Some(certificate.into())))
    }

    /// Raw RSA SHA-1 signer for `adbe.x509.rsa_sha1`.
    pub fn rsa_sha1(
        key: impl Into<Arc<RsaPrivateKey>>,
        certificate: impl Into<Arc<Certificate>>,
    ) -> Self {
        SignatureHandler::RsaSha1(HandlerInputs::new(Some(key.into()), Some(certificate.into())))
    }

    /// ECDSA P-256 signer for `ETSI.CAdES.detached`.
    pub fn ecdsa_detached(
        key: impl Into<Arc<EcdsaSigningKey>>,
        certificate: impl Into<Arc<Certificate>>,
    ) -> Self {
        SignatureHandler::EcdsaDetached(HandlerInputs::new(
            Some(key.into()),
            Some(certificate.into()),
        ))
    }

    /// Ed25519 signer for `ETSI.CAdES.detached`.
    pub fn ed25519_detached(
        key: impl Into<Arc<Ed25519SigningKey>>,
        certificate: impl Into<Arc<Certificate>>,
    ) -> Self {
        SignatureHandler::Ed25519Detached(HandlerInputs::new(
            Some(key.into()),
            Some(certificate.into()),
        ))
    }

    /// Handler without credentials, for validation.
    pub fn validator(kind: HandlerKind) -> Self {
        Self::without_credentials(kind, None)
    }

    /// Placeholder-mode handler producing `len` zero bytes on `sign`.
    ///
    /// A `len` of zero uses the configured estimated size.
    pub fn empty(kind: HandlerKind, len: usize) -> Self {
        Self::without_credentials(kind, Some(len))
    }

    fn without_credentials(kind: HandlerKind, empty_signature_len: Option<usize>) -> Self {
        match kind {
            HandlerKind::RsaDetached => SignatureHandler::RsaDetached(HandlerInputs::new(None, None)),
            HandlerKind::RsaPss => SignatureHandler::RsaPss(HandlerInputs::new(None, None)),
            HandlerKind::RsaSha1 => SignatureHandler::RsaSha1(HandlerInputs::new(None, None)),
            HandlerKind::EcdsaDetached => {
                SignatureHandler::EcdsaDetached(HandlerInputs::new(None, None))
            },
            HandlerKind::Ed25519Detached => {
                SignatureHandler::Ed25519Detached(HandlerInputs::new(None, None))
            },
        }
        .with_empty_signature_len(empty_signature_len)
    }

    fn with_empty_signature_len(mut self, len: Option<usize>) -> Self {
        with_inputs!(&mut self, inputs => inputs.empty_signature_len = len);
        self
    }

    /// Set the signing certificate, or the certificate override for validation.
    pub fn with_certificate(mut self, certificate: impl Into<Arc<Certificate>>) -> Self {
        let certificate = certificate.into();
        with_inputs!(&mut self, inputs => inputs.certificate = Some(certificate));
        self
    }

    /// Add intermediate certificates to embed next to the signer certificate.
    pub fn with_chain(mut self, chain: Vec<Certificate>) -> Self {
        let chain = Arc::new(chain);
        with_inputs!(&mut self, inputs => inputs.chain = chain);
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        with_inputs!(&mut self, inputs => inputs.config = config);
        self
    }

    /// Algorithm family.
    pub fn kind(&self) -> HandlerKind {
        match self {
            SignatureHandler::RsaDetached(_) => HandlerKind::RsaDetached,
            SignatureHandler::RsaPss(_) => HandlerKind::RsaPss,
            SignatureHandler::RsaSha1(_) => HandlerKind::RsaSha1,
            SignatureHandler::EcdsaDetached(_) => HandlerKind::EcdsaDetached,
            SignatureHandler::Ed25519Detached(_) => HandlerKind::Ed25519Detached,
        }
    }

    /// Declared sub-filter.
    pub fn sub_filter(&self) -> SignatureSubFilter {
        self.kind().sub_filter()
    }

    /// Active configuration.
    pub fn config(&self) -> &SignatureConfig {
        with_inputs!(self, inputs => &inputs.config)
    }

    /// Signing certificate or validation override.
    pub fn certificate(&self) -> Option<&Certificate> {
        with_inputs!(self, inputs => inputs.certificate.as_deref())
    }

    /// Whether this handler only produces zero-filled placeholders.
    pub fn is_placeholder(&self) -> bool {
        with_inputs!(self, inputs => inputs.empty_signature_len.is_some())
    }

    fn has_key(&self) -> bool {
        with_inputs!(self, inputs => inputs.key.is_some())
    }

    /// Whether this handler understands the descriptor's Filter/SubFilter pair.
    pub fn is_applicable(&self, descriptor: &SignatureDescriptor) -> bool {
        let (Some(filter), Some(sub_filter)) =
            (descriptor.filter.as_deref(), descriptor.sub_filter.as_deref())
        else {
            return false;
        };
        SignatureFilter::from_pdf_name(filter).is_some()
            && sub_filter == self.sub_filter().as_pdf_name()
    }

    /// Reserve the /Contents placeholder and bind a copy of this handler.
    ///
    /// Signs [`SIZING_SENTINEL`] once to prove the credentials work and the
    /// result fits, then installs zero-filled contents of the final length.
    /// The descriptor is left untouched on error.
    pub fn init_signature(&self, descriptor: &mut SignatureDescriptor) -> Result<()> {
        if descriptor.state != SignatureState::Unsigned {
            return Err(Error::InvalidSignatureState {
                expected: SignatureState::Unsigned.to_string(),
                found: descriptor.state.to_string(),
            });
        }
        if !self.is_placeholder() {
            if !self.has_key() {
                return Err(Error::MissingCredential("private key".to_string()));
            }
            if self.certificate().is_none() {
                return Err(Error::MissingCredential("certificate".to_string()));
            }
        }

        let mut digest = self.new_digest(descriptor);
        digest.update(SIZING_SENTINEL);
        let contents_len = self.padded_contents(&digest, self.config().contents_len())?.len();

        let embedded_certificate = match (self, self.certificate()) {
            (SignatureHandler::RsaSha1(_), Some(cert)) => Some(cert.to_der()?),
            _ => None,
        };

        descriptor.filter = Some(SignatureFilter::PpkLite.as_pdf_name().to_string());
        descriptor.sub_filter = Some(self.sub_filter().as_pdf_name().to_string());
        descriptor.reference = None;
        if embedded_certificate.is_some() {
            descriptor.certificate = embedded_certificate;
        }
        descriptor.contents = vec![0; contents_len];
        descriptor.handler = Some(self.clone());
        descriptor.state = SignatureState::PlaceholderInstalled;

        log::debug!(
            "{} placeholder installed: {} contents bytes",
            self.kind().name(),
            contents_len
        );
        Ok(())
    }

    /// A fresh, empty digest sink.
    pub fn new_digest(&self, _descriptor: &SignatureDescriptor) -> DigestSink {
        DigestSink::with_capacity(SIZING_SENTINEL.len())
    }

    /// Compute /Contents from the accumulated byte-range bytes.
    ///
    /// In placeholder mode the contents become zero bytes, no cryptography
    /// runs and the descriptor stays a placeholder. Otherwise the signature
    /// is left-aligned in a zero-padded buffer. An installed placeholder
    /// keeps its length in both modes; a signed descriptor is rejected.
    pub fn sign(&self, descriptor: &mut SignatureDescriptor, digest: &DigestSink) -> Result<()> {
        if descriptor.state == SignatureState::Signed {
            return Err(Error::InvalidSignatureState {
                expected: SignatureState::PlaceholderInstalled.to_string(),
                found: descriptor.state.to_string(),
            });
        }

        let installed = descriptor.state == SignatureState::PlaceholderInstalled;
        if self.is_placeholder() {
            if !installed {
                descriptor.contents = self.padded_contents(digest, 0)?;
            }
            descriptor.contents.fill(0);
            descriptor.state = SignatureState::PlaceholderInstalled;
            return Ok(());
        }

        let capacity = if installed {
            descriptor.contents.len()
        } else {
            self.config().contents_len()
        };
        let contents = self.padded_contents(digest, capacity)?;

        descriptor.contents = contents;
        descriptor.state = SignatureState::Signed;
        log::debug!("{} signature written over {} bytes", self.kind().name(), digest.len());
        Ok(())
    }

    fn padded_contents(&self, digest: &DigestSink, capacity: usize) -> Result<Vec<u8>> {
        if let Some(len) = with_inputs!(self, inputs => inputs.empty_signature_len) {
            let len = if len > 0 { len } else { self.config().estimated_size };
            return Ok(vec![0; len]);
        }

        let mut signature = self.encode_signature(digest.as_bytes())?;
        if signature.len() > capacity {
            return Err(Error::SignatureTooLarge {
                size: signature.len(),
                capacity,
            });
        }
        signature.resize(capacity, 0);
        Ok(signature)
    }

    fn encode_signature(&self, content: &[u8]) -> Result<Vec<u8>> {
        match self {
            SignatureHandler::RsaDetached(inputs) => inputs.sign_cms(
                PrivateKey::Rsa(inputs.signing_key()?),
                SignatureAlgorithm::RsaPkcs1v15(inputs.config.digest_algorithm),
                false,
                content,
            ),
            SignatureHandler::RsaPss(inputs) => inputs.sign_cms(
                PrivateKey::Rsa(inputs.signing_key()?),
                SignatureAlgorithm::RsaPss(inputs.config.digest_algorithm),
                true,
                content,
            ),
            SignatureHandler::EcdsaDetached(inputs) => inputs.sign_cms(
                PrivateKey::Ecdsa(inputs.signing_key()?),
                SignatureAlgorithm::EcdsaP256Sha256,
                true,
                content,
            ),
            SignatureHandler::Ed25519Detached(inputs) => inputs.sign_cms(
                PrivateKey::Ed25519(inputs.signing_key()?),
                SignatureAlgorithm::Ed25519,
                true,
                content,
            ),
            SignatureHandler::RsaSha1(inputs) => {
                let key = PrivateKey::Rsa(inputs.signing_key()?);
                let signature =
                    SignatureAlgorithm::RsaPkcs1v15(DigestAlgorithm::Sha1).sign(&key, content)?;
                Ok(OctetString::new(signature)?.to_der()?)
            },
        }
    }

    /// Verify /Contents against the accumulated byte-range bytes.
    ///
    /// A descriptor without contents is reported as unsigned. Structural
    /// and cryptographic failures are returned as errors.
    pub fn validate(
        &self,
        descriptor: &SignatureDescriptor,
        digest: &DigestSink,
    ) -> Result<ValidationResult> {
        if descriptor.contents.is_empty() {
            return Ok(ValidationResult {
                reason: Some("signature has no contents".to_string()),
                ..ValidationResult::default()
            });
        }

        let certificate = match self {
            SignatureHandler::RsaSha1(inputs) => {
                let signature = decode_raw_signature(&descriptor.contents)?;
                let certificate = match (&inputs.certificate, &descriptor.certificate) {
                    (Some(cert), _) => Certificate::clone(cert),
                    (None, Some(der)) => Certificate::from_der(der)
                        .map_err(|e| Error::CertificateParse(e.to_string()))?,
                    (None, None) => {
                        return Err(Error::CertificateParse("descriptor has no /Cert".to_string()))
                    },
                };
                SignatureAlgorithm::RsaPkcs1v15(DigestAlgorithm::Sha1).verify(
                    &certificate.tbs_certificate.subject_public_key_info,
                    digest.as_bytes(),
                    signature.as_bytes(),
                )?;
                certificate
            },
            _ => with_inputs!(self, inputs => super::cms::verify_detached(
                &descriptor.contents,
                digest.as_bytes(),
                inputs.certificate.as_deref(),
                descriptor.certificate.as_deref(),
            ))?,
        };

        log::debug!("{} signature verified", self.kind().name());
        Ok(ValidationResult::verified(certificate.to_der()?))
    }
}

fn decode_raw_signature(contents: &[u8]) -> Result<OctetString> {
    let malformed = |e: der::Error| Error::MalformedSignature(e.to_string());
    let mut reader = SliceReader::new(contents).map_err(malformed)?;
    OctetString::decode(&mut reader).map_err(malformed)
}

impl fmt::Debug for SignatureHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = self
            .certificate()
            .map(|cert| cert.tbs_certificate.subject.to_string());
        f.debug_struct("SignatureHandler")
            .field("kind", &self.kind())
            .field("key", &if self.has_key() { "[REDACTED]" } else { "none" })
            .field("certificate", &subject)
            .field("empty_signature_len", &with_inputs!(self, inputs => inputs.empty_signature_len))
            .field("config", self.config())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::keys::SigningCredentials;
    use rand::rngs::OsRng;
    use std::time::Duration;

    fn ecdsa_handler() -> SignatureHandler {
        let key = PrivateKey::Ecdsa(Arc::new(EcdsaSigningKey::random(&mut OsRng)));
        SigningCredentials::self_signed(key, "Handler Test", Duration::from_secs(3600))
            .unwrap()
            .handler(SignatureSubFilter::CadesDetached)
            .unwrap()
    }

    fn descriptor(filter: Option<&str>, sub_filter: Option<&str>) -> SignatureDescriptor {
        SignatureDescriptor {
            filter: filter.map(str::to_string),
            sub_filter: sub_filter.map(str::to_string),
            ..SignatureDescriptor::new()
        }
    }

    #[test]
    fn test_kind_sub_filters() {
        assert_eq!(HandlerKind::RsaDetached.sub_filter().as_pdf_name(), "adbe.pkcs7.detached");
        assert_eq!(HandlerKind::RsaSha1.sub_filter().as_pdf_name(), "adbe.x509.rsa_sha1");
        assert_eq!(HandlerKind::EcdsaDetached.sub_filter().as_pdf_name(), "ETSI.CAdES.detached");
        for kind in HandlerKind::ALL {
            assert_eq!(SignatureHandler::validator(kind).kind(), kind);
        }
    }

    #[test]
    fn test_is_applicable_missing_fields() {
        let handler = SignatureHandler::validator(HandlerKind::EcdsaDetached);
        assert!(!handler.is_applicable(&descriptor(None, None)));
        assert!(!handler.is_applicable(&descriptor(Some("Adobe.PPKLite"), None)));
        assert!(!handler.is_applicable(&descriptor(None, Some("ETSI.CAdES.detached"))));
        assert!(handler.is_applicable(&descriptor(Some("Adobe.PPKMS"), Some("ETSI.CAdES.detached"))));
        assert!(!handler.is_applicable(&descriptor(Some("Adobe.PPKLite"), Some("adbe.pkcs7.detached"))));
    }

    #[test]
    fn test_init_signature_requires_credentials() {
        let handler = SignatureHandler::validator(HandlerKind::RsaDetached);
        let mut desc = SignatureDescriptor::new();
        let err = handler.init_signature(&mut desc).unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
        assert_eq!(desc.state(), SignatureState::Unsigned);
        assert!(desc.filter.is_none());
        assert!(desc.contents.is_empty());
    }

    #[test]
    fn test_init_signature_installs_placeholder() {
        let handler = ecdsa_handler();
        let mut desc = SignatureDescriptor {
            reference: Some(crate::object::Object::Null),
            ..SignatureDescriptor::new()
        };
        handler.init_signature(&mut desc).unwrap();

        assert_eq!(desc.state(), SignatureState::PlaceholderInstalled);
        assert_eq!(desc.filter.as_deref(), Some("Adobe.PPKLite"));
        assert_eq!(desc.sub_filter.as_deref(), Some("ETSI.CAdES.detached"));
        assert!(desc.reference.is_none());
        assert_eq!(desc.contents.len(), SignatureConfig::default().contents_len());
        assert!(desc.contents.iter().all(|&b| b == 0));
        assert_eq!(desc.handler().map(SignatureHandler::kind), Some(HandlerKind::EcdsaDetached));
    }

    #[test]
    fn test_init_signature_twice_fails() {
        let handler = ecdsa_handler();
        let mut desc = SignatureDescriptor::new();
        handler.init_signature(&mut desc).unwrap();
        let err = handler.init_signature(&mut desc).unwrap_err();
        assert!(matches!(err, Error::InvalidSignatureState { .. }));
    }

    #[test]
    fn test_sign_keeps_length_and_resign_fails() {
        let handler = ecdsa_handler();
        let mut desc = SignatureDescriptor::new();
        handler.init_signature(&mut desc).unwrap();
        let placeholder_len = desc.contents.len();

        let mut digest = handler.new_digest(&desc);
        digest.update(b"byte range bytes");
        desc.sign_with_bound_handler(&digest).unwrap();

        assert_eq!(desc.contents.len(), placeholder_len);
        assert_eq!(desc.state(), SignatureState::Signed);
        assert_eq!(desc.contents[0], 0x30);

        let err = desc.sign_with_bound_handler(&digest).unwrap_err();
        assert!(matches!(err, Error::InvalidSignatureState { .. }));
    }

    #[test]
    fn test_signature_too_large() {
        let handler = ecdsa_handler().with_config(SignatureConfig::new().with_estimated_size(16));
        let mut desc = SignatureDescriptor::new();
        let err = handler.init_signature(&mut desc).unwrap_err();
        assert!(matches!(err, Error::SignatureTooLarge { capacity: 34, .. }));
        assert_eq!(desc.state(), SignatureState::Unsigned);
    }

    #[test]
    fn test_placeholder_mode() {
        let handler = SignatureHandler::empty(HandlerKind::EcdsaDetached, 100);
        let mut desc = SignatureDescriptor::new();
        handler.init_signature(&mut desc).unwrap();
        assert_eq!(desc.contents, vec![0u8; 100]);

        handler.sign(&mut desc, &DigestSink::new()).unwrap();
        assert_eq!(desc.contents, vec![0u8; 100]);
        assert_eq!(desc.state(), SignatureState::PlaceholderInstalled);

        let default_len = SignatureHandler::empty(HandlerKind::RsaDetached, 0);
        let mut desc = SignatureDescriptor::new();
        default_len.sign(&mut desc, &DigestSink::new()).unwrap();
        assert_eq!(desc.contents.len(), 8192);
    }

    #[test]
    fn test_placeholder_mode_keeps_installed_length() {
        let installer = SignatureHandler::empty(HandlerKind::EcdsaDetached, 40);
        let mut desc = SignatureDescriptor::new();
        installer.init_signature(&mut desc).unwrap();

        let other = SignatureHandler::empty(HandlerKind::EcdsaDetached, 100);
        other.sign(&mut desc, &DigestSink::new()).unwrap();
        assert_eq!(desc.contents, vec![0u8; 40]);
    }

    #[test]
    fn test_placeholder_mode_rejects_signed() {
        let signer = ecdsa_handler();
        let mut desc = SignatureDescriptor::new();
        signer.init_signature(&mut desc).unwrap();
        let mut digest = signer.new_digest(&desc);
        digest.update(b"byte range bytes");
        signer.sign(&mut desc, &digest).unwrap();
        let signed = desc.contents.clone();

        let placeholder = SignatureHandler::empty(HandlerKind::EcdsaDetached, 0);
        let err = placeholder.sign(&mut desc, &DigestSink::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidSignatureState { .. }));
        assert_eq!(desc.contents, signed);
        assert_eq!(desc.state(), SignatureState::Signed);
    }

    #[test]
    fn test_validate_placeholder_is_malformed() {
        let handler = SignatureHandler::empty(HandlerKind::EcdsaDetached, 64);
        let mut desc = SignatureDescriptor::new();
        handler.init_signature(&mut desc).unwrap();
        let err = handler.validate(&desc, &DigestSink::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedSignature(_)));
    }

    #[test]
    fn test_validate_empty_contents_is_unsigned() {
        let handler = SignatureHandler::validator(HandlerKind::RsaDetached);
        let result = handler.validate(&SignatureDescriptor::new(), &DigestSink::new()).unwrap();
        assert!(!result.is_signed);
        assert!(!result.is_verified);
    }

    #[test]
    fn test_inputs_reached_through_accessors() {
        let handler = SignatureHandler::validator(HandlerKind::EcdsaDetached);
        assert!(handler.certificate().is_none());
        assert!(!handler.is_placeholder());
        assert_eq!(*handler.config(), SignatureConfig::default());

        let config = SignatureConfig::new().with_estimated_size(4096);
        let handler = ecdsa_handler().with_config(config);
        assert!(handler.certificate().is_some());
        assert_eq!(handler.config().contents_len(), config.contents_len());
        assert!(SignatureHandler::empty(HandlerKind::RsaPss, 0).is_placeholder());
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", ecdsa_handler());
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("EcdsaDetached"));
    }
}
