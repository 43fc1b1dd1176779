//! Signing keys, credentials and the signature algorithms they drive.
//!
//! Keys and certificates are held behind `Arc` so handlers cloned into
//! several descriptors share them read-only.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use der::asn1::{BitString, UtcTime};
use der::{Any, Decode, DecodePem, Encode};
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use p256::ecdsa::SigningKey as EcdsaSigningKey;
use pkcs1::DecodeRsaPrivateKey;
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rand::RngCore;
use rsa::{RsaPrivateKey, RsaPublicKey};
use signature::{Signer, Verifier};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::certificate::Version;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate};

use super::handler::SignatureHandler;
use super::oids;
use super::types::{DigestAlgorithm, SignatureSubFilter};
use crate::config::SignatureConfig;
use crate::error::{Error, Result};

/// A private signing key of one of the supported families.
#[derive(Clone)]
pub enum PrivateKey {
    /// RSA key (PKCS#1 v1.5 or PSS)
    Rsa(Arc<RsaPrivateKey>),
    /// ECDSA key on P-256
    Ecdsa(Arc<EcdsaSigningKey>),
    /// Ed25519 key
    Ed25519(Arc<Ed25519SigningKey>),
}

impl PrivateKey {
    /// Decode a PKCS#8 DER private key, detecting the key family.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = pkcs8::PrivateKeyInfo::try_from(der)
            .map_err(|e| Error::Key(format!("invalid PKCS#8 structure: {}", e)))?;
        let oid = info.algorithm.oid;

        if oid == oids::RSA_ENCRYPTION {
            let key = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| Error::Key(e.to_string()))?;
            Ok(PrivateKey::Rsa(Arc::new(key)))
        } else if oid == oids::EC_PUBLIC_KEY {
            let key =
                EcdsaSigningKey::from_pkcs8_der(der).map_err(|e| Error::Key(e.to_string()))?;
            Ok(PrivateKey::Ecdsa(Arc::new(key)))
        } else if oid == oids::ED25519 {
            let key =
                Ed25519SigningKey::from_pkcs8_der(der).map_err(|e| Error::Key(e.to_string()))?;
            Ok(PrivateKey::Ed25519(Arc::new(key)))
        } else {
            Err(Error::Key(format!("unsupported key algorithm {}", oid)))
        }
    }

    /// Decode a PEM private key (`PRIVATE KEY` or `RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (label, document) = pkcs8::SecretDocument::from_pem(pem)
            .map_err(|e| Error::Key(format!("invalid PEM: {}", e)))?;
        match label {
            "PRIVATE KEY" => Self::from_pkcs8_der(document.as_bytes()),
            "RSA PRIVATE KEY" => {
                let key = RsaPrivateKey::from_pkcs1_der(document.as_bytes())
                    .map_err(|e| Error::Key(e.to_string()))?;
                Ok(PrivateKey::Rsa(Arc::new(key)))
            },
            other => Err(Error::Key(format!("unsupported PEM label '{}'", other))),
        }
    }

    /// DER-encoded SubjectPublicKeyInfo of the matching public key.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            PrivateKey::Rsa(key) => key.to_public_key().to_public_key_der(),
            PrivateKey::Ecdsa(key) => key.verifying_key().to_public_key_der(),
            PrivateKey::Ed25519(key) => key.verifying_key().to_public_key_der(),
        }
        .map_err(|e| Error::Key(format!("public key encoding: {}", e)))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Human-readable key family.
    pub fn family(&self) -> &'static str {
        match self {
            PrivateKey::Rsa(_) => "RSA",
            PrivateKey::Ecdsa(_) => "ECDSA P-256",
            PrivateKey::Ed25519(_) => "Ed25519",
        }
    }

    /// Algorithm used when this key signs a certificate.
    fn default_algorithm(&self) -> SignatureAlgorithm {
        match self {
            PrivateKey::Rsa(_) => SignatureAlgorithm::RsaPkcs1v15(DigestAlgorithm::Sha256),
            PrivateKey::Ecdsa(_) => SignatureAlgorithm::EcdsaP256Sha256,
            PrivateKey::Ed25519(_) => SignatureAlgorithm::Ed25519,
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey({}, [REDACTED])", self.family())
    }
}

/// Concrete signature algorithm inside a signer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignatureAlgorithm {
    RsaPkcs1v15(DigestAlgorithm),
    RsaPss(DigestAlgorithm),
    EcdsaP256Sha256,
    Ed25519,
}

impl SignatureAlgorithm {
    /// Digest used for the message-digest attribute and the digestAlgorithm field.
    pub(crate) fn digest_algorithm(&self) -> DigestAlgorithm {
        match self {
            SignatureAlgorithm::RsaPkcs1v15(d) | SignatureAlgorithm::RsaPss(d) => *d,
            SignatureAlgorithm::EcdsaP256Sha256 => DigestAlgorithm::Sha256,
            SignatureAlgorithm::Ed25519 => DigestAlgorithm::Sha512,
        }
    }

    /// The signatureAlgorithm identifier.
    pub(crate) fn identifier(&self) -> Result<AlgorithmIdentifierOwned> {
        match self {
            SignatureAlgorithm::RsaPkcs1v15(d) => Ok(AlgorithmIdentifierOwned {
                oid: d.rsa_signature_oid(),
                parameters: Some(Any::null()),
            }),
            SignatureAlgorithm::RsaPss(d) => d.pss_algorithm_identifier(),
            SignatureAlgorithm::EcdsaP256Sha256 => Ok(AlgorithmIdentifierOwned {
                oid: oids::ECDSA_WITH_SHA256,
                parameters: None,
            }),
            SignatureAlgorithm::Ed25519 => Ok(AlgorithmIdentifierOwned {
                oid: oids::ED25519,
                parameters: None,
            }),
        }
    }

    /// Resolve the algorithm named by a SignerInfo.
    pub(crate) fn from_identifier(
        signature_algorithm: &AlgorithmIdentifierOwned,
        digest: DigestAlgorithm,
    ) -> Result<Self> {
        let oid = signature_algorithm.oid;
        let rsa_digest = [
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ]
        .into_iter()
        .find(|d| d.rsa_signature_oid() == oid);

        if let Some(d) = rsa_digest {
            Ok(SignatureAlgorithm::RsaPkcs1v15(d))
        } else if oid == oids::RSA_ENCRYPTION {
            Ok(SignatureAlgorithm::RsaPkcs1v15(digest))
        } else if oid == oids::RSASSA_PSS {
            Ok(SignatureAlgorithm::RsaPss(digest))
        } else if oid == oids::ECDSA_WITH_SHA256 {
            Ok(SignatureAlgorithm::EcdsaP256Sha256)
        } else if oid == oids::ED25519 {
            Ok(SignatureAlgorithm::Ed25519)
        } else {
            Err(Error::VerificationFailed(format!("unsupported signature algorithm {}", oid)))
        }
    }

    /// Sign `message` with `key`.
    pub(crate) fn sign(&self, key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>> {
        match (self, key) {
            (SignatureAlgorithm::RsaPkcs1v15(d), PrivateKey::Rsa(key)) => key
                .sign(d.pkcs1v15(), &d.digest(message))
                .map_err(|e| Error::Signing(format!("RSA: {}", e))),
            (SignatureAlgorithm::RsaPss(d), PrivateKey::Rsa(key)) => key
                .sign_with_rng(&mut rand::thread_rng(), d.pss(), &d.digest(message))
                .map_err(|e| Error::Signing(format!("RSA-PSS: {}", e))),
            (SignatureAlgorithm::EcdsaP256Sha256, PrivateKey::Ecdsa(key)) => {
                let signature: p256::ecdsa::Signature = key.sign(message);
                Ok(signature.to_der().as_bytes().to_vec())
            },
            (SignatureAlgorithm::Ed25519, PrivateKey::Ed25519(key)) => {
                let signature: ed25519_dalek::Signature = key.sign(message);
                Ok(signature.to_bytes().to_vec())
            },
            (algorithm, key) => Err(Error::CredentialMismatch(format!(
                "{:?} cannot sign with a {} key",
                algorithm,
                key.family()
            ))),
        }
    }

    /// Verify `signature` over `message` with the key in `spki`.
    pub(crate) fn verify(
        &self,
        spki: &SubjectPublicKeyInfoOwned,
        message: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        let spki_der = spki
            .to_der()
            .map_err(|e| Error::CertificateParse(format!("public key: {}", e)))?;
        let key_error = |e: spki::Error| Error::CertificateParse(format!("public key: {}", e));

        match self {
            SignatureAlgorithm::RsaPkcs1v15(d) => {
                let key = RsaPublicKey::from_public_key_der(&spki_der).map_err(key_error)?;
                key.verify(d.pkcs1v15(), &d.digest(message), signature)
                    .map_err(|e| Error::VerificationFailed(format!("RSA: {}", e)))
            },
            SignatureAlgorithm::RsaPss(d) => {
                let key = RsaPublicKey::from_public_key_der(&spki_der).map_err(key_error)?;
                key.verify(d.pss(), &d.digest(message), signature)
                    .map_err(|e| Error::VerificationFailed(format!("RSA-PSS: {}", e)))
            },
            SignatureAlgorithm::EcdsaP256Sha256 => {
                let key =
                    p256::ecdsa::VerifyingKey::from_public_key_der(&spki_der).map_err(key_error)?;
                let signature = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|e| Error::VerificationFailed(format!("ECDSA signature: {}", e)))?;
                key.verify(message, &signature)
                    .map_err(|e| Error::VerificationFailed(format!("ECDSA: {}", e)))
            },
            SignatureAlgorithm::Ed25519 => {
                let key = ed25519_dalek::VerifyingKey::from_public_key_der(&spki_der)
                    .map_err(key_error)?;
                let signature = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|e| Error::VerificationFailed(format!("Ed25519 signature: {}", e)))?;
                key.verify(message, &signature)
                    .map_err(|e| Error::VerificationFailed(format!("Ed25519: {}", e)))
            },
        }
    }
}

/// Signing credentials containing certificate and private key.
#[derive(Clone)]
pub struct SigningCredentials {
    /// Signer certificate
    pub certificate: Arc<Certificate>,
    /// Private key matching the certificate
    pub private_key: PrivateKey,
    /// Certificate chain (intermediate certificates)
    pub chain: Vec<Certificate>,
}

impl SigningCredentials {
    /// Create new signing credentials from raw components.
    pub fn new(certificate: Certificate, private_key: PrivateKey) -> Self {
        Self {
            certificate: Arc::new(certificate),
            private_key,
            chain: Vec::new(),
        }
    }

    /// Create credentials with a certificate chain.
    pub fn with_chain(mut self, chain: Vec<Certificate>) -> Self {
        self.chain = chain;
        self
    }

    /// Load credentials from a DER certificate and a PKCS#8 DER key.
    pub fn from_der(certificate: &[u8], private_key: &[u8]) -> Result<Self> {
        let certificate = Certificate::from_der(certificate)
            .map_err(|e| Error::CertificateParse(e.to_string()))?;
        Ok(Self::new(certificate, PrivateKey::from_pkcs8_der(private_key)?))
    }

    /// Load credentials from separate PEM blocks.
    pub fn from_pem(cert_pem: &str, key_pem: &str) -> Result<Self> {
        let certificate =
            Certificate::from_pem(cert_pem).map_err(|e| Error::CertificateParse(e.to_string()))?;
        Ok(Self::new(certificate, PrivateKey::from_pem(key_pem)?))
    }

    /// Build credentials around a fresh self-signed X.509 v3 certificate.
    pub fn self_signed(private_key: PrivateKey, common_name: &str, validity: Duration) -> Result<Self> {
        let algorithm = private_key.default_algorithm();
        let algorithm_id = algorithm.identifier()?;
        let name = Name::from_str(&format!("CN={}", common_name))
            .map_err(|e| Error::Signing(format!("subject name: {}", e)))?;
        let spki = SubjectPublicKeyInfoOwned::from_der(&private_key.public_key_der()?)?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Signing(format!("system clock: {}", e)))?;
        let validity = Validity {
            not_before: Time::UtcTime(UtcTime::from_unix_duration(now)?),
            not_after: Time::UtcTime(UtcTime::from_unix_duration(now + validity)?),
        };

        let mut serial = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut serial);
        serial[0] = (serial[0] & 0x7F) | 0x40;

        let tbs_certificate = TbsCertificate {
            version: Version::V3,
            serial_number: SerialNumber::new(&serial)?,
            signature: algorithm_id.clone(),
            issuer: name.clone(),
            validity,
            subject: name,
            subject_public_key_info: spki,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: None,
        };
        let signature = algorithm.sign(&private_key, &tbs_certificate.to_der()?)?;

        let certificate = Certificate {
            tbs_certificate,
            signature_algorithm: algorithm_id,
            signature: BitString::from_bytes(&signature)?,
        };
        log::debug!("Created self-signed {} certificate for CN={}", private_key.family(), common_name);
        Ok(Self::new(certificate, private_key))
    }

    /// DER encoding of the signer certificate.
    pub fn certificate_der(&self) -> Result<Vec<u8>> {
        Ok(self.certificate.to_der()?)
    }

    /// Build the handler variant for `sub_filter` that fits this key.
    pub fn handler(&self, sub_filter: SignatureSubFilter) -> Result<SignatureHandler> {
        let certificate = Arc::clone(&self.certificate);
        let handler = match (&self.private_key, sub_filter) {
            (PrivateKey::Rsa(key), SignatureSubFilter::Pkcs7Detached) => {
                SignatureHandler::rsa_detached(Arc::clone(key), certificate)
            },
            (PrivateKey::Rsa(key), SignatureSubFilter::CadesDetached) => {
                SignatureHandler::rsa_pss(Arc::clone(key), certificate)
            },
            (PrivateKey::Rsa(key), SignatureSubFilter::X509RsaSha1) => {
                SignatureHandler::rsa_sha1(Arc::clone(key), certificate)
            },
            (PrivateKey::Ecdsa(key), SignatureSubFilter::CadesDetached) => {
                SignatureHandler::ecdsa_detached(Arc::clone(key), certificate)
            },
            (PrivateKey::Ed25519(key), SignatureSubFilter::CadesDetached) => {
                SignatureHandler::ed25519_detached(Arc::clone(key), certificate)
            },
            (key, sub_filter) => {
                return Err(Error::CredentialMismatch(format!(
                    "no {} handler for sub-filter {}",
                    key.family(),
                    sub_filter.as_pdf_name()
                )))
            },
        };
        Ok(handler.with_chain(self.chain.clone()))
    }

    /// Like [`handler`](Self::handler), with an explicit configuration.
    pub fn handler_with_config(
        &self,
        sub_filter: SignatureSubFilter,
        config: SignatureConfig,
    ) -> Result<SignatureHandler> {
        Ok(self.handler(sub_filter)?.with_config(config))
    }
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("certificate", &self.certificate.tbs_certificate.subject.to_string())
            .field("private_key", &"[REDACTED]")
            .field("chain", &format!("{} certificates", self.chain.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkcs8::EncodePrivateKey;
    use rand::rngs::OsRng;

    fn ecdsa_key() -> PrivateKey {
        PrivateKey::Ecdsa(Arc::new(EcdsaSigningKey::random(&mut OsRng)))
    }

    fn ed25519_key() -> PrivateKey {
        PrivateKey::Ed25519(Arc::new(Ed25519SigningKey::generate(&mut OsRng)))
    }

    #[test]
    fn test_self_signed_certificate_subject() {
        let creds =
            SigningCredentials::self_signed(ecdsa_key(), "Test Signer", Duration::from_secs(3600))
                .unwrap();
        let subject = creds.certificate.tbs_certificate.subject.to_string();
        assert!(subject.contains("Test Signer"));
        assert_eq!(
            creds.certificate.tbs_certificate.subject,
            creds.certificate.tbs_certificate.issuer
        );
    }

    #[test]
    fn test_self_signed_certificate_verifies() {
        let creds =
            SigningCredentials::self_signed(ed25519_key(), "Ed Signer", Duration::from_secs(60))
                .unwrap();
        let tbs = creds.certificate.tbs_certificate.to_der().unwrap();
        SignatureAlgorithm::Ed25519
            .verify(
                &creds.certificate.tbs_certificate.subject_public_key_info,
                &tbs,
                creds.certificate.signature.raw_bytes(),
            )
            .unwrap();
    }

    #[test]
    fn test_credentials_round_trip_through_der() {
        let key = EcdsaSigningKey::random(&mut OsRng);
        let key_der = key.to_pkcs8_der().unwrap();
        let creds = SigningCredentials::self_signed(
            PrivateKey::Ecdsa(Arc::new(key)),
            "DER Signer",
            Duration::from_secs(60),
        )
        .unwrap();
        let cert_der = creds.certificate_der().unwrap();

        let loaded = SigningCredentials::from_der(&cert_der, key_der.as_bytes()).unwrap();
        assert!(matches!(loaded.private_key, PrivateKey::Ecdsa(_)));
        assert_eq!(loaded.certificate_der().unwrap(), cert_der);
    }

    #[test]
    fn test_private_key_rejects_garbage() {
        assert!(matches!(PrivateKey::from_pkcs8_der(&[0x30, 0x00]), Err(Error::Key(_))));
        assert!(matches!(PrivateKey::from_pem("not pem"), Err(Error::Key(_))));
    }

    #[test]
    fn test_handler_mismatch() {
        let creds =
            SigningCredentials::self_signed(ed25519_key(), "Ed Signer", Duration::from_secs(60))
                .unwrap();
        let err = creds.handler(SignatureSubFilter::Pkcs7Detached).unwrap_err();
        assert!(matches!(err, Error::CredentialMismatch(_)));
        assert!(creds.handler(SignatureSubFilter::CadesDetached).is_ok());
    }

    #[test]
    fn test_algorithm_mismatch_is_rejected() {
        let err = SignatureAlgorithm::Ed25519.sign(&ecdsa_key(), b"data").unwrap_err();
        assert!(matches!(err, Error::CredentialMismatch(_)));
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let creds =
            SigningCredentials::self_signed(ecdsa_key(), "Debug Signer", Duration::from_secs(60))
                .unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("Debug Signer"));
        assert!(format!("{:?}", creds.private_key).contains("ECDSA"));
    }
}
