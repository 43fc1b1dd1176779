//! CMS (PKCS#7) SignedData containers for detached PDF signatures.
//!
//! Builds `ContentInfo(id-signedData)` with one signer and no
//! encapsulated content, and verifies such containers against the
//! bytes covered by the ByteRange.

use std::time::SystemTime;

use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{
    CertificateSet, EncapsulatedContentInfo, SignedAttributes, SignedData, SignerIdentifier,
    SignerInfo, SignerInfos,
};
use const_oid::ObjectIdentifier;
use der::asn1::{OctetString, SetOfVec, UtcTime};
use der::{Any, Decode, DecodeOwned, Encode, Sequence, SliceReader};
use x509_cert::attr::Attribute;
use x509_cert::Certificate;

use super::keys::{PrivateKey, SignatureAlgorithm};
use super::oids;
use super::types::DigestAlgorithm;
use crate::error::{Error, Result};

/// ESSCertIDv2 with the default SHA-256 hash algorithm (omitted in DER).
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct EssCertIdV2 {
    cert_hash: OctetString,
}

/// SigningCertificateV2 without the optional policies.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct SigningCertificateV2 {
    certs: Vec<EssCertIdV2>,
}

/// Signer configuration for one detached SignedData container.
pub(crate) struct CmsSigner<'a> {
    pub key: PrivateKey,
    pub certificate: &'a Certificate,
    pub chain: &'a [Certificate],
    pub algorithm: SignatureAlgorithm,
    pub signing_time: bool,
    pub signing_certificate_v2: bool,
}

impl CmsSigner<'_> {
    /// Sign `content` and return the DER-encoded ContentInfo.
    pub(crate) fn sign_detached(&self, content: &[u8]) -> Result<Vec<u8>> {
        let digest_algorithm = self.algorithm.digest_algorithm();
        let signed_attrs = self.signed_attributes(&digest_algorithm.digest(content))?;
        let signature = self.algorithm.sign(&self.key, &signed_attrs.to_der()?)?;

        let signer_info = SignerInfo {
            version: CmsVersion::V1,
            sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
                issuer: self.certificate.tbs_certificate.issuer.clone(),
                serial_number: self.certificate.tbs_certificate.serial_number.clone(),
            }),
            digest_alg: digest_algorithm.algorithm_identifier(),
            signed_attrs: Some(signed_attrs),
            signature_algorithm: self.algorithm.identifier()?,
            signature: OctetString::new(signature)?,
            unsigned_attrs: None,
        };

        let certificates = std::iter::once(self.certificate)
            .chain(self.chain.iter())
            .map(|cert| CertificateChoices::Certificate(cert.clone()))
            .collect::<Vec<_>>();

        let signed_data = SignedData {
            version: CmsVersion::V1,
            digest_algorithms: SetOfVec::try_from(vec![digest_algorithm.algorithm_identifier()])?,
            encap_content_info: EncapsulatedContentInfo {
                econtent_type: oids::ID_DATA,
                econtent: None,
            },
            certificates: Some(CertificateSet(SetOfVec::try_from(certificates)?)),
            crls: None,
            signer_infos: SignerInfos(SetOfVec::try_from(vec![signer_info])?),
        };

        let content_info = ContentInfo {
            content_type: oids::ID_SIGNED_DATA,
            content: Any::encode_from(&signed_data)?,
        };
        Ok(content_info.to_der()?)
    }

    fn signed_attributes(&self, message_digest: &[u8]) -> Result<SignedAttributes> {
        let mut attrs = vec![
            attribute(oids::ID_CONTENT_TYPE, Any::encode_from(&oids::ID_DATA)?)?,
            attribute(
                oids::ID_MESSAGE_DIGEST,
                Any::encode_from(&OctetString::new(message_digest)?)?,
            )?,
        ];

        if self.signing_time {
            let now = UtcTime::from_system_time(SystemTime::now())?;
            attrs.push(attribute(oids::ID_SIGNING_TIME, Any::encode_from(&now)?)?);
        }

        if self.signing_certificate_v2 {
            let cert_hash = DigestAlgorithm::Sha256.digest(&self.certificate.to_der()?);
            let value = SigningCertificateV2 {
                certs: vec![EssCertIdV2 {
                    cert_hash: OctetString::new(cert_hash)?,
                }],
            };
            attrs.push(attribute(oids::ID_SIGNING_CERTIFICATE_V2, Any::encode_from(&value)?)?);
        }

        Ok(SetOfVec::try_from(attrs)?)
    }
}

fn attribute(oid: ObjectIdentifier, value: Any) -> Result<Attribute> {
    Ok(Attribute {
        oid,
        values: SetOfVec::try_from(vec![value])?,
    })
}

fn decode_any<T: DecodeOwned>(value: &Any) -> der::Result<T> {
    T::from_der(&value.to_der()?)
}

/// Parse the SignedData inside a (possibly zero-padded) Contents value.
///
/// Only the first ContentInfo TLV is read; trailing bytes are ignored.
pub(crate) fn parse_signed_data(contents: &[u8]) -> Result<SignedData> {
    let malformed = |e: der::Error| Error::MalformedSignature(e.to_string());

    let mut reader = SliceReader::new(contents).map_err(malformed)?;
    let content_info = ContentInfo::decode(&mut reader).map_err(malformed)?;
    if content_info.content_type != oids::ID_SIGNED_DATA {
        return Err(Error::MalformedSignature(format!(
            "content type {} is not signed-data",
            content_info.content_type
        )));
    }
    decode_any::<SignedData>(&content_info.content).map_err(malformed)
}

/// Certificates embedded in a SignedData, in container order.
pub(crate) fn embedded_certificates(signed_data: &SignedData) -> Vec<&Certificate> {
    signed_data
        .certificates
        .iter()
        .flat_map(|set| set.0.iter())
        .filter_map(|choice| match choice {
            CertificateChoices::Certificate(cert) => Some(cert),
            _ => None,
        })
        .collect()
}

fn find_attribute(attrs: &SignedAttributes, oid: ObjectIdentifier) -> Option<&Any> {
    attrs
        .iter()
        .find(|attr| attr.oid == oid)
        .and_then(|attr| attr.values.iter().next())
}

/// Verify a detached container over `content`.
///
/// The signer certificate is, in order: `override_certificate`, the
/// embedded certificate matching the signer identifier, the first
/// embedded certificate, then `fallback_certificate` (DER).
/// Returns the certificate the signature verified against.
pub(crate) fn verify_detached(
    contents: &[u8],
    content: &[u8],
    override_certificate: Option<&Certificate>,
    fallback_certificate: Option<&[u8]>,
) -> Result<Certificate> {
    let signed_data = parse_signed_data(contents)?;
    let signer_info = signed_data
        .signer_infos
        .0
        .iter()
        .next()
        .ok_or_else(|| Error::MalformedSignature("no signer info".to_string()))?;

    let certificate = select_certificate(
        &signed_data,
        signer_info,
        override_certificate,
        fallback_certificate,
    )?;

    let digest_algorithm = DigestAlgorithm::from_oid(&signer_info.digest_alg.oid).ok_or_else(|| {
        Error::VerificationFailed(format!(
            "unsupported digest algorithm {}",
            signer_info.digest_alg.oid
        ))
    })?;

    let signed_message = match &signer_info.signed_attrs {
        Some(attrs) => {
            let expected = find_attribute(attrs, oids::ID_MESSAGE_DIGEST)
                .ok_or_else(|| {
                    Error::MalformedSignature("missing message-digest attribute".to_string())
                })
                .and_then(|value| {
                    decode_any::<OctetString>(value)
                        .map_err(|e| Error::MalformedSignature(e.to_string()))
                })?;
            if expected.as_bytes() != digest_algorithm.digest(content).as_slice() {
                return Err(Error::VerificationFailed("message digest mismatch".to_string()));
            }
            attrs.to_der()?
        },
        None => content.to_vec(),
    };

    let algorithm =
        SignatureAlgorithm::from_identifier(&signer_info.signature_algorithm, digest_algorithm)?;
    algorithm.verify(
        &certificate.tbs_certificate.subject_public_key_info,
        &signed_message,
        signer_info.signature.as_bytes(),
    )?;
    Ok(certificate)
}

fn select_certificate(
    signed_data: &SignedData,
    signer_info: &SignerInfo,
    override_certificate: Option<&Certificate>,
    fallback_certificate: Option<&[u8]>,
) -> Result<Certificate> {
    if let Some(cert) = override_certificate {
        return Ok(cert.clone());
    }

    let embedded = embedded_certificates(signed_data);
    let matching = match &signer_info.sid {
        SignerIdentifier::IssuerAndSerialNumber(id) => embedded.iter().find(|cert| {
            cert.tbs_certificate.issuer == id.issuer
                && cert.tbs_certificate.serial_number == id.serial_number
        }),
        _ => None,
    };
    if let Some(cert) = matching.or_else(|| embedded.first()) {
        return Ok((*cert).clone());
    }

    match fallback_certificate {
        Some(der) => {
            Certificate::from_der(der).map_err(|e| Error::CertificateParse(e.to_string()))
        },
        None => Err(Error::CertificateParse("no signer certificate available".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::keys::SigningCredentials;
    use p256::ecdsa::SigningKey;
    use rand::rngs::OsRng;
    use std::sync::Arc;
    use std::time::Duration;

    fn credentials() -> SigningCredentials {
        let key = PrivateKey::Ecdsa(Arc::new(SigningKey::random(&mut OsRng)));
        SigningCredentials::self_signed(key, "CMS Signer", Duration::from_secs(3600)).unwrap()
    }

    fn sign(creds: &SigningCredentials, content: &[u8]) -> Vec<u8> {
        CmsSigner {
            key: creds.private_key.clone(),
            certificate: &creds.certificate,
            chain: &[],
            algorithm: SignatureAlgorithm::EcdsaP256Sha256,
            signing_time: true,
            signing_certificate_v2: true,
        }
        .sign_detached(content)
        .unwrap()
    }

    #[test]
    fn test_detached_container_structure() {
        let creds = credentials();
        let der = sign(&creds, b"signed bytes");
        let signed_data = parse_signed_data(&der).unwrap();

        assert_eq!(signed_data.encap_content_info.econtent_type, oids::ID_DATA);
        assert!(signed_data.encap_content_info.econtent.is_none());
        assert_eq!(signed_data.signer_infos.0.len(), 1);
        assert_eq!(embedded_certificates(&signed_data).len(), 1);

        let attrs = signed_data.signer_infos.0.iter().next().unwrap().signed_attrs.as_ref().unwrap();
        assert!(find_attribute(attrs, oids::ID_SIGNING_TIME).is_some());
        assert!(find_attribute(attrs, oids::ID_SIGNING_CERTIFICATE_V2).is_some());
    }

    #[test]
    fn test_verify_with_trailing_padding() {
        let creds = credentials();
        let mut der = sign(&creds, b"signed bytes");
        der.resize(der.len() + 512, 0);

        let cert = verify_detached(&der, b"signed bytes", None, None).unwrap();
        assert_eq!(cert, *creds.certificate);
    }

    #[test]
    fn test_verify_detects_changed_content() {
        let creds = credentials();
        let der = sign(&creds, b"signed bytes");
        let err = verify_detached(&der, b"signed bytez", None, None).unwrap_err();
        assert!(matches!(err, Error::VerificationFailed(_)));
    }

    #[test]
    fn test_zero_contents_are_malformed() {
        let err = parse_signed_data(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, Error::MalformedSignature(_)));
    }

    #[test]
    fn test_override_certificate_wins() {
        let creds = credentials();
        let other = credentials();
        let der = sign(&creds, b"data");

        let err = verify_detached(&der, b"data", Some(&other.certificate), None).unwrap_err();
        assert!(matches!(err, Error::VerificationFailed(_)));
    }
}
