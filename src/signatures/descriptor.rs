//! Signature field descriptor shared between handlers and document writers.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

use super::digest::DigestSink;
use super::handler::SignatureHandler;
use crate::error::{Error, Result};
use crate::object::Object;

/// Signing progress of a descriptor. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureState {
    /// No placeholder has been reserved yet
    #[default]
    Unsigned,
    /// Zero-filled /Contents of the final length is in place
    PlaceholderInstalled,
    /// /Contents holds a real signature
    Signed,
}

impl fmt::Display for SignatureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignatureState::Unsigned => "Unsigned",
            SignatureState::PlaceholderInstalled => "PlaceholderInstalled",
            SignatureState::Signed => "Signed",
        };
        f.write_str(name)
    }
}

/// One signature dictionary (`/Type /Sig`) of a document.
///
/// `contents` holds raw signature bytes; the writer hex-encodes them, so
/// the serialized field is `2 * contents.len() + 2` bytes including the
/// angle brackets.
#[derive(Debug, Clone, Default)]
pub struct SignatureDescriptor {
    /// /Filter (e.g. `Adobe.PPKLite`)
    pub filter: Option<String>,
    /// /SubFilter (e.g. `ETSI.CAdES.detached`)
    pub sub_filter: Option<String>,
    /// /ByteRange `[start1, len1, start2, len2]`
    pub byte_range: Vec<i64>,
    /// /Contents as raw bytes
    pub contents: Vec<u8>,
    /// /Reference (signature reference dictionaries)
    pub reference: Option<Object>,
    /// /Cert as raw DER
    pub certificate: Option<Vec<u8>>,
    /// /Name
    pub name: Option<String>,
    /// /Reason
    pub reason: Option<String>,
    /// /Location
    pub location: Option<String>,
    /// /ContactInfo
    pub contact_info: Option<String>,
    /// /M
    pub signing_time: Option<DateTime<FixedOffset>>,
    pub(crate) handler: Option<SignatureHandler>,
    pub(crate) state: SignatureState,
}

impl SignatureDescriptor {
    /// Create an empty, unsigned descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the reason for signing.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the signing location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the contact information.
    pub fn with_contact_info(mut self, contact_info: impl Into<String>) -> Self {
        self.contact_info = Some(contact_info.into());
        self
    }

    /// Set the signing time written to /M.
    pub fn with_signing_time<Tz: TimeZone>(mut self, time: DateTime<Tz>) -> Self {
        self.signing_time = Some(time.fixed_offset());
        self
    }

    /// Current signing state.
    pub fn state(&self) -> SignatureState {
        self.state
    }

    /// Handler bound by `init_signature`, if any.
    pub fn handler(&self) -> Option<&SignatureHandler> {
        self.handler.as_ref()
    }

    /// The ByteRange as a fixed array.
    pub fn byte_range_array(&self) -> Result<[i64; 4]> {
        <[i64; 4]>::try_from(self.byte_range.as_slice()).map_err(|_| {
            Error::InvalidByteRange(format!(
                "expected 4 integers, found {}",
                self.byte_range.len()
            ))
        })
    }

    /// Uppercase hex rendering of /Contents, without delimiters.
    pub fn contents_hex(&self) -> String {
        hex::encode_upper(&self.contents)
    }

    /// Sign `digest` with the handler bound to this descriptor.
    pub fn sign_with_bound_handler(&mut self, digest: &DigestSink) -> Result<()> {
        let handler = self.handler.take().ok_or_else(|| {
            Error::InvalidSignatureState {
                expected: SignatureState::PlaceholderInstalled.to_string(),
                found: self.state.to_string(),
            }
        })?;
        let result = handler.sign(self, digest);
        self.handler = Some(handler);
        result
    }

    /// Convert to a `/Type /Sig` dictionary.
    pub fn to_object(&self) -> Object {
        let mut dict = HashMap::new();
        dict.insert("Type".to_string(), Object::Name("Sig".to_string()));

        if let Some(filter) = &self.filter {
            dict.insert("Filter".to_string(), Object::Name(filter.clone()));
        }
        if let Some(sub_filter) = &self.sub_filter {
            dict.insert("SubFilter".to_string(), Object::Name(sub_filter.clone()));
        }
        if !self.byte_range.is_empty() {
            dict.insert(
                "ByteRange".to_string(),
                Object::Array(self.byte_range.iter().map(|&v| Object::Integer(v)).collect()),
            );
        }
        dict.insert("Contents".to_string(), Object::String(self.contents.clone()));

        if let Some(reference) = &self.reference {
            dict.insert("Reference".to_string(), reference.clone());
        }
        if let Some(cert) = &self.certificate {
            dict.insert("Cert".to_string(), Object::String(cert.clone()));
        }

        let text_fields = [
            ("Name", &self.name),
            ("Reason", &self.reason),
            ("Location", &self.location),
            ("ContactInfo", &self.contact_info),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                dict.insert(key.to_string(), Object::String(value.as_bytes().to_vec()));
            }
        }
        if let Some(time) = &self.signing_time {
            dict.insert("M".to_string(), Object::String(format_pdf_date(time).into_bytes()));
        }

        Object::Dictionary(dict)
    }

    /// Read a descriptor from a signature dictionary.
    ///
    /// Non-zero /Contents yields [`SignatureState::Signed`], an all-zero
    /// one [`SignatureState::PlaceholderInstalled`].
    pub fn from_object(obj: &Object) -> Result<Self> {
        let dict = obj.as_dict().ok_or_else(|| Error::InvalidObjectType {
            expected: "Dictionary".to_string(),
            found: obj.type_name().to_string(),
        })?;

        let name = |key: &str| dict.get(key).and_then(Object::as_name).map(str::to_string);
        let text = |key: &str| {
            dict.get(key)
                .and_then(Object::as_string)
                .map(|s| String::from_utf8_lossy(s).to_string())
        };

        let contents = dict
            .get("Contents")
            .and_then(Object::as_string)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let certificate = match dict.get("Cert") {
            Some(Object::String(der)) => Some(der.clone()),
            Some(Object::Array(certs)) => certs.first().and_then(Object::as_string).map(<[u8]>::to_vec),
            _ => None,
        };

        let state = if contents.is_empty() {
            SignatureState::Unsigned
        } else if contents.iter().all(|&b| b == 0) {
            SignatureState::PlaceholderInstalled
        } else {
            SignatureState::Signed
        };

        Ok(Self {
            filter: name("Filter"),
            sub_filter: name("SubFilter"),
            byte_range: dict
                .get("ByteRange")
                .and_then(Object::as_integer_array)
                .unwrap_or_default(),
            contents,
            reference: dict.get("Reference").cloned(),
            certificate,
            name: text("Name"),
            reason: text("Reason"),
            location: text("Location"),
            contact_info: text("ContactInfo"),
            signing_time: text("M").and_then(|m| parse_pdf_date(&m)),
            handler: None,
            state,
        })
    }
}

/// Format a time as a PDF date string (`D:YYYYMMDDHHmmSS+HH'mm'`).
pub fn format_pdf_date(time: &DateTime<FixedOffset>) -> String {
    let offset = time.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.abs() / 60;
    format!(
        "D:{}{}{:02}'{:02}'",
        time.format("%Y%m%d%H%M%S"),
        sign,
        minutes / 60,
        minutes % 60
    )
}

/// Parse a PDF date string. Missing trailing fields default to their minimum.
pub fn parse_pdf_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.strip_prefix("D:").unwrap_or(value);
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return None;
    }

    let mut stamp = String::from("00000101000000");
    stamp.replace_range(..digits.len().min(14), &digits[..digits.len().min(14)]);
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S").ok()?;

    let rest = &value[digits.len()..];
    let offset = match rest.chars().next() {
        Some(sign @ ('+' | '-')) => {
            let fields: Vec<i32> = rest[1..]
                .split('\'')
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            let seconds = fields.first().copied().unwrap_or(0) * 3600
                + fields.get(1).copied().unwrap_or(0) * 60;
            let seconds = if sign == '-' { -seconds } else { seconds };
            FixedOffset::east_opt(seconds)?
        },
        _ => FixedOffset::east_opt(0)?,
    };

    offset.from_local_datetime(&naive).single()
}
