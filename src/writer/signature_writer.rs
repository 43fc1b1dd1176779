//! Incremental update writer hosting one signature dictionary.
//!
//! Appends the signature object, a one-entry xref section and a trailer
//! after the original bytes. /ByteRange is reserved at a fixed width and
//! /Contents as a zero-filled hex string, so both can be patched in place.

use std::collections::HashMap;
use std::io::Write;

use super::object_serializer::ObjectSerializer;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::signatures::{
    ByteRangeCalculator, ByteRangeReader, DigestSink, SignatureDescriptor,
    SignatureDocumentWriter, BYTE_RANGE_PLACEHOLDER,
};

/// In-memory writer implementing [`SignatureDocumentWriter`].
#[derive(Debug, Clone)]
pub struct IncrementalSignatureWriter {
    data: Vec<u8>,
    object_id: u32,
    calculator: Option<ByteRangeCalculator>,
    contents_offset: Option<usize>,
}

impl IncrementalSignatureWriter {
    /// Create a writer appending object `object_id` to `base`.
    pub fn new(base: Vec<u8>, object_id: u32) -> Self {
        Self {
            data: base,
            object_id,
            calculator: None,
            contents_offset: None,
        }
    }

    /// Object number of the signature dictionary.
    pub fn object_id(&self) -> u32 {
        self.object_id
    }

    /// Current document bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer and return the document bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Byte span `[start, end)` of the serialized /Contents value.
    pub fn contents_span(&self) -> Option<(usize, usize)> {
        let offset = self.contents_offset?;
        let calculator = self.calculator?;
        Some((offset, offset + calculator.placeholder_size()))
    }

    fn signature_entries(descriptor: &SignatureDescriptor) -> Result<HashMap<String, Object>> {
        let object = descriptor.to_object();
        let mut dict = object.as_dict().cloned().ok_or_else(|| Error::InvalidObjectType {
            expected: "Dictionary".to_string(),
            found: object.type_name().to_string(),
        })?;
        dict.remove("ByteRange");
        dict.remove("Contents");
        Ok(dict)
    }

    fn write_trailer(&self, out: &mut Vec<u8>, xref_offset: usize) -> Result<()> {
        let mut trailer = HashMap::new();
        trailer.insert("Size".to_string(), Object::Integer(i64::from(self.object_id) + 1));
        if let Some(prev) = find_prev_xref_offset(&self.data) {
            trailer.insert("Prev".to_string(), Object::Integer(prev as i64));
        }
        if let Some(root) = find_trailer_entry(&self.data, b"/Root") {
            trailer.insert("Root".to_string(), root);
        }

        writeln!(out, "trailer")?;
        out.extend_from_slice(&ObjectSerializer::compact().serialize(&Object::Dictionary(trailer))?);
        write!(out, "\nstartxref\n{}\n%%EOF\n", xref_offset)?;
        Ok(())
    }
}

impl ByteRangeReader for IncrementalSignatureWriter {
    fn read_byte_range(&self, byte_range: &[i64; 4], sink: &mut DigestSink) -> Result<()> {
        self.data.read_byte_range(byte_range, sink)
    }
}

impl SignatureDocumentWriter for IncrementalSignatureWriter {
    fn write_placeholder(&mut self, descriptor: &SignatureDescriptor) -> Result<[i64; 4]> {
        if self.contents_offset.is_some() {
            return Err(Error::InvalidPdf("signature placeholder already written".to_string()));
        }

        let calculator = ByteRangeCalculator::new(descriptor.contents.len());
        let entries = ObjectSerializer::compact()
            .serialize_dictionary_entries(&Self::signature_entries(descriptor)?)?;

        let base_len = self.data.len();
        let mut out = Vec::new();
        writeln!(out)?;
        let object_offset = base_len + out.len();
        write!(out, "{} 0 obj\n<<", self.object_id)?;
        out.extend_from_slice(&entries);
        write!(out, " /ByteRange ")?;
        let byte_range_offset = base_len + out.len();
        out.extend_from_slice(BYTE_RANGE_PLACEHOLDER.as_bytes());
        write!(out, " /Contents ")?;
        let contents_offset = base_len + out.len();
        out.extend_from_slice(calculator.generate_placeholder().as_bytes());
        write!(out, ">>\nendobj\n")?;

        let xref_offset = base_len + out.len();
        write!(out, "xref\n{} 1\n{:010} 00000 n \n", self.object_id, object_offset)?;
        self.write_trailer(&mut out, xref_offset)?;
        self.data.extend_from_slice(&out);

        let byte_range = calculator.calculate_byte_range(self.data.len(), contents_offset);
        let formatted =
            ByteRangeCalculator::format_byte_range_padded(&byte_range, BYTE_RANGE_PLACEHOLDER.len())?;
        self.data[byte_range_offset..byte_range_offset + formatted.len()]
            .copy_from_slice(formatted.as_bytes());

        self.calculator = Some(calculator);
        self.contents_offset = Some(contents_offset);
        log::debug!(
            "Signature object {} written at {}, /Contents at {}",
            self.object_id,
            object_offset,
            contents_offset
        );
        Ok(byte_range)
    }

    fn patch_contents(&mut self, descriptor: &SignatureDescriptor) -> Result<()> {
        let (Some(calculator), Some(offset)) = (self.calculator, self.contents_offset) else {
            return Err(Error::InvalidPdf("no signature placeholder to patch".to_string()));
        };
        calculator.insert_signature(&mut self.data, offset, &descriptor.contents_hex())
    }
}

/// Offset following the last `startxref` keyword.
fn find_prev_xref_offset(bytes: &[u8]) -> Option<u64> {
    let keyword = b"startxref";
    let pos = bytes.windows(keyword.len()).rposition(|w| w == keyword)?;
    let digits: String = bytes[pos + keyword.len()..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    digits.parse().ok()
}

/// Indirect reference stored under `key` in the last trailer.
fn find_trailer_entry(bytes: &[u8], key: &[u8]) -> Option<Object> {
    let trailer = bytes.windows(7).rposition(|w| w == b"trailer")?;
    let tail = &bytes[trailer..];
    let pos = tail.windows(key.len()).position(|w| w == key)?;
    let after = &tail[pos + key.len()..];
    let end = after
        .iter()
        .position(|&b| b == b'/' || b == b'>')
        .unwrap_or(after.len());
    let rest = String::from_utf8_lossy(&after[..end]);

    let mut tokens = rest.split_ascii_whitespace();
    let id = tokens.next()?.parse().ok()?;
    let gen = tokens.next()?.parse().ok()?;
    (tokens.next()? == "R").then(|| Object::Reference(crate::object::ObjectRef::new(id, gen)))
}
