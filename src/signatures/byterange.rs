//! ByteRange calculation for PDF signatures.
//!
//! PDF digital signatures use a ByteRange array to specify which portions
//! of the document are covered by the signature. The signature itself is
//! stored in a placeholder that is excluded from the signed bytes.
//!
//! ## ByteRange Format
//!
//! The ByteRange is an array of four integers:
//! `[offset1, length1, offset2, length2]`
//!
//! Where:
//! - `offset1` = 0 (start of file)
//! - `length1` = byte offset where the signature value begins
//! - `offset2` = byte offset where the signature value ends
//! - `length2` = remaining bytes to end of file
//!
//! The signature value is a hex-encoded string within `<` and `>` delimiters.

use crate::config::DEFAULT_ESTIMATED_SIZE;
use crate::error::{Error, Result};

/// Fixed-width ByteRange reserved before offsets are known.
pub const BYTE_RANGE_PLACEHOLDER: &str = "[0 0000000000 0000000000 0000000000]";

/// Calculator for PDF signature byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRangeCalculator {
    /// Size of the /Contents value: hex digits plus the two angle brackets
    placeholder_size: usize,
}

impl ByteRangeCalculator {
    /// Create a calculator for a signature of `contents_len` raw bytes.
    ///
    /// Each byte becomes two hex digits, plus 2 for `<` and `>`.
    pub fn new(contents_len: usize) -> Self {
        Self {
            placeholder_size: contents_len * 2 + 2,
        }
    }

    /// Create a ByteRange calculator with a specific placeholder size.
    pub fn with_placeholder_size(placeholder_size: usize) -> Self {
        Self { placeholder_size }
    }

    /// Get the placeholder size (for the /Contents value).
    pub fn placeholder_size(&self) -> usize {
        self.placeholder_size
    }

    /// Zero-filled `<00…00>` of exactly the placeholder size.
    pub fn generate_placeholder(&self) -> String {
        format!("<{}>", "0".repeat(self.placeholder_size.saturating_sub(2)))
    }

    /// Calculate the ByteRange given the offset of the `<` opening /Contents.
    pub fn calculate_byte_range(&self, file_size: usize, contents_offset: usize) -> [i64; 4] {
        let before_sig = contents_offset as i64;
        let after_sig_start = (contents_offset + self.placeholder_size) as i64;
        let after_sig_len = file_size as i64 - after_sig_start;

        [0, before_sig, after_sig_start, after_sig_len]
    }

    /// Format a ByteRange array as a PDF array string.
    pub fn format_byte_range(byte_range: &[i64; 4]) -> String {
        format!("[{} {} {} {}]", byte_range[0], byte_range[1], byte_range[2], byte_range[3])
    }

    /// Format a ByteRange right-padded with spaces to exactly `width` bytes.
    pub fn format_byte_range_padded(byte_range: &[i64; 4], width: usize) -> Result<String> {
        let formatted = Self::format_byte_range(byte_range);
        if formatted.len() > width {
            return Err(Error::InvalidByteRange(format!(
                "{} does not fit in {} bytes",
                formatted, width
            )));
        }
        Ok(format!("{:<width$}", formatted, width = width))
    }

    /// Resolve both spans to `(start, end)` indices into `data`.
    pub fn spans(data: &[u8], byte_range: &[i64; 4]) -> Result<[(usize, usize); 2]> {
        let to_usize = |value: i64| {
            usize::try_from(value)
                .map_err(|_| Error::InvalidByteRange(format!("negative value {}", value)))
        };
        let [offset1, length1, offset2, length2] = [
            to_usize(byte_range[0])?,
            to_usize(byte_range[1])?,
            to_usize(byte_range[2])?,
            to_usize(byte_range[3])?,
        ];

        let end1 = offset1
            .checked_add(length1)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::InvalidByteRange(format!(
                    "first range exceeds file size: {} + {} > {}",
                    offset1,
                    length1,
                    data.len()
                ))
            })?;
        let end2 = offset2
            .checked_add(length2)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::InvalidByteRange(format!(
                    "second range exceeds file size: {} + {} > {}",
                    offset2,
                    length2,
                    data.len()
                ))
            })?;

        Ok([(offset1, end1), (offset2, end2)])
    }

    /// Check the ByteRange covers the entire document except the signature.
    ///
    /// A valid ByteRange starts at offset 0, ends at the file size and has
    /// its only gap between the two spans.
    pub fn validate_byte_range(byte_range: &[i64; 4], file_size: usize) -> Result<()> {
        let [offset1, length1, offset2, length2] = *byte_range;

        if byte_range.iter().any(|&v| v < 0) {
            return Err(Error::InvalidByteRange(format!(
                "negative value in {}",
                Self::format_byte_range(byte_range)
            )));
        }

        if offset1 != 0 {
            return Err(Error::InvalidByteRange(format!("must start at 0, got {}", offset1)));
        }

        let expected_end = i64::try_from(file_size).unwrap_or(i64::MAX);
        let actual_end = offset2.checked_add(length2).ok_or_else(|| {
            Error::InvalidByteRange(format!(
                "second range end overflows: {} + {}",
                offset2, length2
            ))
        })?;
        if actual_end != expected_end {
            return Err(Error::InvalidByteRange(format!(
                "must end at file size {}, got {}",
                expected_end, actual_end
            )));
        }

        if length1 > offset2 {
            return Err(Error::InvalidByteRange(format!(
                "first range ({}) overlaps with second range start ({})",
                length1, offset2
            )));
        }

        Ok(())
    }

    /// Decode the hex /Contents value lying in the ByteRange gap.
    pub fn read_contents(pdf_data: &[u8], byte_range: &[i64; 4]) -> Result<Vec<u8>> {
        let [(_, gap_start), (gap_end, _)] = Self::spans(pdf_data, byte_range)?;
        let field = pdf_data
            .get(gap_start..gap_end)
            .filter(|f| f.len() >= 2 && f[0] == b'<' && f[f.len() - 1] == b'>')
            .ok_or_else(|| {
                Error::InvalidByteRange("gap does not hold a hex string".to_string())
            })?;

        hex::decode(&field[1..field.len() - 1])
            .map_err(|e| Error::MalformedSignature(format!("contents hex: {}", e)))
    }

    /// Overwrite the placeholder at `contents_offset` with `signature_hex`,
    /// zero-padded to the placeholder size.
    pub fn insert_signature(
        &self,
        pdf_data: &mut [u8],
        contents_offset: usize,
        signature_hex: &str,
    ) -> Result<()> {
        let sig_len = signature_hex.len() + 2;
        if sig_len > self.placeholder_size {
            return Err(Error::SignatureTooLarge {
                size: sig_len,
                capacity: self.placeholder_size,
            });
        }

        let region = pdf_data
            .get_mut(contents_offset..contents_offset + self.placeholder_size)
            .ok_or_else(|| {
                Error::InvalidByteRange("signature insertion would exceed file bounds".to_string())
            })?;

        let mut sig_value = String::with_capacity(self.placeholder_size);
        sig_value.push('<');
        sig_value.push_str(signature_hex);
        sig_value.push_str(&"0".repeat(self.placeholder_size - sig_len));
        sig_value.push('>');

        region.copy_from_slice(sig_value.as_bytes());
        Ok(())
    }
}

impl Default for ByteRangeCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_ESTIMATED_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::digest::DigestSink;
    use crate::signatures::document::ByteRangeReader;
    use proptest::prelude::*;

    #[test]
    fn test_placeholder_size() {
        let calc = ByteRangeCalculator::new(1024);
        assert_eq!(calc.placeholder_size(), 2050);
    }

    #[test]
    fn test_generate_placeholder() {
        let calc = ByteRangeCalculator::with_placeholder_size(10);
        let placeholder = calc.generate_placeholder();
        assert_eq!(placeholder, "<00000000>");
        assert_eq!(placeholder.len(), 10);
    }

    #[test]
    fn test_calculate_byte_range() {
        let calc = ByteRangeCalculator::with_placeholder_size(100);
        let byte_range = calc.calculate_byte_range(1000, 400);
        assert_eq!(byte_range, [0, 400, 500, 500]);
    }

    #[test]
    fn test_format_byte_range() {
        let byte_range = [0, 100, 200, 300];
        let formatted = ByteRangeCalculator::format_byte_range(&byte_range);
        assert_eq!(formatted, "[0 100 200 300]");
    }

    #[test]
    fn test_format_byte_range_padded() {
        let width = BYTE_RANGE_PLACEHOLDER.len();
        let padded = ByteRangeCalculator::format_byte_range_padded(&[0, 1, 2, 3], width).unwrap();
        assert_eq!(padded.len(), width);
        assert!(padded.starts_with("[0 1 2 3]"));
        assert!(padded[9..].bytes().all(|b| b == b' '));

        let err = ByteRangeCalculator::format_byte_range_padded(&[0, 1, 2, 3], 5).unwrap_err();
        assert!(matches!(err, Error::InvalidByteRange(_)));
    }

    #[test]
    fn test_spans() {
        let spans = ByteRangeCalculator::spans(b"AAABBBCCC", &[0, 3, 6, 3]).unwrap();
        assert_eq!(spans, [(0, 3), (6, 9)]);
    }

    #[test]
    fn test_spans_reject_negative_and_overflow() {
        let err = ByteRangeCalculator::spans(b"AAA", &[0, -1, 2, 1]).unwrap_err();
        assert!(matches!(err, Error::InvalidByteRange(_)));

        let err = ByteRangeCalculator::spans(b"AAA", &[0, 1, i64::MAX, 1]).unwrap_err();
        assert!(matches!(err, Error::InvalidByteRange(_)));
    }

    #[test]
    fn test_validate_byte_range_valid() {
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 100, 150, 50], 200).is_ok());
    }

    #[test]
    fn test_validate_byte_range_invalid_start() {
        assert!(ByteRangeCalculator::validate_byte_range(&[10, 100, 150, 50], 200).is_err());
    }

    #[test]
    fn test_validate_byte_range_invalid_end() {
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 100, 150, 100], 200).is_err());
    }

    #[test]
    fn test_validate_byte_range_overflow() {
        let err = ByteRangeCalculator::validate_byte_range(&[0, 0, i64::MAX, 1], 3).unwrap_err();
        assert!(matches!(err, Error::InvalidByteRange(_)));
    }

    #[test]
    fn test_validate_byte_range_overlap() {
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 160, 150, 50], 200).is_err());
    }

    #[test]
    fn test_read_contents() {
        let data = b"AAA<0A0B00>CCC";
        let contents = ByteRangeCalculator::read_contents(data, &[0, 3, 11, 3]).unwrap();
        assert_eq!(contents, vec![0x0A, 0x0B, 0x00]);

        let err = ByteRangeCalculator::read_contents(data, &[0, 2, 11, 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidByteRange(_)));
    }

    #[test]
    fn test_insert_signature() {
        let calc = ByteRangeCalculator::with_placeholder_size(10);
        let mut pdf_data = b"XX<00000000>YY".to_vec();
        calc.insert_signature(&mut pdf_data, 2, "ABCD").unwrap();
        assert_eq!(&pdf_data, b"XX<ABCD0000>YY");
    }

    #[test]
    fn test_insert_signature_too_large() {
        let calc = ByteRangeCalculator::with_placeholder_size(10);
        let mut pdf_data = b"XX<00000000>YY".to_vec();
        let result = calc.insert_signature(&mut pdf_data, 2, "AABBCCDDEE");
        assert!(matches!(result, Err(Error::SignatureTooLarge { size: 12, capacity: 10 })));
    }

    proptest! {
        #[test]
        fn prop_calculated_range_is_valid(
            before in 0usize..5000,
            after in 0usize..5000,
            contents_len in 1usize..2000,
        ) {
            let calc = ByteRangeCalculator::new(contents_len);
            let file_size = before + calc.placeholder_size() + after;
            let byte_range = calc.calculate_byte_range(file_size, before);

            prop_assert!(ByteRangeCalculator::validate_byte_range(&byte_range, file_size).is_ok());
            prop_assert_eq!(byte_range[2] - byte_range[1], calc.placeholder_size() as i64);
            prop_assert_eq!((byte_range[1] + byte_range[3]) as usize, before + after);
        }

        #[test]
        fn prop_insert_keeps_length_and_spans(
            before in proptest::collection::vec(any::<u8>(), 0..64),
            after in proptest::collection::vec(any::<u8>(), 0..64),
            signature in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            let calc = ByteRangeCalculator::new(32);
            let mut data = before.clone();
            data.extend_from_slice(calc.generate_placeholder().as_bytes());
            data.extend_from_slice(&after);
            let byte_range = calc.calculate_byte_range(data.len(), before.len());
            let mut signed_before = DigestSink::new();
            data.read_byte_range(&byte_range, &mut signed_before).unwrap();

            calc.insert_signature(&mut data, before.len(), &hex::encode_upper(&signature)).unwrap();

            prop_assert_eq!(data.len(), before.len() + calc.placeholder_size() + after.len());
            let mut signed_after = DigestSink::new();
            data.read_byte_range(&byte_range, &mut signed_after).unwrap();
            prop_assert_eq!(signed_before.as_bytes(), signed_after.as_bytes());
            let contents = ByteRangeCalculator::read_contents(&data, &byte_range).unwrap();
            prop_assert_eq!(&contents[..signature.len()], &signature[..]);
            prop_assert!(contents[signature.len()..].iter().all(|&b| b == 0));
        }
    }
}
