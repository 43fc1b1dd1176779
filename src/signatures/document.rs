//! Contracts between the signature handlers and the document byte layer.

use super::byterange::ByteRangeCalculator;
use super::descriptor::SignatureDescriptor;
use super::digest::DigestSink;
use crate::error::Result;

/// Supplies the bytes of the two ByteRange spans.
pub trait ByteRangeReader {
    /// Write exactly the bytes of both spans, in order, into `sink`.
    fn read_byte_range(&self, byte_range: &[i64; 4], sink: &mut DigestSink) -> Result<()>;
}

impl ByteRangeReader for [u8] {
    fn read_byte_range(&self, byte_range: &[i64; 4], sink: &mut DigestSink) -> Result<()> {
        for (start, end) in ByteRangeCalculator::spans(self, byte_range)? {
            sink.update(&self[start..end]);
        }
        Ok(())
    }
}

impl ByteRangeReader for Vec<u8> {
    fn read_byte_range(&self, byte_range: &[i64; 4], sink: &mut DigestSink) -> Result<()> {
        self.as_slice().read_byte_range(byte_range, sink)
    }
}

/// A document serializer that can host a signature placeholder.
///
/// The writer lays the file out once around a zero-filled /Contents and
/// later rewrites only that field, never shifting any other byte.
pub trait SignatureDocumentWriter: ByteRangeReader {
    /// Serialize the document with the descriptor's placeholder and return
    /// the ByteRange excluding the hex-encoded /Contents span.
    fn write_placeholder(&mut self, descriptor: &SignatureDescriptor) -> Result<[i64; 4]>;

    /// Rewrite /Contents in place with the descriptor's final value.
    fn patch_contents(&mut self, descriptor: &SignatureDescriptor) -> Result<()>;
}
