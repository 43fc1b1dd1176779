//! Byte accumulator for the signed byte ranges.
//!
//! Hashing is deferred to the handler: the sink only collects the exact
//! bytes the signature covers, so every algorithm family can share it.

use std::io::Write;

/// In-memory sink collecting the bytes of the two ByteRange spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSink {
    buffer: Vec<u8>,
}

impl DigestSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Append bytes to the sink.
    pub fn update(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes accumulated so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes accumulated.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Write for DigestSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_accumulates_in_order() {
        let mut sink = DigestSink::new();
        assert!(sink.is_empty());
        sink.update(b"AAA");
        write!(sink, "CCC").unwrap();
        assert_eq!(sink.as_bytes(), b"AAACCC");
        assert_eq!(sink.len(), 6);
    }
}
