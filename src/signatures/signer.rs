//! PDF signing implementation.
//!
//! Drives the two-pass protocol: reserve a placeholder, let the writer
//! lay out the file, digest the final ByteRange, sign, patch /Contents.

use chrono::Utc;

use super::byterange::ByteRangeCalculator;
use super::descriptor::SignatureDescriptor;
use super::document::SignatureDocumentWriter;
use super::handler::SignatureHandler;
use super::keys::SigningCredentials;
use super::types::SignatureSubFilter;
use crate::config::SignatureConfig;
use crate::error::Result;

/// PDF signer that creates digital signatures.
#[derive(Debug, Clone)]
pub struct PdfSigner {
    handler: SignatureHandler,
}

impl PdfSigner {
    /// Create a signer around a handler.
    pub fn new(handler: SignatureHandler) -> Self {
        Self { handler }
    }

    /// Create a signer for `sub_filter` from loaded credentials.
    pub fn from_credentials(
        credentials: &SigningCredentials,
        sub_filter: SignatureSubFilter,
        config: SignatureConfig,
    ) -> Result<Self> {
        Ok(Self::new(credentials.handler_with_config(sub_filter, config)?))
    }

    /// The handler bound into each signed descriptor.
    pub fn handler(&self) -> &SignatureHandler {
        &self.handler
    }

    /// Size of the serialized /Contents value, brackets included.
    pub fn placeholder_size(&self) -> usize {
        ByteRangeCalculator::new(self.handler.config().contents_len()).placeholder_size()
    }

    /// Sign `descriptor` into the document behind `writer`.
    ///
    /// The file length never changes after `write_placeholder`.
    pub fn sign<W>(&self, descriptor: &mut SignatureDescriptor, writer: &mut W) -> Result<()>
    where
        W: SignatureDocumentWriter + ?Sized,
    {
        self.handler.init_signature(descriptor)?;
        if descriptor.signing_time.is_none() {
            descriptor.signing_time = Some(Utc::now().fixed_offset());
        }

        let byte_range = writer.write_placeholder(descriptor)?;
        descriptor.byte_range = byte_range.to_vec();
        log::debug!("Placeholder written, ByteRange {}", ByteRangeCalculator::format_byte_range(&byte_range));

        let mut digest = self.handler.new_digest(descriptor);
        writer.read_byte_range(&byte_range, &mut digest)?;
        descriptor.sign_with_bound_handler(&digest)?;
        writer.patch_contents(descriptor)?;

        log::info!(
            "Signed {} bytes with {} ({})",
            digest.len(),
            self.handler.kind().name(),
            self.handler.sub_filter().as_pdf_name()
        );
        Ok(())
    }
}
