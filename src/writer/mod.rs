//! PDF writing module for signed documents.
//!
//! ## Architecture
//!
//! ```text
//! SignatureDescriptor
//!     ↓
//! [IncrementalSignatureWriter] (appends the signature object, xref and trailer)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```

mod object_serializer;
mod signature_writer;

pub use object_serializer::ObjectSerializer;
pub use signature_writer::IncrementalSignatureWriter;
