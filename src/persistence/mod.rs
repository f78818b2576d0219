//! Persistence Module
//!
//! Converts documents to and from per-document files.
//!
//! ## Responsibilities
//! - Write one document to one path (the engine picks the path)
//! - Read it back with round-trip fidelity
//! - Detect torn or corrupted files on read
//!
//! ## File Format (V1)
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────────────────┐
//! │Magic (4) │Version(2)│ CRC32(4) │ Len (4)  │ bincode(Document)    │
//! └──────────┴──────────┴──────────┴──────────┴──────────────────────┘
//! ```
//! All integers are little-endian. The CRC covers the payload only.

mod bincode_file;

use std::path::Path;

use crate::document::Document;
use crate::error::Result;

pub use bincode_file::{BincodeSerializer, HEADER_SIZE, MAGIC, VERSION};

/// Capability to store a single document at a path and load it back
///
/// The engine only relies on `deserialize(serialize(d)) == d`; the byte
/// format belongs to the implementation.
pub trait DocumentSerializer: Send + Sync {
    /// Write `document` to `path`, replacing any existing file
    fn serialize(&self, document: &Document, path: &Path) -> Result<()>;

    /// Read the document stored at `path`
    fn deserialize(&self, path: &Path) -> Result<Document>;
}
