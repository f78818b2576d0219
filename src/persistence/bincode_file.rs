//! Bincode document files
//!
//! Default [`DocumentSerializer`]: a small checksummed header followed by the
//! bincode-encoded document.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};

use crate::document::Document;
use crate::error::{RecordError, Result};

use super::DocumentSerializer;

/// Magic bytes at the start of every document file
pub const MAGIC: &[u8; 4] = b"RDOC";

/// File format version
pub const VERSION: u16 = 1;

/// Header size: magic (4) + version (2) + crc (4) + payload len (4)
pub const HEADER_SIZE: usize = 14;

/// Writes documents as `header + bincode` files
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeSerializer {
    /// fsync each file before returning from `serialize`
    sync: bool,
}

impl BincodeSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer that fsyncs every file it writes
    pub fn with_sync() -> Self {
        Self { sync: true }
    }

    /// Encode a document into a complete file image
    pub fn encode(document: &Document) -> Result<BytesMut> {
        let payload = bincode::serialize(document)?;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        buf.put_slice(MAGIC);
        buf.put_u16_le(VERSION);
        buf.put_u32_le(crc32fast::hash(&payload));
        buf.put_u32_le(payload.len() as u32);
        buf.put_slice(&payload);

        Ok(buf)
    }

    /// Decode a complete file image
    pub fn decode(mut bytes: &[u8]) -> Result<Document> {
        if bytes.len() < HEADER_SIZE {
            return Err(RecordError::Corruption(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        if &bytes[..4] != MAGIC {
            return Err(RecordError::Corruption("Bad magic bytes".to_string()));
        }
        bytes.advance(4);

        let version = bytes.get_u16_le();
        if version != VERSION {
            return Err(RecordError::Corruption(format!(
                "Unsupported version: {} (expected {})",
                version, VERSION
            )));
        }

        let expected_crc = bytes.get_u32_le();
        let len = bytes.get_u32_le() as usize;

        if bytes.len() != len {
            return Err(RecordError::Corruption(format!(
                "Payload length mismatch: header says {}, file has {}",
                len,
                bytes.len()
            )));
        }

        let actual_crc = crc32fast::hash(bytes);
        if actual_crc != expected_crc {
            return Err(RecordError::Corruption(format!(
                "Checksum mismatch: expected {:08x}, got {:08x}",
                expected_crc, actual_crc
            )));
        }

        Ok(bincode::deserialize(bytes)?)
    }
}

impl DocumentSerializer for BincodeSerializer {
    fn serialize(&self, document: &Document, path: &Path) -> Result<()> {
        let image = Self::encode(document)?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(&image)?;
        writer.flush()?;

        if self.sync {
            writer.get_ref().sync_all()?;
        }

        Ok(())
    }

    fn deserialize(&self, path: &Path) -> Result<Document> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes)
    }
}
