//! Palm Database (PDB) container header.

use bstr::ByteSlice;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::ByteReader;

/// Smallest buffer that can hold a PDB header plus one record entry.
pub const MIN_CONTAINER_LEN: usize = 100;

const NAME_LEN: usize = 32;
const ATTRIBUTES_OFFSET: usize = 32;
const VERSION_OFFSET: usize = 34;
const TYPE_OFFSET: usize = 60;
const CREATOR_OFFSET: usize = 64;
const RECORD_COUNT_OFFSET: usize = 76;
const RECORD_TABLE_OFFSET: usize = 78;
const RECORD_ENTRY_LEN: usize = 8;

/// Type/creator pairs that identify an e-book container.
const SIGNATURES: [(&[u8; 4], &[u8; 4]); 2] = [(b"BOOK", b"MOBI"), (b"TEXt", b"REAd")];

/// Check the Palm Database type/creator signature at bytes 60-67.
///
/// Accepts `BOOK`/`MOBI` (Mobipocket) and `TEXt`/`REAd` (plain PalmDOC).
/// Buffers too short to hold the signature are rejected.
pub fn is_mobi_file(data: &[u8]) -> bool {
    let Some(ident) = data.get(TYPE_OFFSET..CREATOR_OFFSET + 4) else {
        return false;
    };
    SIGNATURES
        .iter()
        .any(|(kind, creator)| &ident[..4] == *kind && &ident[4..] == *creator)
}

/// Parsed PDB header: database name and the record offset table.
#[derive(Debug, Clone)]
pub struct Container {
    pub name: String,
    pub attributes: u16,
    pub version: u16,
    pub type_code: [u8; 4],
    pub creator: [u8; 4],
    /// Absolute byte offset of each record, in table order.
    pub record_offsets: Vec<u32>,
    /// Length of the whole buffer, used as the end of the last record.
    file_len: usize,
}

impl Container {
    /// Parse the PDB header at the start of `reader`.
    pub fn parse(reader: &ByteReader<'_>) -> Result<Self> {
        if reader.len() < MIN_CONTAINER_LEN {
            return Err(Error::InvalidFile(format!(
                "buffer of {} bytes is smaller than a PDB header",
                reader.len()
            )));
        }

        let name_bytes = reader.read_slice(0, NAME_LEN).map_err(structural)?;
        let name = name_bytes
            .trim_end_with(|c| c == '\0')
            .to_str_lossy()
            .into_owned();

        let attributes = reader.read_u16(ATTRIBUTES_OFFSET).map_err(structural)?;
        let version = reader.read_u16(VERSION_OFFSET).map_err(structural)?;
        let type_code = fourcc(reader, TYPE_OFFSET)?;
        let creator = fourcc(reader, CREATOR_OFFSET)?;

        let num_records = reader.read_u16(RECORD_COUNT_OFFSET).map_err(structural)? as usize;
        if num_records == 0 {
            return Err(Error::NoRecords);
        }

        let mut record_offsets = Vec::with_capacity(num_records);
        for i in 0..num_records {
            let pos = RECORD_TABLE_OFFSET + i * RECORD_ENTRY_LEN;
            // Bytes 4..8 of each entry (attributes + unique id) are not needed.
            let offset = reader.read_u32(pos).map_err(|_| {
                Error::InvalidFile(format!(
                    "record table declares {num_records} records but is truncated at entry {i}"
                ))
            })?;
            record_offsets.push(offset);
        }

        if record_offsets.windows(2).any(|w| w[1] < w[0]) {
            warn!("record offset table is not monotonic; affected records will be empty");
        }

        debug!(
            name = %name,
            records = num_records,
            "parsed PDB header"
        );

        Ok(Self {
            name,
            attributes,
            version,
            type_code,
            creator,
            record_offsets,
            file_len: reader.len(),
        })
    }

    pub fn num_records(&self) -> usize {
        self.record_offsets.len()
    }

    /// Get the byte range for a record.
    ///
    /// The range ends at the next record's offset, or at the end of the buffer
    /// for the last record. Offsets beyond the buffer are clamped to its end and
    /// a decreasing pair yields an empty range, so the result can always be
    /// sliced safely.
    pub fn record_range(&self, index: usize) -> Option<(usize, usize)> {
        let start = *self.record_offsets.get(index)? as usize;
        let end = self
            .record_offsets
            .get(index + 1)
            .map(|&next| next as usize)
            .unwrap_or(self.file_len);

        let start = start.min(self.file_len);
        let end = end.min(self.file_len).max(start);
        Some((start, end))
    }

    /// Borrow the bytes of a record.
    pub fn record<'a>(&self, reader: &ByteReader<'a>, index: usize) -> Option<&'a [u8]> {
        let (start, end) = self.record_range(index)?;
        reader.read_range(start, end).ok()
    }
}

fn fourcc(reader: &ByteReader<'_>, offset: usize) -> Result<[u8; 4]> {
    let b = reader.read_slice(offset, 4).map_err(structural)?;
    Ok([b[0], b[1], b[2], b[3]])
}

fn structural(err: Error) -> Error {
    Error::InvalidFile(err.to_string())
}
