//! EXTH (extended header) metadata records.

use tracing::{trace, warn};

use crate::io::ByteReader;

use super::headers::Encoding;

const EXTH_AUTHOR: u32 = 100;
const EXTH_PUBLISHER: u32 = 101;
const EXTH_DESCRIPTION: u32 = 103;
const EXTH_ISBN: u32 = 104;
const EXTH_LANGUAGE: u32 = 524;

/// Metadata collected from the EXTH block. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExthMetadata {
    pub author: String,
    pub publisher: String,
    pub description: String,
    pub isbn: String,
    pub language: String,
}

impl ExthMetadata {
    /// Parse the EXTH block starting at the absolute offset `start`.
    ///
    /// Never fails: an invalid identifier yields empty metadata, and iteration
    /// stops at the first record header or payload that would run past the
    /// buffer, keeping whatever was collected so far.
    pub fn parse(reader: &ByteReader<'_>, start: usize, encoding: Encoding) -> Self {
        let mut exth = Self::default();

        if !matches!(reader.read_slice(start, 4), Ok(b"EXTH")) {
            warn!(offset = start, "EXTH flag set but identifier is missing");
            return exth;
        }

        // start + 4 holds the block length, which is not needed.
        let Ok(record_count) = reader.read_u32(start + 8) else {
            warn!("EXTH header truncated before record count");
            return exth;
        };

        let mut pos = start + 12;
        for index in 0..record_count {
            let (Ok(record_type), Ok(record_len)) = (reader.read_u32(pos), reader.read_u32(pos + 4))
            else {
                warn!(index, record_count, "EXTH record header truncated");
                break;
            };

            // Length includes the 8-byte record header.
            let record_len = record_len as usize;
            let Some(payload_len) = record_len.checked_sub(8) else {
                warn!(index, record_len, "EXTH record shorter than its own header");
                break;
            };

            let Ok(payload) = reader.read_slice(pos + 8, payload_len) else {
                warn!(
                    index,
                    record_len,
                    remaining = reader.remaining(pos),
                    "EXTH record payload exceeds buffer"
                );
                break;
            };

            trace!(record_type, record_len, "EXTH record");
            exth.apply(record_type, payload, encoding);
            pos += record_len;
        }

        exth
    }

    fn apply(&mut self, record_type: u32, payload: &[u8], encoding: Encoding) {
        let field = match record_type {
            EXTH_AUTHOR => &mut self.author,
            EXTH_PUBLISHER => &mut self.publisher,
            EXTH_DESCRIPTION => &mut self.description,
            EXTH_ISBN => &mut self.isbn,
            EXTH_LANGUAGE => &mut self.language,
            _ => return,
        };
        *field = encoding.decode_lossy(payload).trim().to_string();
    }
}
