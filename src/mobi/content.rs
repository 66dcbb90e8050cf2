//! Text record extraction: trailing-entry stripping, decompression, decoding.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::ByteReader;

use super::headers::{Compression, Encoding};
use super::palmdoc;
use super::pdb::Container;

/// Decompress text records `1..=record_count` and concatenate them in order.
///
/// Record 0 holds the headers and is never part of the text. A record count
/// that overshoots the offset table is clamped to the records that exist.
pub fn decompress_records(
    reader: &ByteReader<'_>,
    pdb: &Container,
    compression: Compression,
    record_count: usize,
    extra_data_flags: u16,
) -> Vec<u8> {
    let available = pdb.num_records().saturating_sub(1);
    if record_count > available {
        warn!(
            declared = record_count,
            available, "text record count exceeds record table; clamping"
        );
    }
    let last = record_count.min(available);

    let mut text = Vec::new();
    for index in 1..=last {
        let Some(record) = pdb.record(reader, index) else {
            continue;
        };
        let record = strip_trailing_entries(record, extra_data_flags);

        match compression {
            Compression::PalmDoc => text.extend_from_slice(&palmdoc::decompress(record)),
            Compression::None | Compression::Unsupported(_) => text.extend_from_slice(record),
        }
    }

    debug!(records = last, bytes = text.len(), ?compression, "decompressed text records");
    text
}

/// Decode assembled text with the declared encoding, falling back to UTF-8.
pub fn assemble(text: &[u8], encoding: Encoding) -> Result<String> {
    if let Some(decoded) = encoding.decode(text) {
        return Ok(decoded);
    }

    warn!(?encoding, "text is not valid in its declared encoding; retrying as UTF-8");
    Encoding::Utf8.decode(text).ok_or_else(|| {
        Error::EncodingFailure(format!(
            "{} bytes are valid neither as {encoding:?} nor as UTF-8",
            text.len()
        ))
    })
}

/// Strip trailing entries from a text record.
///
/// MOBI text records can have trailing data appended. Each set bit of
/// `flags` above bit 0 adds an entry whose size is stored as a backward
/// variable-length integer at the very end; bit 0 marks multibyte overlap
/// bytes, counted by the low two bits of the last remaining byte.
pub fn strip_trailing_entries(record: &[u8], flags: u16) -> &[u8] {
    if flags == 0 || record.is_empty() {
        return record;
    }

    let mut end = record.len();

    for bit in 1..16 {
        if flags & (1 << bit) == 0 {
            continue;
        }
        let size = backward_varint(&record[..end]);
        if size == 0 || size > end {
            continue;
        }
        end -= size;
    }

    if flags & 1 != 0 && end > 0 {
        let overlap = (record[end - 1] & 3) as usize + 1;
        if overlap <= end {
            end -= overlap;
        }
    }

    &record[..end]
}

/// Read a variable-length integer stored backwards from the end of `data`.
/// The byte with the high bit set terminates it.
fn backward_varint(data: &[u8]) -> usize {
    let mut value = 0usize;
    let mut shift = 0;
    for &byte in data.iter().rev() {
        value |= ((byte & 0x7F) as usize) << shift;
        shift += 7;
        if byte & 0x80 != 0 || shift >= 28 {
            break;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal container whose records are the given byte strings.
    fn container(records: &[&[u8]]) -> Vec<u8> {
        let table_end = 78 + records.len() * 8;
        let mut data = vec![0u8; table_end.max(100)];
        data[60..68].copy_from_slice(b"BOOKMOBI");
        data[76..78].copy_from_slice(&(records.len() as u16).to_be_bytes());

        let mut offset = data.len();
        for (i, record) in records.iter().enumerate() {
            let pos = 78 + i * 8;
            data[pos..pos + 4].copy_from_slice(&(offset as u32).to_be_bytes());
            offset += record.len();
        }
        for record in records {
            data.extend_from_slice(record);
        }
        data
    }

    #[test]
    fn test_decompress_records_concatenates_in_order() {
        let data = container(&[b"HEADER", b"Hello, ", b"World"]);
        let reader = ByteReader::new(&data);
        let pdb = Container::parse(&reader).unwrap();

        let text = decompress_records(&reader, &pdb, Compression::None, 2, 0);
        assert_eq!(text, b"Hello, World");
    }

    #[test]
    fn test_decompress_records_palmdoc() {
        let first = palmdoc::compress(b"The cat sat on the mat. The cat sat.");
        let second = palmdoc::compress(b" The end.");
        let data = container(&[b"HEADER", &first, &second]);
        let reader = ByteReader::new(&data);
        let pdb = Container::parse(&reader).unwrap();

        let text = decompress_records(&reader, &pdb, Compression::PalmDoc, 2, 0);
        assert_eq!(text, b"The cat sat on the mat. The cat sat. The end.");
    }

    #[test]
    fn test_decompress_records_unsupported_passes_through() {
        let data = container(&[b"HEADER", &[0xC1, 0x80, 0x18]]);
        let reader = ByteReader::new(&data);
        let pdb = Container::parse(&reader).unwrap();

        let text = decompress_records(&reader, &pdb, Compression::Unsupported(17480), 1, 0);
        assert_eq!(text, vec![0xC1, 0x80, 0x18]);
    }

    #[test]
    fn test_decompress_records_clamps_count() {
        let data = container(&[b"HEADER", b"only"]);
        let reader = ByteReader::new(&data);
        let pdb = Container::parse(&reader).unwrap();

        let text = decompress_records(&reader, &pdb, Compression::None, 40, 0);
        assert_eq!(text, b"only");
    }

    #[test]
    fn test_decompress_records_header_only() {
        let data = container(&[b"HEADER"]);
        let reader = ByteReader::new(&data);
        let pdb = Container::parse(&reader).unwrap();

        assert!(decompress_records(&reader, &pdb, Compression::None, 1, 0).is_empty());
    }

    #[test]
    fn test_assemble_declared_encoding() {
        let text = assemble(&[b'n', 0xE9], Encoding::Cp1252).unwrap();
        assert_eq!(text, "n\u{e9}");

        let text = assemble("na\u{ef}ve".as_bytes(), Encoding::Utf8).unwrap();
        assert_eq!(text, "na\u{ef}ve");
    }

    #[test]
    fn test_assemble_invalid_utf8_fails() {
        let err = assemble(&[b'a', 0xFF, 0xFE], Encoding::Utf8).unwrap_err();
        assert!(matches!(err, Error::EncodingFailure(_)));
    }

    #[test]
    fn test_strip_trailing_entries_none() {
        assert_eq!(strip_trailing_entries(b"text", 0), b"text");
        assert_eq!(strip_trailing_entries(b"", 3), b"");
    }

    #[test]
    fn test_strip_trailing_entries_multibyte() {
        // Bit 0: last byte & 3 = 1 -> strip 2 bytes
        assert_eq!(strip_trailing_entries(b"text\xC3\x01", 1), b"text");
    }

    #[test]
    fn test_strip_trailing_entries_sized() {
        // Bit 1: entry of 3 bytes whose size byte (0x83) terminates the varint
        let record = b"text\xAA\xBB\x83";
        assert_eq!(strip_trailing_entries(record, 0b10), b"text");

        // Bits 1 and 0 together: sized entry first, then multibyte overlap
        let record = b"text\xC3\x01\xAA\x82";
        assert_eq!(strip_trailing_entries(record, 0b11), b"text");
    }

    #[test]
    fn test_strip_trailing_entries_oversized() {
        // Declared size larger than the record is ignored
        let record = b"ab\xFF";
        assert_eq!(strip_trailing_entries(record, 0b10), b"ab\xFF");
    }
}
