use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::ByteReader;

pub const NULL_INDEX: u32 = 0xFFFFFFFF;

/// Offset of the MOBI header from the start of record 0.
pub const MOBI_HEADER_OFFSET: usize = 16;

/// Compression code used by HUFF/CDIC books ("DH").
pub const HUFF_CDIC_CODE: u16 = 17480;

/// EXTH-flags bit signalling that an EXTH block follows the MOBI header.
const EXTH_FLAG: u32 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Compression {
    None,
    PalmDoc,
    /// HUFF/CDIC (code 17480) or any unrecognized code. Records are passed
    /// through without decompression.
    Unsupported(u16),
}

impl Compression {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Compression::None,
            2 => Compression::PalmDoc,
            n => Compression::Unsupported(n),
        }
    }

    pub fn is_huff_cdic(&self) -> bool {
        *self == Compression::Unsupported(HUFF_CDIC_CODE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Encoding {
    Cp1252,
    #[default]
    Utf8,
}

impl Encoding {
    pub fn from_codepage(codepage: u32) -> Self {
        match codepage {
            1252 => Encoding::Cp1252,
            _ => Encoding::Utf8,
        }
    }

    /// Decode bytes strictly, returning `None` on malformed input.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        let encoding = match self {
            Encoding::Cp1252 => encoding_rs::WINDOWS_1252,
            Encoding::Utf8 => encoding_rs::UTF_8,
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|s| s.into_owned())
    }

    /// Decode bytes, replacing malformed sequences.
    pub fn decode_lossy(self, bytes: &[u8]) -> String {
        let encoding = match self {
            Encoding::Cp1252 => encoding_rs::WINDOWS_1252,
            Encoding::Utf8 => encoding_rs::UTF_8,
        };
        let (text, _, _) = encoding.decode(bytes);
        text.into_owned()
    }
}

/// PalmDOC header: the first 16 bytes of record 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalmDocHeader {
    pub compression: Compression,
    /// Declared uncompressed text length.
    pub text_length: u32,
    pub record_count: u16,
    /// Informational only.
    pub record_size: u16,
    /// Informational only; nothing is ever decrypted.
    pub encryption: u16,
}

impl PalmDocHeader {
    /// Parse the PalmDOC header at `record0`, the absolute offset of record 0.
    ///
    /// Record 0 must hold the whole 16-byte header; anything shorter means the
    /// container has no usable structure.
    pub fn parse(reader: &ByteReader<'_>, record0: usize) -> Result<Self> {
        let field = |err: Error| Error::InvalidFile(format!("PalmDOC header truncated: {err}"));

        let code = reader.read_u16(record0).map_err(field)?;
        let text_length = reader.read_u32(record0 + 4).map_err(field)?;
        let record_count = reader.read_u16(record0 + 8).map_err(field)?;
        let record_size = reader.read_u16(record0 + 10).map_err(field)?;
        let encryption = reader.read_u16(record0 + 12).map_err(field)?;

        let compression = Compression::from_code(code);
        if let Compression::Unsupported(n) = compression {
            warn!(
                code = n,
                huff_cdic = compression.is_huff_cdic(),
                "unsupported compression; text records will be passed through"
            );
        }

        Ok(Self {
            compression,
            text_length,
            record_count,
            record_size,
            encryption,
        })
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption != 0
    }
}

/// MOBI header (follows the PalmDOC header inside record 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobiHeader {
    /// False when the "MOBI" identifier is missing; every other field then
    /// holds its default.
    pub identifier_valid: bool,
    pub header_length: u32,
    pub mobi_type: u32,
    pub encoding: Encoding,
    /// Raw codepage value the encoding was derived from.
    pub codepage: u32,
    pub first_image_index: u32,
    pub title: String,
    pub exth_flags: u32,
    pub extra_data_flags: u16,
    /// Absolute offset of the MOBI header (record 0 + 16).
    pub header_start: usize,
}

impl Default for MobiHeader {
    fn default() -> Self {
        Self {
            identifier_valid: false,
            header_length: 0,
            mobi_type: 0,
            encoding: Encoding::Utf8,
            codepage: 0,
            first_image_index: NULL_INDEX,
            title: String::new(),
            exth_flags: 0,
            extra_data_flags: 0,
            header_start: 0,
        }
    }
}

impl MobiHeader {
    /// Parse the MOBI header of the record starting at `record0`.
    ///
    /// A missing identifier is not an error: the header is optional metadata
    /// and an all-default value is returned instead. Individual fields that
    /// would read past the buffer also fall back to their defaults.
    pub fn parse(reader: &ByteReader<'_>, record0: usize) -> Self {
        let start = record0 + MOBI_HEADER_OFFSET;

        match reader.read_slice(start, 4) {
            Ok(b"MOBI") => {}
            _ => {
                warn!(offset = start, "MOBI identifier missing; using default header");
                return Self {
                    header_start: start,
                    ..Self::default()
                };
            }
        }

        let u32_at = |rel: usize, default: u32| reader.read_u32(record0 + rel).unwrap_or(default);

        let header_length = u32_at(0x14, 0);
        let mobi_type = u32_at(0x18, 0);
        let codepage = u32_at(0x1C, 0);
        let first_image_index = u32_at(0x6C, NULL_INDEX);
        let exth_flags = u32_at(0x80, 0);

        let extra_data_flags = if header_length >= 0xE4 {
            reader.read_u16(record0 + 0xF2).unwrap_or(0)
        } else {
            0
        };

        let encoding = Encoding::from_codepage(codepage);
        let title = resolve_title(reader, record0, encoding);

        debug!(
            header_length,
            mobi_type,
            codepage,
            exth = exth_flags & EXTH_FLAG != 0,
            "parsed MOBI header"
        );

        Self {
            identifier_valid: true,
            header_length,
            mobi_type,
            encoding,
            codepage,
            first_image_index,
            title,
            exth_flags,
            extra_data_flags,
            header_start: start,
        }
    }

    pub fn has_exth(&self) -> bool {
        self.identifier_valid && self.exth_flags & EXTH_FLAG != 0
    }

    /// Absolute offset where an EXTH block would begin.
    ///
    /// `header_length` is measured from the "MOBI" identifier, not from the
    /// start of record 0, so the block sits at `record0 + 16 + header_length`.
    pub fn exth_offset(&self) -> usize {
        self.header_start.saturating_add(self.header_length as usize)
    }
}

/// Full title: offset (relative to record 0) and length at 0x54/0x58.
fn resolve_title(reader: &ByteReader<'_>, record0: usize, encoding: Encoding) -> String {
    let (Ok(offset), Ok(length)) = (reader.read_u32(record0 + 0x54), reader.read_u32(record0 + 0x58))
    else {
        return String::new();
    };

    match record0
        .checked_add(offset as usize)
        .and_then(|start| reader.read_slice(start, length as usize).ok())
    {
        Some(bytes) => encoding.decode_lossy(bytes).trim().to_string(),
        None => {
            warn!(offset, length, "full title lies outside the buffer; skipping");
            String::new()
        }
    }
}
