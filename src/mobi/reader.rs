use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::ByteReader;
use crate::model::{Document, DocumentInfo, Metadata};
use crate::options::ParseOptions;

use super::chapters::segment;
use super::content::{assemble, decompress_records};
use super::exth::ExthMetadata;
use super::headers::{MobiHeader, PalmDocHeader};
use super::pdb::Container;
use super::styles::extract_css;

const DEFAULT_AUTHOR: &str = "Unknown";
const DEFAULT_LANGUAGE: &str = "en";

/// Decode a MOBI/PalmDOC buffer into a [`Document`] with default options.
pub fn parse_mobi(data: &[u8]) -> Result<Document> {
    parse_mobi_with(data, &ParseOptions::default())
}

/// Decode a MOBI/PalmDOC buffer into a [`Document`].
///
/// Fails only when the container structure is unusable
/// ([`Error::InvalidFile`], [`Error::NoRecords`]) or the text cannot be
/// decoded ([`Error::EncodingFailure`]). Every other anomaly degrades the
/// result instead: missing headers give default metadata, bad compression
/// data truncates text, and missing headings give a single chapter.
pub fn parse_mobi_with(data: &[u8], options: &ParseOptions) -> Result<Document> {
    let reader = ByteReader::new(data);

    // 1. PDB header and record table
    let pdb = Container::parse(&reader)?;
    let record0 = *pdb.record_offsets.first().ok_or(Error::NoRecords)? as usize;

    // 2. Headers in record 0
    let palmdoc = PalmDocHeader::parse(&reader, record0)?;
    let mobi = MobiHeader::parse(&reader, record0);

    // 3. EXTH metadata, if flagged
    let exth = if mobi.has_exth() {
        ExthMetadata::parse(&reader, mobi.exth_offset(), mobi.encoding)
    } else {
        ExthMetadata::default()
    };

    let metadata = build_metadata(&pdb, &mobi, &exth);

    // 4. Text records
    let raw_markup = if palmdoc.is_encrypted() {
        warn!(
            encryption = palmdoc.encryption,
            "book is encrypted; text records are not decoded"
        );
        String::new()
    } else {
        let flags = if options.strip_trailing_entries {
            mobi.extra_data_flags
        } else {
            0
        };
        let text = decompress_records(
            &reader,
            &pdb,
            palmdoc.compression,
            palmdoc.record_count as usize,
            flags,
        );
        assemble(&text, mobi.encoding)?
    };

    // 5. Styles and chapters
    let css = extract_css(&raw_markup);
    let chapters = segment(&raw_markup, &pdb.name, options);

    debug!(
        title = %metadata.title,
        chapters = chapters.len(),
        markup_bytes = raw_markup.len(),
        "parsed MOBI document"
    );

    let info = DocumentInfo {
        container_name: pdb.name.clone(),
        record_count: pdb.num_records(),
        compression: palmdoc.compression,
        text_length: palmdoc.text_length,
        text_record_count: palmdoc.record_count,
        text_record_size: palmdoc.record_size,
        encryption: palmdoc.encryption,
        has_mobi_header: mobi.identifier_valid,
        mobi_type: mobi.mobi_type,
        encoding: mobi.encoding,
        first_image_index: mobi.first_image_index,
        exth_flags: mobi.exth_flags,
    };

    Ok(Document {
        metadata,
        chapters,
        raw_markup,
        css,
        info,
    })
}

/// Merge header and EXTH fields, applying the documented fallbacks.
fn build_metadata(pdb: &Container, mobi: &MobiHeader, exth: &ExthMetadata) -> Metadata {
    let title = if mobi.title.is_empty() {
        pdb.name.trim()
    } else {
        mobi.title.as_str()
    };

    let mut metadata = Metadata::new(title)
        .with_author(or_default(&exth.author, DEFAULT_AUTHOR))
        .with_language(or_default(&exth.language, DEFAULT_LANGUAGE));
    metadata.publisher = exth.publisher.clone();
    metadata.isbn = exth.isbn.clone();
    metadata.description = exth.description.clone();
    metadata
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value }
}
