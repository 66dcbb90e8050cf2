//! Decoded document: metadata, chapters and the markup they were cut from.

use crate::mobi::{Compression, Encoding};

/// A decoded e-book.
///
/// Chapters are in document order and their `raw_markup` slices concatenate
/// to exactly `raw_markup`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Document {
    pub metadata: Metadata,
    pub chapters: Vec<Chapter>,
    pub raw_markup: String,
    pub css: String,
    pub info: DocumentInfo,
}

/// Book metadata merged from the PDB name, MOBI header and EXTH block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub language: String,
    pub isbn: String,
    pub description: String,
}

/// One segment of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub plain_text: String,
    pub raw_markup: String,
    /// Byte offset of `raw_markup` within [`Document::raw_markup`].
    pub offset: usize,
}

/// Informational header fields, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocumentInfo {
    pub container_name: String,
    pub record_count: usize,
    pub compression: Compression,
    pub text_length: u32,
    pub text_record_count: u16,
    pub text_record_size: u16,
    pub encryption: u16,
    pub has_mobi_header: bool,
    pub mobi_type: u32,
    pub encoding: Encoding,
    pub first_image_index: u32,
    pub exth_flags: u32,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Document {
    /// Look up a chapter by its id.
    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    /// Plain text of the whole book, chapters separated by blank lines.
    pub fn plain_text(&self) -> String {
        self.chapters
            .iter()
            .map(|c| c.plain_text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Chapter {
    /// Byte range of this chapter within [`Document::raw_markup`].
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.raw_markup.len()
    }
}
