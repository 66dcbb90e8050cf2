//! Error types for mobidoc operations.

use thiserror::Error;

/// Errors that can occur while decoding a MOBI/PalmDOC container.
///
/// Only `InvalidFile`, `NoRecords` and `EncodingFailure` ever reach callers of
/// [`parse_mobi`](crate::parse_mobi). `OutOfRange` is raised by
/// [`ByteReader`](crate::io::ByteReader) and is recovered from (or mapped to
/// `InvalidFile`) inside the parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Container has no records")]
    NoRecords,

    #[error("Text could not be decoded: {0}")]
    EncodingFailure(String),

    #[error("Read of {len} bytes at offset {offset} exceeds buffer of {available} bytes")]
    OutOfRange {
        offset: usize,
        len: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
