//! # mobidoc
//!
//! A defensive decoder for legacy MOBI and PalmDOC e-books.
//!
//! ## Features
//!
//! - Reads the PDB container, PalmDOC, MOBI and EXTH headers
//! - Decompresses PalmDOC (LZ77) text records, stripping trailing entries
//! - Decodes CP1252 or UTF-8 text
//! - Splits the markup into chapters with plain-text renditions
//!
//! Malformed input never panics: structural damage is reported as an
//! [`Error`], and everything else degrades to partial output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mobidoc::parse_mobi;
//!
//! let data = std::fs::read("book.mobi").unwrap();
//! let doc = parse_mobi(&data).unwrap();
//!
//! println!("{} by {}", doc.metadata.title, doc.metadata.author);
//! for chapter in &doc.chapters {
//!     println!("{}: {}", chapter.id, chapter.title);
//! }
//! ```
//!
//! ## Options
//!
//! ```
//! use mobidoc::ParseOptions;
//!
//! let options = ParseOptions::new()
//!     .with_duplicate_window(50)
//!     .with_fallback_title("Untitled");
//! assert_eq!(options.max_title_chars, 200);
//! ```

pub mod error;
pub mod io;
pub mod mobi;
pub mod model;
pub mod options;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Error, Result};
pub use mobi::{is_mobi_file, parse_mobi, parse_mobi_with};
pub use model::{Chapter, Document, DocumentInfo, Metadata};
pub use options::ParseOptions;
