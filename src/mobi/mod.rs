mod chapters;
mod content;
mod exth;
mod headers;
pub mod palmdoc;
mod pdb;
mod reader;
mod styles;

pub use chapters::{HEADING_RULES, HeadingRule, Marker, find_markers, segment};
pub use content::strip_trailing_entries;
pub use exth::ExthMetadata;
pub use headers::{Compression, Encoding, MobiHeader, NULL_INDEX, PalmDocHeader};
pub use pdb::{Container, is_mobi_file};
pub use reader::{parse_mobi, parse_mobi_with};
pub use styles::extract_css;
