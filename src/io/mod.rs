//! Bounds-checked access to raw container bytes.

mod byte_reader;

pub use byte_reader::ByteReader;
