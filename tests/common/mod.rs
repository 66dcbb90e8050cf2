//! In-memory MOBI container builder for integration tests and benches.

#![allow(dead_code)]

use mobidoc::mobi::palmdoc;

pub const COMPRESSION_NONE: u16 = 1;
pub const COMPRESSION_PALMDOC: u16 = 2;
pub const COMPRESSION_HUFF_CDIC: u16 = 17480;

pub const CODEPAGE_CP1252: u32 = 1252;
pub const CODEPAGE_UTF8: u32 = 65001;

const MOBI_HEADER_LENGTH: u32 = 0xE8;
const EXTH_FLAG: u32 = 0x40;

/// Builds a PDB container holding a PalmDOC/MOBI book.
#[derive(Debug, Clone)]
pub struct BookBuilder {
    name: String,
    signature: [u8; 8],
    compression: u16,
    encryption: u16,
    declared_records: Option<u16>,
    mobi: bool,
    codepage: u32,
    title: Option<Vec<u8>>,
    extra_data_flags: u16,
    exth: Vec<(u32, Vec<u8>)>,
    raw_exth: Option<Vec<u8>>,
    records: Vec<Vec<u8>>,
}

impl BookBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            signature: *b"BOOKMOBI",
            compression: COMPRESSION_NONE,
            encryption: 0,
            declared_records: None,
            mobi: false,
            codepage: CODEPAGE_UTF8,
            title: None,
            extra_data_flags: 0,
            exth: Vec::new(),
            raw_exth: None,
            records: Vec::new(),
        }
    }

    pub fn signature(mut self, signature: &[u8; 8]) -> Self {
        self.signature = *signature;
        self
    }

    pub fn compression(mut self, code: u16) -> Self {
        self.compression = code;
        self
    }

    pub fn encryption(mut self, kind: u16) -> Self {
        self.encryption = kind;
        self
    }

    /// Override the PalmDOC text record count.
    pub fn declared_records(mut self, count: u16) -> Self {
        self.declared_records = Some(count);
        self
    }

    /// Include a MOBI header with the given codepage.
    pub fn mobi(mut self, codepage: u32) -> Self {
        self.mobi = true;
        self.codepage = codepage;
        self
    }

    pub fn title(mut self, title: &[u8]) -> Self {
        self.mobi = true;
        self.title = Some(title.to_vec());
        self
    }

    pub fn extra_data_flags(mut self, flags: u16) -> Self {
        self.mobi = true;
        self.extra_data_flags = flags;
        self
    }

    pub fn exth(mut self, kind: u32, payload: &[u8]) -> Self {
        self.mobi = true;
        self.exth.push((kind, payload.to_vec()));
        self
    }

    /// Use `block` verbatim as the EXTH block.
    pub fn raw_exth(mut self, block: &[u8]) -> Self {
        self.mobi = true;
        self.raw_exth = Some(block.to_vec());
        self
    }

    /// Append a text record, stored as given.
    pub fn record(mut self, bytes: &[u8]) -> Self {
        self.records.push(bytes.to_vec());
        self
    }

    /// Append a text record, PalmDOC-compressed.
    pub fn compressed_record(mut self, text: &[u8]) -> Self {
        self.records.push(palmdoc::compress(text));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let record0 = self.record0();

        let mut all = Vec::with_capacity(self.records.len() + 1);
        all.push(record0);
        all.extend(self.records.iter().cloned());

        let mut data = vec![0u8; 78];
        let name = self.name.as_bytes();
        let n = name.len().min(31);
        data[..n].copy_from_slice(&name[..n]);
        data[60..68].copy_from_slice(&self.signature);
        data[76..78].copy_from_slice(&(all.len() as u16).to_be_bytes());

        let mut offset = 78 + all.len() * 8 + 2;
        for (i, record) in all.iter().enumerate() {
            data.extend_from_slice(&(offset as u32).to_be_bytes());
            data.extend_from_slice(&[0, 0, 0, i as u8]);
            offset += record.len();
        }
        data.extend_from_slice(&[0, 0]);

        for record in &all {
            data.extend_from_slice(record);
        }
        if data.len() < 100 {
            data.resize(100, 0);
        }
        data
    }

    fn record0(&self) -> Vec<u8> {
        let text_length: usize = self.records.iter().map(Vec::len).sum();
        let count = self
            .declared_records
            .unwrap_or(self.records.len() as u16);

        let mut rec = Vec::new();
        rec.extend_from_slice(&self.compression.to_be_bytes());
        rec.extend_from_slice(&[0, 0]);
        rec.extend_from_slice(&(text_length as u32).to_be_bytes());
        rec.extend_from_slice(&count.to_be_bytes());
        rec.extend_from_slice(&4096u16.to_be_bytes());
        rec.extend_from_slice(&self.encryption.to_be_bytes());
        rec.extend_from_slice(&[0, 0]);

        if !self.mobi {
            return rec;
        }

        rec.resize(16 + MOBI_HEADER_LENGTH as usize, 0);
        rec[16..20].copy_from_slice(b"MOBI");
        put_u32(&mut rec, 0x14, MOBI_HEADER_LENGTH);
        put_u32(&mut rec, 0x18, 2);
        put_u32(&mut rec, 0x1C, self.codepage);
        put_u32(&mut rec, 0x6C, 0xFFFF_FFFF);
        rec[0xF2..0xF4].copy_from_slice(&self.extra_data_flags.to_be_bytes());

        let exth = match &self.raw_exth {
            Some(block) => Some(block.clone()),
            None if !self.exth.is_empty() => Some(exth_block(&self.exth)),
            None => None,
        };
        if let Some(block) = exth {
            put_u32(&mut rec, 0x80, EXTH_FLAG);
            rec.extend_from_slice(&block);
        }

        if let Some(title) = &self.title {
            let title_offset = rec.len() as u32;
            put_u32(&mut rec, 0x54, title_offset);
            put_u32(&mut rec, 0x58, title.len() as u32);
            rec.extend_from_slice(title);
        }
        rec
    }
}

/// Encode EXTH records into a complete block, padded to four bytes.
pub fn exth_block(records: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (kind, payload) in records {
        body.extend_from_slice(&kind.to_be_bytes());
        body.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
        body.extend_from_slice(payload);
    }

    let mut block = Vec::new();
    block.extend_from_slice(b"EXTH");
    block.extend_from_slice(&(body.len() as u32 + 12).to_be_bytes());
    block.extend_from_slice(&(records.len() as u32).to_be_bytes());
    block.extend_from_slice(&body);
    while block.len() % 4 != 0 {
        block.push(0);
    }
    block
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

/// Filler paragraph of exactly `chars` ASCII characters, tags included.
pub fn filler(chars: usize) -> String {
    assert!(chars >= 7);
    format!("<p>{}</p>", "x".repeat(chars - 7))
}
