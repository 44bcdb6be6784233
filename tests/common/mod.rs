//! Hand-built zip fixtures for the integration tests.
//!
//! Writes just enough of the format for the reader under test: local file
//! headers, STORED or DEFLATE data, a central directory, and a classic
//! EOCD record. CRCs are zeroed; the reader does not verify them.

#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

pub struct ZipBuilder {
    data: Vec<u8>,
    directory: Vec<u8>,
    count: u16,
    comment: Vec<u8>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            directory: Vec::new(),
            count: 0,
            comment: Vec::new(),
        }
    }

    pub fn stored(self, name: &str, content: &[u8]) -> Self {
        let content = content.to_vec();
        let len = content.len();
        self.entry(name, METHOD_STORED, content, len)
    }

    pub fn deflated(self, name: &str, content: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        let compressed = encoder.finish().unwrap();
        self.entry(name, METHOD_DEFLATE, compressed, content.len())
    }

    /// An entry whose compression method the reader does not support.
    pub fn exotic(self, name: &str, content: &[u8]) -> Self {
        let content = content.to_vec();
        let len = content.len();
        self.entry(name, 14, content, len)
    }

    pub fn dir(self, name: &str) -> Self {
        assert!(name.ends_with('/'));
        self.entry(name, METHOD_STORED, Vec::new(), 0)
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.comment = text.as_bytes().to_vec();
        self
    }

    fn entry(mut self, name: &str, method: u16, raw: Vec<u8>, uncompressed_len: usize) -> Self {
        let header_offset = self.data.len() as u32;

        // Local file header.
        self.data.extend_from_slice(b"PK\x03\x04");
        self.data.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.data.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.data.extend_from_slice(&method.to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes()); // mod time
        self.data.extend_from_slice(&0u16.to_le_bytes()); // mod date
        self.data.extend_from_slice(&0u32.to_le_bytes()); // crc32
        self.data
            .extend_from_slice(&(raw.len() as u32).to_le_bytes());
        self.data
            .extend_from_slice(&(uncompressed_len as u32).to_le_bytes());
        self.data
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes()); // extra length
        self.data.extend_from_slice(name.as_bytes());
        self.data.extend_from_slice(&raw);

        // Matching central directory header.
        self.directory.extend_from_slice(b"PK\x01\x02");
        self.directory.extend_from_slice(&20u16.to_le_bytes()); // made by
        self.directory.extend_from_slice(&20u16.to_le_bytes()); // needed
        self.directory.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.directory.extend_from_slice(&method.to_le_bytes());
        self.directory.extend_from_slice(&0u16.to_le_bytes()); // mod time
        self.directory.extend_from_slice(&0u16.to_le_bytes()); // mod date
        self.directory.extend_from_slice(&0u32.to_le_bytes()); // crc32
        self.directory
            .extend_from_slice(&(raw.len() as u32).to_le_bytes());
        self.directory
            .extend_from_slice(&(uncompressed_len as u32).to_le_bytes());
        self.directory
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.directory.extend_from_slice(&0u16.to_le_bytes()); // extra length
        self.directory.extend_from_slice(&0u16.to_le_bytes()); // comment length
        self.directory.extend_from_slice(&0u16.to_le_bytes()); // disk start
        self.directory.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        self.directory.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        self.directory.extend_from_slice(&header_offset.to_le_bytes());
        self.directory.extend_from_slice(name.as_bytes());

        self.count += 1;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = self.data;
        let directory_offset = out.len() as u32;
        out.extend_from_slice(&self.directory);

        out.extend_from_slice(b"PK\x05\x06");
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number
        out.extend_from_slice(&0u16.to_le_bytes()); // disk with directory
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&(self.directory.len() as u32).to_le_bytes());
        out.extend_from_slice(&directory_offset.to_le_bytes());
        out.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.comment);
        out
    }
}
