//! Reading the zip container behind an INPX index.
//!
//! An index archive is an ordinary zip file whose entries are plain-text
//! catalogs. This module knows nothing about the catalog line format; it
//! opens the container, lists its entries, and hands out buffered line
//! readers over their decompressed bytes.
//!
//! Layout follows the format: entries are listed from the central directory
//! at the tail of the file (zip64 aware), and each entry's data is located
//! through its local file header on demand. STORED and DEFLATE entries are
//! supported; anything else fails that entry only.

mod format;
mod reader;

pub use format::Compression;
pub use reader::{EntryInfo, EntryReader, IndexArchive};
