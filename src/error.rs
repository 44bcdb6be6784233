//! Error types for the index parsing core.
//!
//! Only [`ArchiveOpenError`] is fatal to a parse: if the index archive
//! itself cannot be opened there is nothing to stream. Everything below
//! that level degrades gracefully: an unreadable entry is skipped and a
//! broken scan takes down nothing but its own worker.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::inpx::FIELD_COUNT;

/// The index archive could not be opened at all.
///
/// No records are produced when this is returned; the session never starts.
#[derive(Debug, Error)]
pub enum ArchiveOpenError {
    /// The index file or library directory could not be read.
    #[error("can't open inpx index file")]
    Io(#[from] io::Error),

    /// The configured library path exists but is not a directory.
    #[error("inpx library path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The file is not a structurally valid zip container.
    #[error("not a valid inpx archive: {0}")]
    Invalid(&'static str),

    /// The container uses a zip feature this reader does not handle.
    #[error("unsupported inpx archive: {0}")]
    Unsupported(String),
}

/// A failure scoped to a single archive entry.
///
/// `Open` and `Compression` mean the entry never yielded a line and was
/// skipped. `Read` means scanning broke mid-entry; the lines already
/// delivered stand, the rest of the entry is lost, and the failure lands in
/// the session's error register.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The entry's data could not be located or read.
    #[error("can't open index entry {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The entry is compressed with a method this reader does not handle.
    #[error("index entry {name} uses unsupported compression method {method}")]
    Compression { name: String, method: u16 },

    /// Line scanning failed partway through the entry.
    #[error("can't scan index entry {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// A line did not split into the fixed record arity.
///
/// Carries the count that was found; the expected count is always
/// [`FIELD_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wrong number of fields: expected 14, found {found}")]
pub struct DecodeError {
    pub found: usize,
}

impl DecodeError {
    pub fn expected(&self) -> usize {
        FIELD_COUNT
    }
}
