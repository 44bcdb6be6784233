//! On-disk zip structures used by the index container.
//!
//! Only the pieces a tail-first reader needs: the End of Central Directory
//! record (plus its zip64 variants) and the signatures and fixed sizes of
//! the central directory and local file headers. Central directory entries
//! themselves are parsed in [`super::reader`].

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::ArchiveOpenError;

pub(crate) const EOCD_SIGNATURE: &[u8] = b"PK\x05\x06";
pub(crate) const ZIP64_LOCATOR_SIGNATURE: &[u8] = b"PK\x06\x07";
pub(crate) const ZIP64_EOCD_SIGNATURE: &[u8] = b"PK\x06\x06";
pub(crate) const CENTRAL_HEADER_SIGNATURE: &[u8] = b"PK\x01\x02";
pub(crate) const LOCAL_HEADER_SIGNATURE: &[u8] = b"PK\x03\x04";

pub(crate) const EOCD_SIZE: usize = 22;
pub(crate) const ZIP64_LOCATOR_SIZE: usize = 20;
pub(crate) const ZIP64_EOCD_SIZE: usize = 56;
pub(crate) const LOCAL_HEADER_SIZE: usize = 30;

/// Maximum zip comment size (65535 bytes); bounds the EOCD search window.
pub(crate) const MAX_COMMENT_SIZE: u64 = 65535;

/// How an entry's bytes are stored in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflate,
    Unsupported(u16),
}

impl Compression {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Compression::Stored,
            8 => Compression::Deflate,
            other => Compression::Unsupported(other),
        }
    }
}

/// End of Central Directory record.
#[derive(Debug)]
pub(crate) struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_directory: u16,
    pub entries_on_disk: u16,
    pub total_entries: u16,
    pub directory_size: u32,
    pub directory_offset: u32,
}

impl EndOfCentralDirectory {
    pub fn parse(data: &[u8]) -> Result<Self, ArchiveOpenError> {
        if data.len() < EOCD_SIZE || &data[0..4] != EOCD_SIGNATURE {
            return Err(ArchiveOpenError::Invalid("bad end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_directory: cursor.read_u16::<LittleEndian>()?,
            entries_on_disk: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            directory_size: cursor.read_u32::<LittleEndian>()?,
            directory_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    /// True when any field is saturated and the zip64 record must be read.
    pub fn needs_zip64(&self) -> bool {
        self.entries_on_disk == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.directory_size == 0xFFFFFFFF
            || self.directory_offset == 0xFFFFFFFF
    }

    pub fn spans_disks(&self) -> bool {
        self.disk_number != self.disk_with_directory
            || self.entries_on_disk != self.total_entries
    }
}

/// Zip64 EOCD locator, sitting immediately before the classic EOCD.
#[derive(Debug)]
pub(crate) struct Zip64Locator {
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64Locator {
    pub fn parse(data: &[u8]) -> Result<Self, ArchiveOpenError> {
        if data.len() < ZIP64_LOCATOR_SIZE || &data[0..4] != ZIP64_LOCATOR_SIGNATURE {
            return Err(ArchiveOpenError::Invalid("bad zip64 locator"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_with_eocd64 = cursor.read_u32::<LittleEndian>()?;
        Ok(Self {
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
            total_disks: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

/// Zip64 End of Central Directory record.
#[derive(Debug)]
pub(crate) struct Zip64EndOfCentralDirectory {
    pub total_entries: u64,
    pub directory_size: u64,
    pub directory_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    pub fn parse(data: &[u8]) -> Result<Self, ArchiveOpenError> {
        if data.len() < ZIP64_EOCD_SIZE || &data[0..4] != ZIP64_EOCD_SIGNATURE {
            return Err(ArchiveOpenError::Invalid("bad zip64 end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _record_size = cursor.read_u64::<LittleEndian>()?;
        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _disk_number = cursor.read_u32::<LittleEndian>()?;
        let _disk_with_directory = cursor.read_u32::<LittleEndian>()?;
        let _entries_on_disk = cursor.read_u64::<LittleEndian>()?;
        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            directory_size: cursor.read_u64::<LittleEndian>()?,
            directory_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}
