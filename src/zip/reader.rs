//! Tail-first reader for the index container.
//!
//! Zip archives are designed to be read from the end: locate the End of
//! Central Directory record, promote to the zip64 variant if its fields are
//! saturated, then walk the central directory to list every entry. Entry
//! data is only touched when a worker asks for its line reader.

use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use log::debug;

use crate::error::{ArchiveOpenError, EntryError};
use crate::io::{LocalFileReader, ReadAt, read_exact_at};

use super::format::*;

/// Metadata for one entry, taken from the central directory.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub name: String,
    pub compression: Compression,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub(crate) header_offset: u64,
    is_directory: bool,
}

impl EntryInfo {
    /// True for entries that carry data (directories never do).
    pub fn is_file(&self) -> bool {
        !self.is_directory
    }
}

/// Buffered line-oriented reader over one entry's decompressed bytes.
pub type EntryReader = BufReader<Box<dyn Read + Send>>;

/// An opened index container.
///
/// Holds the source and the ordered entry list for the duration of a parse
/// session. The underlying file is closed when the last clone of the
/// archive handle is dropped.
#[derive(Debug)]
pub struct IndexArchive<R: ReadAt> {
    reader: Arc<R>,
    entries: Vec<EntryInfo>,
}

impl IndexArchive<LocalFileReader> {
    /// Open an index archive from a local path.
    pub async fn open(path: &Path) -> Result<Self, ArchiveOpenError> {
        let reader = LocalFileReader::new(path)?;
        Self::with_reader(Arc::new(reader)).await
    }
}

impl<R: ReadAt> IndexArchive<R> {
    /// Open an index archive over any positional-read source.
    pub async fn with_reader(reader: Arc<R>) -> Result<Self, ArchiveOpenError> {
        let (eocd, eocd_offset) = find_eocd(reader.as_ref()).await?;
        if eocd.spans_disks() {
            return Err(ArchiveOpenError::Unsupported(
                "multi-disk archives are not supported".to_string(),
            ));
        }

        let (directory_offset, directory_size, total_entries) = if eocd.needs_zip64() {
            let eocd64 = read_zip64(reader.as_ref(), eocd_offset).await?;
            (
                eocd64.directory_offset,
                eocd64.directory_size,
                eocd64.total_entries,
            )
        } else {
            (
                eocd.directory_offset as u64,
                eocd.directory_size as u64,
                eocd.total_entries as u64,
            )
        };

        if directory_offset.saturating_add(directory_size) > reader.size() {
            return Err(ArchiveOpenError::Invalid("truncated central directory"));
        }

        let mut directory = vec![0u8; directory_size as usize];
        read_exact_at(reader.as_ref(), directory_offset, &mut directory).await?;

        let mut cursor = Cursor::new(directory.as_slice());
        let mut entries = Vec::with_capacity(total_entries as usize);
        for _ in 0..total_entries {
            entries.push(parse_entry(&mut cursor)?);
        }
        debug!("opened index archive with {} entries", entries.len());

        Ok(Self { reader, entries })
    }

    /// Entries in central directory order.
    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    /// Open a line reader over one entry's decompressed bytes.
    ///
    /// Failures here are scoped to the entry; the archive stays usable.
    pub async fn entry_reader(&self, entry: &EntryInfo) -> Result<EntryReader, EntryError> {
        let offset = self
            .data_offset(entry)
            .await
            .map_err(|source| EntryError::Open {
                name: entry.name.clone(),
                source,
            })?;

        let mut data = vec![0u8; entry.compressed_size as usize];
        read_exact_at(self.reader.as_ref(), offset, &mut data)
            .await
            .map_err(|source| EntryError::Open {
                name: entry.name.clone(),
                source,
            })?;

        let raw: Box<dyn Read + Send> = match entry.compression {
            Compression::Stored => Box::new(Cursor::new(data)),
            Compression::Deflate => Box::new(DeflateDecoder::new(Cursor::new(data))),
            Compression::Unsupported(method) => {
                return Err(EntryError::Compression {
                    name: entry.name.clone(),
                    method,
                });
            }
        };
        Ok(BufReader::new(raw))
    }

    /// Locate the start of an entry's data from its local file header.
    ///
    /// The local header repeats the name and extra field with lengths that
    /// may differ from the central directory's, so it has to be read.
    async fn data_offset(&self, entry: &EntryInfo) -> io::Result<u64> {
        let mut header = [0u8; LOCAL_HEADER_SIZE];
        read_exact_at(self.reader.as_ref(), entry.header_offset, &mut header).await?;
        if &header[0..4] != LOCAL_HEADER_SIGNATURE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "bad local file header",
            ));
        }

        let name_len = u16::from_le_bytes([header[26], header[27]]) as u64;
        let extra_len = u16::from_le_bytes([header[28], header[29]]) as u64;
        Ok(entry.header_offset + LOCAL_HEADER_SIZE as u64 + name_len + extra_len)
    }
}

/// Find the End of Central Directory record from the source's tail.
async fn find_eocd<R: ReadAt + ?Sized>(
    reader: &R,
) -> Result<(EndOfCentralDirectory, u64), ArchiveOpenError> {
    let size = reader.size();
    if size < EOCD_SIZE as u64 {
        return Err(ArchiveOpenError::Invalid("too small to be a zip archive"));
    }

    // Fast path: no archive comment, record flush against the end.
    let offset = size - EOCD_SIZE as u64;
    let mut buf = vec![0u8; EOCD_SIZE];
    read_exact_at(reader, offset, &mut buf).await?;
    if &buf[0..4] == EOCD_SIGNATURE && buf[20..22] == [0, 0] {
        return Ok((EndOfCentralDirectory::parse(&buf)?, offset));
    }

    // A comment pushes the record inward; search backwards through the
    // window it could occupy.
    let window = (MAX_COMMENT_SIZE + EOCD_SIZE as u64).min(size);
    let start = size - window;
    let mut buf = vec![0u8; window as usize];
    read_exact_at(reader, start, &mut buf).await?;

    for i in (0..buf.len() - EOCD_SIZE).rev() {
        if &buf[i..i + 4] == EOCD_SIGNATURE {
            // A real record's comment length reaches exactly to the end.
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EOCD_SIZE {
                let eocd = EndOfCentralDirectory::parse(&buf[i..i + EOCD_SIZE])?;
                return Ok((eocd, start + i as u64));
            }
        }
    }

    Err(ArchiveOpenError::Invalid("no end of central directory"))
}

/// Read the zip64 EOCD via its locator.
async fn read_zip64<R: ReadAt + ?Sized>(
    reader: &R,
    eocd_offset: u64,
) -> Result<Zip64EndOfCentralDirectory, ArchiveOpenError> {
    let locator_offset = eocd_offset
        .checked_sub(ZIP64_LOCATOR_SIZE as u64)
        .ok_or(ArchiveOpenError::Invalid("too small for zip64 locator"))?;
    let mut buf = vec![0u8; ZIP64_LOCATOR_SIZE];
    read_exact_at(reader, locator_offset, &mut buf).await?;
    let locator = Zip64Locator::parse(&buf)?;
    if locator.total_disks > 1 {
        return Err(ArchiveOpenError::Unsupported(
            "multi-disk archives are not supported".to_string(),
        ));
    }

    let mut buf = vec![0u8; ZIP64_EOCD_SIZE];
    read_exact_at(reader, locator.eocd64_offset, &mut buf).await?;
    Zip64EndOfCentralDirectory::parse(&buf)
}

/// Parse one central directory file header.
fn parse_entry(cursor: &mut Cursor<&[u8]>) -> Result<EntryInfo, ArchiveOpenError> {
    let mut signature = [0u8; 4];
    cursor.read_exact(&mut signature)?;
    if signature != CENTRAL_HEADER_SIGNATURE {
        return Err(ArchiveOpenError::Invalid("bad central directory header"));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let compression = Compression::from_code(cursor.read_u16::<LittleEndian>()?);
    let _mod_time = cursor.read_u16::<LittleEndian>()?;
    let _mod_date = cursor.read_u16::<LittleEndian>()?;
    let _crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>()?;
    let extra_len = cursor.read_u16::<LittleEndian>()?;
    let comment_len = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut header_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name_bytes = vec![0u8; name_len as usize];
    cursor.read_exact(&mut name_bytes)?;
    // Entry names in the wild are not always UTF-8; take what we can.
    let name = String::from_utf8_lossy(&name_bytes).to_string();
    let is_directory = name.ends_with('/');

    // Zip64 sizes and offsets live in extra field 0x0001, present only for
    // the header fields that are saturated.
    let extra_end = cursor.position() + extra_len as u64;
    while cursor.position() + 4 <= extra_end {
        let field_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;
        if field_id == 0x0001 {
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if header_offset == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                header_offset = cursor.read_u64::<LittleEndian>()?;
            }
            break;
        }
        cursor.set_position(cursor.position() + field_size as u64);
    }
    cursor.set_position(extra_end + comment_len as u64);

    Ok(EntryInfo {
        name,
        compression,
        compressed_size,
        uncompressed_size,
        header_offset,
        is_directory,
    })
}
