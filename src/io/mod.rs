//! Positional-read sources for index archives.
//!
//! Zip containers are read from the tail first, so archive sources expose
//! random access rather than sequential streams. Anything implementing
//! [`ReadAt`] can back an archive: a local file here, an in-memory buffer in
//! tests.

mod local;

pub use local::LocalFileReader;

use std::io;

use async_trait::async_trait;

/// Random access reads over an archive source.
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read into `buf` starting at `offset`, returning how many bytes were
    /// read. Short reads are allowed near the end of the source.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Total size of the source in bytes.
    fn size(&self) -> u64;
}

/// Fill `buf` from `offset`, looping over short reads.
///
/// Returns `UnexpectedEof` if the source ends before `buf` is full.
pub(crate) async fn read_exact_at<R: ReadAt + ?Sized>(
    reader: &R,
    offset: u64,
    buf: &mut [u8],
) -> io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read_at(offset + filled as u64, &mut buf[filled..])
            .await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "archive source ended early",
            ));
        }
        filled += n;
    }
    Ok(())
}

#[async_trait]
impl ReadAt for Vec<u8> {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = (offset as usize).min(self.len());
        let end = (start + buf.len()).min(self.len());
        buf[..end - start].copy_from_slice(&self[start..end]);
        Ok(end - start)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}
