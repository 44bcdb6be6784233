//! # inpxcat
//!
//! A concurrent reader for INPX library index archives.
//!
//! An INPX index is a zip container whose entries are plain-text catalogs:
//! one bibliographic record per line, 14 fields joined by a separator byte.
//! This library opens the container, decodes every catalog concurrently,
//! and streams the well-formed records through a single channel. Malformed
//! lines are skipped, broken entries are abandoned without taking the rest
//! of the parse down, and only a completely unreadable archive is fatal.
//!
//! ## Example
//!
//! ```no_run
//! use inpxcat::IndexParser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let parser = IndexParser::new("/srv/books", "library.inpx")?;
//!     let mut session = parser.parse().await?;
//!
//!     while let Some(record) = session.next_record().await {
//!         println!("{} {}", record.author, record.title);
//!     }
//!     if let Some(err) = session.take_error() {
//!         eprintln!("index was read only partially: {err}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod inpx;
pub mod io;
pub mod storage;
pub mod zip;

pub use config::Config;
pub use error::{ArchiveOpenError, DecodeError, EntryError};
pub use inpx::{IndexParser, ParseSession, Record};
pub use io::{LocalFileReader, ReadAt};
pub use storage::Storage;
pub use zip::IndexArchive;
