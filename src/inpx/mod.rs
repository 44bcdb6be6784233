//! Streaming decoder for INPX library indexes.
//!
//! An index packs per-catalog text entries into a zip container; every line
//! is one 14-field bibliographic record. [`IndexParser`] opens the index
//! and hands back a [`ParseSession`] that streams records from all entries
//! concurrently while tolerating malformed lines and per-entry failures.

mod record;
mod session;

pub use record::{DELIMITER, FIELD_COUNT, Record, decode_record};
pub use session::{IndexParser, ParseSession};
