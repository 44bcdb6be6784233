//! The INPX catalog line format.
//!
//! Each line of a catalog entry is one bibliographic record: 14 fields in a
//! fixed order, joined by a single separator byte. Decoding is pure; it
//! runs concurrently on every entry worker with no shared state.

use crate::error::DecodeError;

/// The INPX field separator.
///
/// Catalogs delimit fields with the ASCII EOT byte, not anything printable.
pub const DELIMITER: char = '\x04';

/// Fields per record; lines with any other count are rejected whole.
pub const FIELD_COUNT: usize = 14;

/// One decoded bibliographic record.
///
/// Field values are kept verbatim from the catalog line: no trimming, no
/// type coercion. Empty fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub author: String,
    pub genre: String,
    pub title: String,
    pub series: String,
    pub series_number: String,
    pub file: String,
    pub size: String,
    pub library_id: String,
    pub deleted_flag: String,
    pub extension: String,
    pub date: String,
    pub language: String,
    pub rating: String,
    pub keywords: String,
}

/// Decode one catalog line into a [`Record`].
///
/// Succeeds only when the line splits into exactly [`FIELD_COUNT`] parts;
/// no partial records are ever produced.
pub fn decode_record(line: &str, delimiter: char) -> Result<Record, DecodeError> {
    let fields: Vec<&str> = line.split(delimiter).collect();
    if fields.len() != FIELD_COUNT {
        return Err(DecodeError {
            found: fields.len(),
        });
    }

    Ok(Record {
        author: fields[0].to_string(),
        genre: fields[1].to_string(),
        title: fields[2].to_string(),
        series: fields[3].to_string(),
        series_number: fields[4].to_string(),
        file: fields[5].to_string(),
        size: fields[6].to_string(),
        library_id: fields[7].to_string(),
        deleted_flag: fields[8].to_string(),
        extension: fields[9].to_string(),
        date: fields[10].to_string(),
        language: fields[11].to_string(),
        rating: fields[12].to_string(),
        keywords: fields[13].to_string(),
    })
}
