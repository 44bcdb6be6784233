//! Binary entry point: print every record in the configured index.
//!
//! Reads the config from the user's home directory (creating a default one
//! on first run), parses the index it points at, and prints each record's
//! author and title followed by a processed count. Config and archive-open
//! failures abort; everything below that is best effort.

use std::fmt::Write;

use anyhow::Result;

use inpxcat::{Config, IndexParser};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load(None)?;
    let parser = IndexParser::new(&config.library_path, &config.index_filename)?;
    let mut session = parser.parse().await?;

    let mut out = String::new();
    let mut count = 0usize;
    while let Some(record) = session.next_record().await {
        writeln!(out, "{} {}", record.author, record.title)?;
        count += 1;
    }
    if let Some(err) = session.take_error() {
        eprintln!("index was read only partially: {err}");
    }

    print!("{out}");
    println!("done, processed: {count}");
    Ok(())
}
