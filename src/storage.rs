//! Persistent record store.
//!
//! Nothing is written here yet; the handle only proves the database can be
//! reached before a parse starts.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// An open handle to the sqlite store.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open the database at `path`, failing if it cannot be reached.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("can't open database file {}", path.display()))?;
        // Equivalent of a ping: sqlite opens lazily, so force a round trip.
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .context("database ping failed")?;

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
