//! Parse sessions over an index archive.
//!
//! One worker task per catalog entry, all fanning into a single record
//! channel. The consumer drains the channel; it closes only after every
//! worker has finished, and the archive handle is dropped strictly after
//! that point. Cancellation is a watch signal observed at every line
//! boundary and inside every delivery.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use log::{debug, error, warn};
use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::JoinSet;

use crate::error::{ArchiveOpenError, EntryError};
use crate::io::ReadAt;
use crate::zip::{EntryInfo, IndexArchive};

use super::record::{DELIMITER, Record, decode_record};

/// Records buffered between workers and the consumer before senders block.
///
/// Senders never drop a record: once the buffer is full they wait until the
/// consumer catches up or the session is cancelled.
const RECORD_BUFFER: usize = 64;

type FailureRegister = Arc<Mutex<Option<EntryError>>>;

/// Entry point for parsing an INPX index out of a library directory.
#[derive(Debug)]
pub struct IndexParser {
    basedir: PathBuf,
    index_filename: String,
    delimiter: char,
}

impl IndexParser {
    /// Create a parser for `index_filename` inside the library directory.
    ///
    /// Fails if the library path cannot be read or is not a directory.
    pub fn new(
        basedir: impl Into<PathBuf>,
        index_filename: impl Into<String>,
    ) -> Result<Self, ArchiveOpenError> {
        let basedir = basedir.into();
        let meta = std::fs::metadata(&basedir)?;
        if !meta.is_dir() {
            return Err(ArchiveOpenError::NotADirectory(basedir));
        }

        Ok(Self {
            basedir,
            index_filename: index_filename.into(),
            delimiter: DELIMITER,
        })
    }

    /// Override the field separator. Rarely needed outside tests; real
    /// catalogs use [`DELIMITER`].
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Open the index archive and start streaming records from it.
    ///
    /// This is the only point where a failure aborts the whole parse; every
    /// error past here is scoped to an entry or a line.
    pub async fn parse(&self) -> Result<ParseSession, ArchiveOpenError> {
        let path = self.basedir.join(&self.index_filename);
        let archive = IndexArchive::open(&path).await?;
        Ok(ParseSession::start(archive, self.delimiter))
    }
}

/// One end-to-end parse of a single index archive.
///
/// Dropping the session cancels outstanding workers and releases the
/// archive once they finish.
#[derive(Debug)]
pub struct ParseSession {
    records: mpsc::Receiver<Record>,
    cancel: watch::Sender<bool>,
    failure: FailureRegister,
}

impl ParseSession {
    /// Start a session over an already-opened archive.
    pub fn start<R: ReadAt + 'static>(archive: IndexArchive<R>, delimiter: char) -> Self {
        let (records_tx, records_rx) = mpsc::channel(RECORD_BUFFER);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let failure: FailureRegister = Arc::new(Mutex::new(None));
        let permits = Arc::new(Semaphore::new(worker_limit()));
        let archive = Arc::new(archive);

        let mut workers = JoinSet::new();
        for entry in archive.entries().iter().filter(|e| e.is_file()).cloned() {
            workers.spawn(run_entry_worker(
                Arc::clone(&archive),
                entry,
                delimiter,
                records_tx.clone(),
                cancel_rx.clone(),
                Arc::clone(&failure),
                Arc::clone(&permits),
            ));
        }
        // The workers now hold the only senders; the channel closes when
        // the last of them finishes, however it finishes.
        drop(records_tx);
        tokio::spawn(supervise(workers, archive));

        Self {
            records: records_rx,
            cancel: cancel_tx,
            failure,
        }
    }

    /// Next decoded record, or `None` once every worker has terminated and
    /// the stream is closed.
    pub async fn next_record(&mut self) -> Option<Record> {
        self.records.recv().await
    }

    /// Ask every worker to stop. Idempotent. Workers exit within one line
    /// or one delivery step.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Take the most recent entry-level failure, if any was registered.
    /// Meant to be polled after the record stream has drained.
    pub fn take_error(&self) -> Option<EntryError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Simultaneously running entry workers are capped at the machine's
/// parallelism; archives with many entries queue on the semaphore.
fn worker_limit() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
}

/// Read one entry line by line, decoding and delivering as it goes.
///
/// Failure scope is the contract here. An unreadable entry is skipped and a
/// malformed line is dropped without a trace; only a scan error mid-entry
/// lands in the register, and it ends this worker alone.
async fn run_entry_worker<R: ReadAt + 'static>(
    archive: Arc<IndexArchive<R>>,
    entry: EntryInfo,
    delimiter: char,
    records: mpsc::Sender<Record>,
    mut cancel: watch::Receiver<bool>,
    failure: FailureRegister,
    permits: Arc<Semaphore>,
) {
    use std::io::BufRead;

    let _permit = tokio::select! {
        _ = cancel.changed() => return,
        permit = permits.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return,
        },
    };

    let reader = match archive.entry_reader(&entry).await {
        Ok(reader) => reader,
        Err(err) => {
            warn!("skipping entry: {err}");
            return;
        }
    };

    for line in reader.lines() {
        if *cancel.borrow() {
            return;
        }

        let line = match line {
            Ok(line) => line,
            Err(source) => {
                register_failure(
                    &failure,
                    EntryError::Read {
                        name: entry.name.clone(),
                        source,
                    },
                );
                return;
            }
        };

        let record = match decode_record(&line, delimiter) {
            Ok(record) => record,
            // A malformed line must not stop ingestion of the rest.
            Err(_) => continue,
        };

        tokio::select! {
            _ = cancel.changed() => return,
            sent = records.send(record) => {
                if sent.is_err() {
                    // Consumer hung up; nothing left to deliver to.
                    return;
                }
            }
        }
    }
}

fn register_failure(register: &FailureRegister, err: EntryError) {
    warn!("{err}");
    *register.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
}

/// Join every worker, then release the archive handle: the container is
/// closed exactly once, strictly after the last worker has finished.
async fn supervise<R: ReadAt + 'static>(mut workers: JoinSet<()>, archive: Arc<IndexArchive<R>>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            error!("entry worker failed: {err}");
        }
    }
    debug!("all entry workers finished, closing index archive");
    drop(archive);
}
