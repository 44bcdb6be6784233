//! Container-level tests: opening archives and reading entries.

mod common;

use std::io::BufRead;
use std::sync::Arc;

use inpxcat::error::{ArchiveOpenError, EntryError};
use inpxcat::zip::IndexArchive;

use common::ZipBuilder;

fn lines(reader: impl BufRead) -> Vec<String> {
    reader.lines().collect::<Result<_, _>>().unwrap()
}

#[tokio::test]
async fn lists_entries_in_directory_order() {
    let bytes = ZipBuilder::new()
        .stored("catalog-a.inp", b"one\n")
        .stored("catalog-b.inp", b"two\n")
        .dir("sub/")
        .build();

    let archive = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap();
    let names: Vec<_> = archive.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["catalog-a.inp", "catalog-b.inp", "sub/"]);
    assert!(archive.entries()[0].is_file());
    assert!(!archive.entries()[2].is_file());
}

#[tokio::test]
async fn reads_stored_entry_lines() {
    let bytes = ZipBuilder::new()
        .stored("catalog.inp", b"first line\nsecond line\n")
        .build();

    let archive = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap();
    let reader = archive.entry_reader(&archive.entries()[0]).await.unwrap();
    assert_eq!(lines(reader), ["first line", "second line"]);
}

#[tokio::test]
async fn reads_deflated_entry_lines() {
    let content = b"deflated line one\ndeflated line two\n";
    let bytes = ZipBuilder::new().deflated("catalog.inp", content).build();

    let archive = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap();
    let reader = archive.entry_reader(&archive.entries()[0]).await.unwrap();
    assert_eq!(lines(reader), ["deflated line one", "deflated line two"]);
}

#[tokio::test]
async fn crlf_line_endings_are_stripped() {
    let bytes = ZipBuilder::new()
        .stored("catalog.inp", b"first\r\nsecond\r\n")
        .build();

    let archive = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap();
    let reader = archive.entry_reader(&archive.entries()[0]).await.unwrap();
    assert_eq!(lines(reader), ["first", "second"]);
}

#[tokio::test]
async fn opens_archive_with_trailing_comment() {
    let bytes = ZipBuilder::new()
        .stored("catalog.inp", b"line\n")
        .comment("made by a tool that loves comments")
        .build();

    let archive = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap();
    assert_eq!(archive.entries().len(), 1);
}

#[tokio::test]
async fn garbage_is_not_an_archive() {
    let bytes = b"this is not a zip file, not even close, really".to_vec();
    let err = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap_err();
    assert!(matches!(err, ArchiveOpenError::Invalid(_)));
}

#[tokio::test]
async fn tiny_file_is_not_an_archive() {
    let err = IndexArchive::with_reader(Arc::new(b"PK".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiveOpenError::Invalid(_)));
}

#[tokio::test]
async fn truncated_central_directory_is_fatal() {
    let mut bytes = ZipBuilder::new().stored("catalog.inp", b"line\n").build();
    // Chop out a chunk before the directory; the EOCD offsets now lie.
    bytes.drain(10..30);
    assert!(
        IndexArchive::with_reader(Arc::new(bytes)).await.is_err()
    );
}

#[tokio::test]
async fn unsupported_compression_fails_only_that_entry() {
    let bytes = ZipBuilder::new()
        .exotic("weird.inp", b"whatever\n")
        .stored("plain.inp", b"line\n")
        .build();

    let archive = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap();
    let err = archive
        .entry_reader(&archive.entries()[0])
        .await
        .err()
        .unwrap();
    assert!(matches!(err, EntryError::Compression { method: 14, .. }));

    // The sibling entry is unaffected.
    let reader = archive.entry_reader(&archive.entries()[1]).await.unwrap();
    assert_eq!(lines(reader), ["line"]);
}

#[tokio::test]
async fn corrupt_local_header_fails_only_that_entry() {
    let mut bytes = ZipBuilder::new()
        .stored("broken.inp", b"line\n")
        .stored("fine.inp", b"line\n")
        .build();
    // First local header sits at offset 0; wreck its signature.
    bytes[0] = b'X';

    let archive = IndexArchive::with_reader(Arc::new(bytes)).await.unwrap();
    let err = archive
        .entry_reader(&archive.entries()[0])
        .await
        .err()
        .unwrap();
    assert!(matches!(err, EntryError::Open { .. }));

    let reader = archive.entry_reader(&archive.entries()[1]).await.unwrap();
    assert_eq!(lines(reader), ["line"]);
}
