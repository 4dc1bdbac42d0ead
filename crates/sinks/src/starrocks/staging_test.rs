//! Tests for staging files

use std::fs;
use std::io::{ErrorKind, Write};

use tempfile::TempDir;

use super::staging::StagingFile;

#[test]
fn test_file_name_format() {
    assert_eq!(StagingFile::file_name("blocks", 1_700_000_000_123, 0), "blocks_1700000000123");
    assert_eq!(StagingFile::file_name("blocks", 1_700_000_000_123, 2), "blocks_1700000000123_2");
}

#[test]
fn test_create_in_dir() {
    let dir = TempDir::new().unwrap();
    let file = StagingFile::create(dir.path(), "blocks").unwrap();

    assert!(file.path().exists());
    assert!(file.path().starts_with(dir.path()));
    assert_eq!(file.table(), "blocks");
    assert_eq!(
        file.path().file_name().unwrap().to_str().unwrap(),
        format!("blocks_{}", file.created_at_ms())
    );
    assert_eq!(file.rows(), 0);
    assert!(!file.is_closed());
}

#[test]
fn test_create_never_reuses_existing_name() {
    let dir = TempDir::new().unwrap();
    let files: Vec<StagingFile> = (0..5)
        .map(|_| StagingFile::create(dir.path(), "transactions").unwrap())
        .collect();

    let mut paths: Vec<_> = files.iter().map(|f| f.path().to_path_buf()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 5);
}

#[test]
fn test_create_skips_leftover_file() {
    let dir = TempDir::new().unwrap();
    let first = StagingFile::create(dir.path(), "blocks").unwrap();

    // Occupy every name a second file could get in the same millisecond
    for attempt in 0..3 {
        let name = StagingFile::file_name("blocks", first.created_at_ms(), attempt);
        let _ = fs::write(dir.path().join(name), b"leftover");
    }

    let second = StagingFile::create(dir.path(), "blocks").unwrap();
    assert_ne!(first.path(), second.path());
    assert_eq!(fs::read(second.path()).unwrap().len(), 0);
}

#[test]
fn test_create_missing_dir_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    assert!(StagingFile::create(&missing, "blocks").is_err());
}

#[test]
fn test_write_and_close() {
    let dir = TempDir::new().unwrap();
    let mut file = StagingFile::create(dir.path(), "blocks").unwrap();

    file.write_all(b"1,0xabc\n").unwrap();
    file.mark_row();
    file.write_all(b"2,0xdef\n").unwrap();
    file.mark_row();
    file.close();

    assert!(file.is_closed());
    assert_eq!(file.rows(), 2);
    assert_eq!(file.bytes(), 16);
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "1,0xabc\n2,0xdef\n");
}

#[test]
fn test_close_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut file = StagingFile::create(dir.path(), "blocks").unwrap();
    file.write_all(b"x\n").unwrap();

    file.close();
    file.close();
    assert!(file.flush().is_ok());
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "x\n");
}

#[test]
fn test_write_after_close_fails() {
    let dir = TempDir::new().unwrap();
    let mut file = StagingFile::create(dir.path(), "blocks").unwrap();
    file.close();

    let err = file.write_all(b"late\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BrokenPipe);
}

#[test]
fn test_drop_flushes() {
    let dir = TempDir::new().unwrap();
    let path = {
        let mut file = StagingFile::create(dir.path(), "blocks").unwrap();
        file.write_all(b"buffered\n").unwrap();
        file.path().to_path_buf()
    };
    assert_eq!(fs::read_to_string(path).unwrap(), "buffered\n");
}

#[test]
fn test_remove() {
    let dir = TempDir::new().unwrap();
    let mut file = StagingFile::create(dir.path(), "blocks").unwrap();
    file.write_all(b"x\n").unwrap();

    file.remove().unwrap();
    assert!(!file.path().exists());
    assert!(file.is_closed());
}
