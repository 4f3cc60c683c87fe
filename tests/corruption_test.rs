//! Corruption handling
//!
//! Damaged containers must never panic. Parsing reports errors; the loader
//! and archive surfaces degrade to empty results.

use flate2::Compression;
use packfs::{scan_container, ContainerWriter, PackError, PackedLoader, WritableArchive};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Helper: Create a valid test container
fn create_test_container() -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let mut writer = ContainerWriter::create(temp_file.path()).unwrap();
    writer.add_stored("test.txt", b"Hello, World!").unwrap();
    writer
        .add_entry("data.bin", &vec![0xAB; 1024], Compression::best())
        .unwrap();
    writer.finish().unwrap();
    temp_file
}

/// Helper: Corrupt bytes at specific offset
fn corrupt_byte_at(path: &Path, offset: u64, new_value: u8) {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(&[new_value]).unwrap();
}

/// Helper: Truncate file at specific offset
fn truncate_at(path: &Path, new_length: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(new_length).unwrap();
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}

#[test]
fn test_corrupted_end_record_signature() {
    let temp_file = create_test_container();
    let path = temp_file.path();
    corrupt_byte_at(path, file_len(path) - 22, b'X');

    match scan_container(path) {
        Err(PackError::InvalidFormat(_)) => {} // Expected
        other => panic!("Expected InvalidFormat, got: {:?}", other),
    }

    let loader = PackedLoader::new(path, "");
    assert!(!loader.exists("test.txt"));
    assert!(loader.open("test.txt").is_empty_source());
}

#[test]
fn test_truncated_central_directory() {
    let temp_file = create_test_container();
    let path = temp_file.path();
    // Cut into the middle of the directory: the end record disappears
    truncate_at(path, file_len(path) - 40);

    assert!(scan_container(path).is_err());
    let mut archive = WritableArchive::new(path);
    assert_eq!(archive.file_count(), 0);
    assert_eq!(archive.read("test.txt", &mut [0u8; 8]), 0);
}

#[test]
fn test_corrupted_local_header_reads_empty() {
    let temp_file = create_test_container();
    let path = temp_file.path();
    // First local header starts at offset 0
    corrupt_byte_at(path, 0, 0x00);

    // The directory is intact, so the entry is still listed
    let loader = PackedLoader::new(path, "");
    assert!(loader.exists("test.txt"));
    assert_eq!(loader.length("test.txt"), 13);

    // Opening fails on the local header and degrades to an empty source
    let mut source = loader.open("test.txt");
    assert!(source.is_empty_source());
    assert_eq!(source.read(&mut [0u8; 16]), 0);
}

#[test]
fn test_corrupted_stored_data_is_still_served() {
    let temp_file = create_test_container();
    let path = temp_file.path();
    // Stored data follows the 30-byte header and the 8-byte name
    corrupt_byte_at(path, 30 + 8, b'J');

    // CRC mismatch is logged at end of entry, bytes are returned as stored
    let loader = PackedLoader::new(path, "");
    assert_eq!(loader.open("test.txt").read_to_vec(), b"Jello, World!");
}

#[test]
fn test_corrupted_deflate_stream_ends_early() {
    let temp_file = create_test_container();
    let path = temp_file.path();
    let entries = scan_container(path).unwrap();
    let data_offset = u64::from(entries[1].record.local_header_offset) + 30 + 8;

    for offset in data_offset..data_offset + 4 {
        corrupt_byte_at(path, offset, 0xFF);
    }

    let loader = PackedLoader::new(path, "");
    let data = loader.open("data.bin").read_to_vec();
    assert_ne!(data, vec![0xAB; 1024]);
}

#[test]
fn test_unsupported_method_reads_empty() {
    let temp_file = create_test_container();
    let path = temp_file.path();
    let entries = scan_container(path).unwrap();
    // Compression method lives 10 bytes into the directory record
    let method_offset = entries[0].locator.directory_offset() + 10;
    corrupt_byte_at(path, method_offset, 14);

    let loader = PackedLoader::new(path, "");
    assert!(loader.exists("test.txt"));
    assert!(loader.open("test.txt").is_empty_source());
}

#[test]
fn test_encrypted_flag_reads_empty() {
    let temp_file = create_test_container();
    let path = temp_file.path();
    let entries = scan_container(path).unwrap();
    // General purpose flags live 8 bytes into the directory record
    corrupt_byte_at(path, entries[1].locator.directory_offset() + 8, 0x01);

    let mut archive = WritableArchive::new(path);
    assert!(archive.has("data.bin"));
    assert_eq!(archive.read("data.bin", &mut [0u8; 8]), 0);
    assert_eq!(archive.read_to_vec("test.txt"), b"Hello, World!");
}

#[test]
fn test_empty_and_tiny_files() {
    let temp_file = NamedTempFile::new().unwrap();
    assert!(scan_container(temp_file.path()).is_err());

    std::fs::write(temp_file.path(), b"PK\x05\x06").unwrap();
    assert!(scan_container(temp_file.path()).is_err());
    assert!(PackedLoader::new(temp_file.path(), "").files().is_empty());
}
