//! Loader and mount table tests
//!
//! Fixtures under tests/data were written by a standard ZIP tool:
//! - hello_stored.zip: one stored entry "x" containing "hello"
//! - assets.zip: a directory entry, a deflated image, a stored text file,
//!   a sealed (zlib + keystream, key "secret") payload and one entry
//!   outside the "assets/" prefix

use packfs::{
    scan_container, ArchiveIndex, Cipher, DirectoryLoader, Loader, MountConfig, PackedLoader,
    Vfs, VfsConfig,
};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn sealed_plain_text() -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog.\n".repeat(40)
}

#[test]
fn test_directory_loader_resolves_under_prefix() {
    let root = tempfile::tempdir().unwrap();
    let assets = root.path().join("assets");
    fs::create_dir_all(assets.join("img")).unwrap();

    let prefix = format!("{}/assets", root.path().display());
    let loader = DirectoryLoader::new(&prefix);

    assert_eq!(
        loader.resolve("img/a.png"),
        Some(format!("{}/assets/img/a.png", root.path().display()))
    );
    assert!(!loader.exists("img/a.png"));

    fs::write(assets.join("img/a.png"), b"png bytes").unwrap();
    assert!(loader.exists("img/a.png"));
    assert_eq!(loader.length("img/a.png"), 9);
    assert_eq!(loader.open("img/a.png").read_to_vec(), b"png bytes");
}

#[test]
fn test_directory_loader_relative_prefix() {
    let loader = DirectoryLoader::new("assets/");
    assert_eq!(loader.prefix(), "assets/");
    assert_eq!(loader.resolve("img/a.png").as_deref(), Some("assets/img/a.png"));
}

#[test]
fn test_stored_entry_reads_exactly() {
    let loader = PackedLoader::new(fixture("hello_stored.zip"), "");
    assert!(loader.exists("x"));
    assert_eq!(loader.length("x"), 5);

    let mut source = loader.open("x");
    let mut buf = [0u8; 5];
    assert_eq!(source.read(&mut buf), 5);
    assert_eq!(&buf, b"hello");
    assert_eq!(source.read(&mut buf), 0);
}

#[test]
fn test_packed_loader_matches_direct_scan() {
    let container = fixture("assets.zip");
    let loader = PackedLoader::new(&container, "assets");

    // Reference table from a direct scan, independent of the loader
    let mut reference = HashMap::new();
    for entry in scan_container(&container).unwrap() {
        if let Some(name) = entry.display_name().strip_prefix("assets/") {
            reference.insert(name.to_string(), entry.uncompressed_size());
        }
    }

    assert_eq!(reference.len(), 4);
    for (name, size) in &reference {
        assert!(loader.exists(name), "missing {}", name);
        assert_eq!(loader.length(name), *size, "length of {}", name);
    }
    assert_eq!(loader.files(), ["", "img/a.png", "Readme.TXT", "sealed.bin"]);
    assert!(!loader.exists("skip.txt"));
    assert!(!loader.exists("other/skip.txt"));
}

#[test]
fn test_packed_loader_lookup_ignores_case_and_separator() {
    let loader = PackedLoader::new(fixture("assets.zip"), "assets/");
    assert!(loader.exists("readme.txt"));
    assert!(loader.exists("IMG\\A.PNG"));
    assert_eq!(loader.open("README.txt").read_to_vec(), b"read me\n");
}

#[test]
fn test_packed_loader_inflates_deflated_entry() {
    let loader = PackedLoader::new(fixture("assets.zip"), "assets");
    let expected: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
    assert_eq!(loader.length("img/a.png"), 1024);
    assert_eq!(loader.open("img/a.png").read_to_vec(), expected);
}

#[test]
fn test_packed_loader_miss_reads_empty() {
    let loader = PackedLoader::new(fixture("assets.zip"), "assets");
    let mut source = loader.open("img/b.png");
    assert!(source.is_empty_source());
    assert_eq!(source.read(&mut [0u8; 16]), 0);
    assert_eq!(loader.resolve("img/a.png"), None);
}

#[test]
fn test_unreadable_container_mounts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.zip");
    fs::write(&path, b"this is not a container").unwrap();

    let loader = PackedLoader::new(&path, "");
    assert!(loader.files().is_empty());
    assert!(!loader.exists("anything"));
}

#[test]
fn test_sealed_payload_through_pipeline() {
    let loader = Loader::packed(fixture("assets.zip"), "assets");
    let cipher = Cipher::new(b"secret");

    // Raw bytes are the sealed payload as stored
    assert_eq!(loader.open("sealed.bin").read_to_vec().len(), 68);

    let plain = loader
        .open_with("sealed.bin", Some(&cipher), true)
        .read_to_vec();
    assert_eq!(plain, sealed_plain_text());

    // Small caller reads produce the same bytes
    let mut source = loader.open_with("sealed.bin", Some(&cipher), true);
    let mut chunked = Vec::new();
    let mut buf = [0u8; 13];
    loop {
        let n = source.read(&mut buf);
        if n == 0 {
            break;
        }
        chunked.extend_from_slice(&buf[..n]);
    }
    assert_eq!(chunked, plain);
}

#[test]
fn test_sealed_payload_wrong_key_does_not_inflate() {
    let loader = Loader::packed(fixture("assets.zip"), "assets");
    let cipher = Cipher::new(b"not the key");
    let out = loader
        .open_with("sealed.bin", Some(&cipher), true)
        .read_to_vec();
    assert_ne!(out, sealed_plain_text());
}

#[test]
fn test_index_from_fixture_entries() {
    let entries = scan_container(fixture("assets.zip")).unwrap();
    let index = ArchiveIndex::from_entries(&entries, b"other/");
    assert_eq!(index.names(), ["skip.txt"]);
    assert_eq!(index.lookup("SKIP.TXT").map(|e| e.size), Some(11));
}

#[test]
fn test_vfs_first_mount_wins() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("Readme.TXT"), b"override").unwrap();

    let mut vfs = Vfs::new();
    let loose = vfs.mount_directory(root.path().to_str().unwrap());
    vfs.mount_packed(fixture("assets.zip"), "assets");

    assert_eq!(vfs.open("Readme.TXT").read_to_vec(), b"override");
    assert_eq!(vfs.length("img/a.png"), 1024);
    assert!(vfs.resolve("Readme.TXT").is_some());
    assert_eq!(vfs.resolve("img/a.png"), None);

    vfs.unmount(loose);
    assert_eq!(vfs.open("Readme.TXT").read_to_vec(), b"read me\n");
    assert_eq!(vfs.len(), 1);
}

#[test]
fn test_vfs_from_config() {
    let config = VfsConfig::from_toml_str(&format!(
        "[[mounts]]\nkind = \"packed\"\ncontainer = {:?}\nprefix = \"assets\"\n",
        fixture("assets.zip").display().to_string()
    ))
    .unwrap();
    assert!(matches!(config.mounts[0], MountConfig::Packed { .. }));

    let vfs = Vfs::from_config(&config);
    let cipher = Cipher::new(b"secret");
    assert!(vfs.exists("sealed.bin"));
    assert_eq!(
        vfs.open_with("sealed.bin", Some(&cipher), true).read_to_vec(),
        sealed_plain_text()
    );
    assert!(vfs.open_with("missing.bin", Some(&cipher), true).is_empty_source());
}
