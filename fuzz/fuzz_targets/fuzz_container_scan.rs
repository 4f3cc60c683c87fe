#![no_main]

use libfuzzer_sys::fuzz_target;
use packfs::{scan_container, EntrySource, PackedLoader, WritableArchive};
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Skip inputs shorter than an end record
    if data.len() < 22 {
        return;
    }

    // Write fuzz data to temporary file
    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };

    if temp_file.write_all(data).is_err() {
        return;
    }

    if temp_file.flush().is_err() {
        return;
    }

    let path = temp_file.path();

    // Scanning should never panic
    let entries = match scan_container(path) {
        Ok(entries) => entries,
        Err(_) => return, // Expected for invalid data
    };

    // Reading every entry should never panic
    for entry in &entries {
        if let Ok(mut source) = EntrySource::open(path, entry.locator) {
            let mut buf = [0u8; 4096];
            while source.read(&mut buf) > 0 {}
        }
    }

    // Loader and archive lookups should never panic
    let loader = PackedLoader::new(path, "");
    for name in loader.files() {
        let _ = loader.length(name);
        let _ = loader.open(name).read_to_vec();
    }
    let _ = loader.exists("");
    let _ = loader.exists("../../../etc/passwd");

    let mut archive = WritableArchive::new(path);
    let _ = archive.file_count();
    let _ = archive.file_at(0);
});
