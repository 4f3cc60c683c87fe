//! Generate seed corpus for fuzzing

use flate2::Compression;
use packfs::ContainerWriter;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_container_scan";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    // Seed 1: Empty container (end record only)
    {
        let path = format!("{}/seed_empty.zip", corpus_dir);
        ContainerWriter::create(&path)?.finish()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 2: Single stored file
    {
        let path = format!("{}/seed_single_stored.zip", corpus_dir);
        let mut writer = ContainerWriter::create(&path)?;
        writer.add_stored("test.txt", b"Hello, World!")?;
        writer.finish()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 3: Multiple deflated files
    {
        let path = format!("{}/seed_multi.zip", corpus_dir);
        let mut writer = ContainerWriter::create(&path)?;
        writer.add_entry("file1.txt", b"First file", Compression::best())?;
        writer.add_entry("file2.txt", b"Second file", Compression::best())?;
        writer.add_entry("dir/file3.txt", b"Third file in directory", Compression::best())?;
        writer.finish()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 4: Sealed payload
    {
        let path = format!("{}/seed_sealed.zip", corpus_dir);
        let cipher = packfs::Cipher::new(b"seed");
        let sealed = packfs::payload::seal(&b"sealed seed data ".repeat(100), Some(&cipher))?;
        let mut writer = ContainerWriter::create(&path)?;
        writer.add_stored("sealed.bin", &sealed)?;
        writer.finish()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 5: Empty file (zero bytes)
    {
        let path = format!("{}/seed_zero_length.zip", corpus_dir);
        let mut writer = ContainerWriter::create(&path)?;
        writer.add_entry("empty.txt", b"", Compression::best())?;
        writer.finish()?;
        println!("✓ Generated: {}", path);
    }

    println!("\nGenerated 5 seed files in {}", corpus_dir);
    Ok(())
}
