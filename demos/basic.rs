/// Basic example demonstrating container writing and mounted reads
///
/// Run with: cargo run --example basic
use packfs::{Vfs, WritableArchive};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== packfs Basic Example ===\n");

    // Write a container
    println!("1. Writing container...");
    write_container()?;

    // Mount it and read back
    println!("\n2. Reading through the mount table...");
    read_container()?;

    println!("\n✓ Example complete!");
    Ok(())
}

fn write_container() -> Result<(), Box<dyn Error>> {
    let mut archive = WritableArchive::new("example_basic.zip");

    archive.write(
        "assets/readme.txt",
        b"This is a readme file for the basic example.",
    )?;
    archive.write("assets/notes.md", b"# Notes\n\nThis is a markdown file.")?;
    archive.write("assets/binary.dat", &[0u8; 1000])?;

    println!("   ✓ Container written: example_basic.zip");
    println!("   Entries:");
    for i in 0..archive.file_count() {
        if let Some(name) = archive.file_at(i) {
            println!("     - {} ({} bytes)", name, archive.length(&name));
        }
    }

    Ok(())
}

fn read_container() -> Result<(), Box<dyn Error>> {
    let mut vfs = Vfs::new();
    // Loose files under ./overrides shadow container entries
    vfs.mount_directory("overrides");
    vfs.mount_packed("example_basic.zip", "assets");

    // Lookups ignore case and separator style
    println!("   README.TXT exists: {}", vfs.exists("README.TXT"));

    let text = vfs.open("readme.txt").read_to_vec();
    println!("   Content: {}", String::from_utf8_lossy(&text));

    let missing = vfs.open("missing.txt").read_to_vec();
    println!("   missing.txt reads {} bytes", missing.len());

    Ok(())
}
