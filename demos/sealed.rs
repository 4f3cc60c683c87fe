/// Example of storing a compressed and encrypted payload
///
/// Run with: cargo run --example sealed
use packfs::{payload, Cipher, Loader, WritableArchive};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== packfs Sealed Payload Example ===\n");

    let cipher = Cipher::new(b"example key");
    let plain = b"Level data that should not be readable in the container. ".repeat(20);

    // Seal: zlib at maximum level, then keystream encode
    let sealed = payload::seal(&plain, Some(&cipher))?;
    println!(
        "1. Sealed {} bytes into {} bytes",
        plain.len(),
        sealed.len()
    );

    let mut archive = WritableArchive::new("example_sealed.zip");
    archive.write("levels/one.bin", &sealed)?;
    println!("   ✓ Stored as levels/one.bin");

    // Open through decrypt then inflate
    let loader = Loader::packed("example_sealed.zip", "levels");
    let restored = loader.open_with("one.bin", Some(&cipher), true).read_to_vec();
    println!("\n2. Restored {} bytes", restored.len());
    assert_eq!(restored, plain);

    // A different key gives garbage, not an error
    let wrong = Cipher::new(b"wrong key");
    let garbage = loader.open_with("one.bin", Some(&wrong), true).read_to_vec();
    println!("   With the wrong key: {} bytes", garbage.len());

    println!("\n✓ Example complete!");
    Ok(())
}
