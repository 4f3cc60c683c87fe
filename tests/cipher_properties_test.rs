//! Property-based tests for the keystream cipher and the decode pipeline

use packfs::source::MemorySource;
use packfs::{ByteSource, Cipher, StreamPosition};
use proptest::prelude::*;

fn drain(mut source: ByteSource<'_>, chunk: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = source.read(&mut buf);
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    out
}

proptest! {
    /// Fresh instances on both sides decode what was encoded.
    #[test]
    fn roundtrip_with_fresh_instances(
        key in proptest::collection::vec(any::<u8>(), 0..32),
        plain in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let mut data = plain.clone();
        Cipher::new(&key).encode(&mut data);
        Cipher::new(&key).decode(&mut data);
        prop_assert_eq!(data, plain);
    }

    /// Encoding in pieces with a carried position equals one whole encode.
    #[test]
    fn chunked_encode_matches_whole(
        plain in proptest::collection::vec(any::<u8>(), 1..1024),
        cuts in proptest::collection::vec(1usize..64, 1..16),
    ) {
        let cipher = Cipher::new(b"chunks");
        let mut whole = plain.clone();
        cipher.encode(&mut whole);

        let mut pieces = plain.clone();
        let mut position = StreamPosition::start();
        let mut start = 0;
        for cut in cuts.iter().cycle() {
            if start >= pieces.len() {
                break;
            }
            let end = (start + cut).min(pieces.len());
            cipher.encode_at(&mut position, &mut pieces[start..end]);
            start = end;
        }
        prop_assert_eq!(pieces, whole);
        prop_assert_eq!(position.offset(), plain.len() as u64);
    }

    /// The decrypt decorator yields the same bytes for any upstream and caller chunk size.
    #[test]
    fn decrypt_source_independent_of_chunking(
        plain in proptest::collection::vec(any::<u8>(), 0..1500),
        upstream_chunk in 1usize..40,
        caller_chunk in 1usize..40,
    ) {
        let cipher = Cipher::new(b"decorator");
        let mut sealed = plain.clone();
        cipher.encode(&mut sealed);

        let upstream = ByteSource::Memory(MemorySource::new(sealed).with_max_chunk(upstream_chunk));
        prop_assert_eq!(drain(upstream.decrypt(&cipher), caller_chunk), plain);
    }

    /// Flipping one plaintext byte leaves everything before it untouched.
    #[test]
    fn encode_prefix_unaffected_by_later_change(
        plain in proptest::collection::vec(any::<u8>(), 2..512),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let i = index.index(plain.len());
        let cipher = Cipher::new(b"locality");

        let mut original = plain.clone();
        cipher.encode(&mut original);
        let mut changed = plain.clone();
        changed[i] ^= flip;
        cipher.encode(&mut changed);

        prop_assert_eq!(&original[..i], &changed[..i]);
        prop_assert_ne!(original[i], changed[i]);
    }
}

#[test]
fn test_inflate_one_byte_upstream_matches_bulk() {
    let plain = b"inflate me in tiny pieces ".repeat(500);
    let sealed = packfs::payload::seal(&plain, None).unwrap();

    let tiny = ByteSource::Memory(MemorySource::new(sealed.clone()).with_max_chunk(1)).inflate();
    let bulk = ByteSource::memory(sealed).inflate();
    let from_tiny = drain(tiny, 4096);
    assert_eq!(from_tiny, drain(bulk, 4096));
    assert_eq!(from_tiny, plain);
}
