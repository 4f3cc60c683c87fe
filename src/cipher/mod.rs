//! Keystream cipher with plaintext chaining
//!
//! The keystream is the output of a Mersenne-Twister generator seeded with
//! `xxh32(key, 0x62df340e)`, consumed least-significant byte first. Before a
//! plaintext byte is mixed with the keystream it is XORed with the previous
//! plaintext byte (zero at the start of a stream):
//!
//! ```text
//! c[i] = p[i] ^ p[i-1] ^ k[i]
//! ```
//!
//! Decoding undoes the keystream first and then the chaining. The cipher keeps
//! no stream position of its own; one-shot [`Cipher::encode`] and
//! [`Cipher::decode`] always start at offset 0, and callers that process a
//! stream in pieces carry a [`StreamPosition`] through
//! [`Cipher::encode_at`] / [`Cipher::decode_at`]. Decoding at the wrong
//! position silently yields garbage.
//!
//! # Example
//!
//! ```
//! use packfs::Cipher;
//!
//! let cipher = Cipher::new(b"secret");
//! let mut data = *b"hello world";
//! cipher.encode(&mut data);
//! cipher.decode(&mut data);
//! assert_eq!(&data, b"hello world");
//! ```

mod generator;
mod keystream;

pub use keystream::{
    blocks_for_words, keystream_slot, KEYSTREAM_BLOCK_WORDS, KEYSTREAM_PERIOD_WORDS,
    MAX_KEYSTREAM_BLOCKS,
};

use crate::xxh32::xxh32;
use keystream::Keystream;
use std::cell::RefCell;

/// Seed constant mixed into the key hash
pub const KEY_HASH_SEED: u32 = 0x62df_340e;

const WORD_BYTES: u64 = 4;

/// Position within a cipher stream
///
/// Tracks the byte offset from stream start and the previous plaintext byte,
/// which together fully determine how the next byte is processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamPosition {
    offset: u64,
    previous: u8,
}

impl StreamPosition {
    /// Position at the start of a stream
    pub const fn start() -> Self {
        Self {
            offset: 0,
            previous: 0,
        }
    }

    /// Resume mid-stream, given the plaintext byte preceding `offset`
    pub const fn resume(offset: u64, previous_plain: u8) -> Self {
        Self {
            offset,
            previous: previous_plain,
        }
    }

    /// Rewind to the start of the stream
    pub fn reset(&mut self) {
        *self = Self::start();
    }

    pub const fn offset(&self) -> u64 {
        self.offset
    }

    pub const fn previous(&self) -> u8 {
        self.previous
    }
}

/// Number of cached words needed to cover `len` bytes at `offset`
fn words_needed(offset: u64, len: usize) -> u64 {
    let first = offset / WORD_BYTES;
    let end = (offset + len as u64).div_ceil(WORD_BYTES);
    let span = end - first;
    if span >= KEYSTREAM_PERIOD_WORDS {
        return KEYSTREAM_PERIOD_WORDS;
    }
    let wrapped_end = first % KEYSTREAM_PERIOD_WORDS + span;
    wrapped_end.min(KEYSTREAM_PERIOD_WORDS)
}

/// Keystream cipher instance
///
/// Generated keystream is cached per instance and reused by every call. The
/// cache lives behind a `RefCell`, so an instance can be shared by several
/// readers on one thread but is not `Sync`.
#[derive(Debug)]
pub struct Cipher {
    seed: u32,
    keystream: RefCell<Keystream>,
}

impl Cipher {
    /// Create a cipher from arbitrary key bytes (an empty key is valid)
    pub fn new(key: &[u8]) -> Self {
        Self::with_seed(xxh32(key, KEY_HASH_SEED))
    }

    /// Create a cipher from an already derived 32-bit seed
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            keystream: RefCell::new(Keystream::new(seed)),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of keystream blocks generated so far
    pub fn cached_blocks(&self) -> usize {
        self.keystream.borrow().cached_blocks()
    }

    /// Encode `data` in place as a complete stream starting at offset 0
    pub fn encode(&self, data: &mut [u8]) {
        self.encode_at(&mut StreamPosition::start(), data);
    }

    /// Decode `data` in place as a complete stream starting at offset 0
    pub fn decode(&self, data: &mut [u8]) {
        self.decode_at(&mut StreamPosition::start(), data);
    }

    /// Encode `data` in place at `position` and advance the position
    pub fn encode_at(&self, position: &mut StreamPosition, data: &mut [u8]) {
        let mut previous = position.previous;
        self.apply(position.offset, data, |byte, key| {
            let plain = *byte;
            *byte = plain ^ previous ^ key;
            previous = plain;
        });
        position.offset += data.len() as u64;
        position.previous = previous;
    }

    /// Decode `data` in place at `position` and advance the position
    pub fn decode_at(&self, position: &mut StreamPosition, data: &mut [u8]) {
        let mut previous = position.previous;
        self.apply(position.offset, data, |byte, key| {
            let plain = *byte ^ key ^ previous;
            *byte = plain;
            previous = plain;
        });
        position.offset += data.len() as u64;
        position.previous = previous;
    }

    /// Walk `data` one keystream word at a time, handing each byte its key byte
    fn apply<F>(&self, offset: u64, data: &mut [u8], mut step: F)
    where
        F: FnMut(&mut u8, u8),
    {
        if data.is_empty() {
            return;
        }
        let mut keystream = self.keystream.borrow_mut();
        keystream.enlarge(words_needed(offset, data.len()));

        let mut offset = offset;
        let mut rest = data;
        while !rest.is_empty() {
            let word = keystream.word(offset / WORD_BYTES);
            let lane = (offset % WORD_BYTES) as usize;
            let take = (WORD_BYTES as usize - lane).min(rest.len());
            let (group, tail) = std::mem::take(&mut rest).split_at_mut(take);
            for (n, byte) in group.iter_mut().enumerate() {
                step(byte, (word >> ((lane + n) * 8)) as u8);
            }
            offset += take as u64;
            rest = tail;
        }
    }
}
