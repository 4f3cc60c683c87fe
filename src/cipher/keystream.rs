//! Block cache of generated keystream words
//!
//! Words are generated in blocks of [`KEYSTREAM_BLOCK_WORDS`] and kept for the
//! lifetime of the cipher. The cache never grows past [`MAX_KEYSTREAM_BLOCKS`];
//! word indices wrap at [`KEYSTREAM_PERIOD_WORDS`], so the keystream repeats
//! with that period.

use super::generator::Generator;
use tracing::trace;

/// Words per cached block
pub const KEYSTREAM_BLOCK_WORDS: usize = 1 << 12;

/// Upper bound on cached blocks
pub const MAX_KEYSTREAM_BLOCKS: usize = 1 << 12;

/// Keystream period in 32-bit words
pub const KEYSTREAM_PERIOD_WORDS: u64 = (KEYSTREAM_BLOCK_WORDS * MAX_KEYSTREAM_BLOCKS) as u64;

type Block = [u32; KEYSTREAM_BLOCK_WORDS];

/// Map a word index onto its `(block, word)` slot, wrapping at the period
pub fn keystream_slot(word_index: u64) -> (usize, usize) {
    let wrapped = (word_index % KEYSTREAM_PERIOD_WORDS) as usize;
    (wrapped / KEYSTREAM_BLOCK_WORDS, wrapped % KEYSTREAM_BLOCK_WORDS)
}

/// Blocks needed to hold `words` keystream words, clamped to the cache ceiling
pub fn blocks_for_words(words: u64) -> usize {
    let clamped = words.min(KEYSTREAM_PERIOD_WORDS) as usize;
    clamped.div_ceil(KEYSTREAM_BLOCK_WORDS)
}

#[derive(Debug)]
pub(crate) struct Keystream {
    generator: Generator,
    blocks: Vec<Box<Block>>,
}

impl Keystream {
    pub(crate) fn new(seed: u32) -> Self {
        Self {
            generator: Generator::new(seed),
            blocks: Vec::new(),
        }
    }

    /// Append blocks until at least `words` words are cached
    pub(crate) fn enlarge(&mut self, words: u64) {
        let wanted = blocks_for_words(words);
        if wanted <= self.blocks.len() {
            return;
        }
        trace!(
            "Growing keystream cache from {} to {} blocks",
            self.blocks.len(),
            wanted
        );
        self.blocks.reserve(wanted - self.blocks.len());
        while self.blocks.len() < wanted {
            let mut block = Box::new([0u32; KEYSTREAM_BLOCK_WORDS]);
            for word in block.iter_mut() {
                *word = self.generator.next_u32();
            }
            self.blocks.push(block);
        }
    }

    /// Cached word at `word_index`; the caller must have enlarged far enough
    #[inline]
    pub(crate) fn word(&self, word_index: u64) -> u32 {
        let (block, word) = keystream_slot(word_index);
        self.blocks[block][word]
    }

    pub(crate) fn cached_blocks(&self) -> usize {
        self.blocks.len()
    }
}
