//! 624-word Mersenne-Twister generator driving the keystream

const STATE_WORDS: usize = 624;
const SHIFT: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

#[inline]
fn twist(u: u32, v: u32) -> u32 {
    let mixed = ((u & UPPER_MASK) | (v & LOWER_MASK)) >> 1;
    if v & 1 != 0 {
        mixed ^ MATRIX_A
    } else {
        mixed
    }
}

/// Tempered 32-bit word generator
#[derive(Clone)]
pub(crate) struct Generator {
    state: Box<[u32; STATE_WORDS]>,
    next: usize,
}

impl Generator {
    /// Seed the state table; the first `next_u32` call twists it
    pub(crate) fn new(seed: u32) -> Self {
        let mut state = Box::new([0u32; STATE_WORDS]);
        state[0] = seed;
        for i in 1..STATE_WORDS {
            let prev = state[i - 1];
            state[i] = 0x6c07_8965u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self {
            state,
            next: STATE_WORDS,
        }
    }

    pub(crate) fn next_u32(&mut self) -> u32 {
        if self.next >= STATE_WORDS {
            self.regenerate();
        }
        let mut word = self.state[self.next];
        self.next += 1;

        word ^= word >> 11;
        word ^= (word << 7) & 0x9d2c_5680;
        word ^= (word << 15) & 0xefc6_0000;
        word ^= word >> 18;
        word
    }

    /// Recompute all 624 words in three regions
    fn regenerate(&mut self) {
        let s = &mut self.state;
        // Words whose partner 397 ahead has not been rewritten yet
        for i in 0..STATE_WORDS - SHIFT {
            s[i] = s[i + SHIFT] ^ twist(s[i], s[i + 1]);
        }
        // Partners wrap around to already rewritten words
        for i in STATE_WORDS - SHIFT..STATE_WORDS - 1 {
            s[i] = s[i + SHIFT - STATE_WORDS] ^ twist(s[i], s[i + 1]);
        }
        // Last word pairs with the rewritten first word
        let last = STATE_WORDS - 1;
        s[last] = s[SHIFT - 1] ^ twist(s[last], s[0]);
        self.next = 0;
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}
