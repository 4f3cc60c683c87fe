//! XXH32 non-cryptographic hash
//!
//! Used to derive the keystream seed from key bytes and exposed for callers
//! that need a fast 32-bit fingerprint of arbitrary data.

const PRIME32_1: u32 = 0x9E37_79B1;
const PRIME32_2: u32 = 0x85EB_CA77;
const PRIME32_3: u32 = 0xC2B2_AE3D;
const PRIME32_4: u32 = 0x27D4_EB2F;
const PRIME32_5: u32 = 0x1656_67B1;

#[inline]
fn round(acc: u32, lane: u32) -> u32 {
    acc.wrapping_add(lane.wrapping_mul(PRIME32_2))
        .rotate_left(13)
        .wrapping_mul(PRIME32_1)
}

#[inline]
fn read_lane(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Hash `data` with the given seed
pub fn xxh32(data: &[u8], seed: u32) -> u32 {
    let mut input = data;

    let mut hash = if input.len() >= 16 {
        let mut acc = [
            seed.wrapping_add(PRIME32_1).wrapping_add(PRIME32_2),
            seed.wrapping_add(PRIME32_2),
            seed,
            seed.wrapping_sub(PRIME32_1),
        ];
        while input.len() >= 16 {
            for (i, lane) in acc.iter_mut().enumerate() {
                *lane = round(*lane, read_lane(&input[i * 4..]));
            }
            input = &input[16..];
        }
        acc[0]
            .rotate_left(1)
            .wrapping_add(acc[1].rotate_left(7))
            .wrapping_add(acc[2].rotate_left(12))
            .wrapping_add(acc[3].rotate_left(18))
    } else {
        seed.wrapping_add(PRIME32_5)
    };

    // The length is folded in modulo 2^32
    hash = hash.wrapping_add(data.len() as u32);

    while input.len() >= 4 {
        hash = hash
            .wrapping_add(read_lane(input).wrapping_mul(PRIME32_3))
            .rotate_left(17)
            .wrapping_mul(PRIME32_4);
        input = &input[4..];
    }

    for &byte in input {
        hash = hash
            .wrapping_add(u32::from(byte).wrapping_mul(PRIME32_5))
            .rotate_left(11)
            .wrapping_mul(PRIME32_1);
    }

    hash ^= hash >> 15;
    hash = hash.wrapping_mul(PRIME32_2);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(PRIME32_3);
    hash ^= hash >> 16;
    hash
}
