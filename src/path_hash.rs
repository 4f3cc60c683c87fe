//! Normalized path fingerprints used as archive lookup keys
//!
//! A path hash is FNV-1a over the path bytes with two normalizations applied
//! byte by byte: `\` becomes `/` and ASCII letters are lowercased. Hashing stops
//! at the first NUL byte. Paths that differ only in case or separator style
//! therefore share a fingerprint.
//!
//! Collisions between distinct names are not resolved anywhere in the crate;
//! the index keeps the last entry built for a given hash.

use std::fmt;

const FNV_OFFSET: u32 = 2166136261;
const FNV_PRIME: u32 = 16777619;

/// Compute the normalized 32-bit fingerprint of a path
pub fn path_hash(path: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET;
    for &byte in path {
        if byte == 0 {
            break;
        }
        let byte = if byte == b'\\' {
            b'/'
        } else {
            byte.to_ascii_lowercase()
        };
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Normalized path fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathHash(u32);

impl PathHash {
    /// Fingerprint a path
    pub fn of<P: AsRef<[u8]> + ?Sized>(path: &P) -> Self {
        Self(path_hash(path.as_ref()))
    }

    /// Wrap a fingerprint computed elsewhere
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for PathHash {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PathHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_offset_basis() {
        assert_eq!(path_hash(b""), FNV_OFFSET);
        assert_eq!(PathHash::of(""), PathHash::from_raw(0x811c9dc5));
    }

    #[test]
    fn test_case_and_separator_invariance() {
        assert_eq!(PathHash::of("A\\B.txt"), PathHash::of("a/b.txt"));
        assert_eq!(PathHash::of("a/b.txt").value(), 0x7d8581a7);
        assert_eq!(
            PathHash::of("Assets\\Img\\A.PNG"),
            PathHash::of("assets/img/a.png")
        );
        assert_ne!(PathHash::of("a/b.txt"), PathHash::of("a/c.txt"));
    }

    #[test]
    fn test_stops_at_nul() {
        assert_eq!(path_hash(b"abc\0def"), path_hash(b"abc"));
        assert_eq!(path_hash(b"\0abc"), FNV_OFFSET);
    }

    #[test]
    fn test_non_ascii_bytes_pass_through() {
        // Only ASCII letters fold; high bytes hash as-is
        assert_ne!(path_hash("É".as_bytes()), path_hash("é".as_bytes()));
    }

    #[test]
    fn test_known_collision_is_accepted() {
        // Two distinct names that share a fingerprint; lookup cannot tell them apart
        assert_eq!(PathHash::of("d/ac2vu.txt"), PathHash::of("d/a1uea.txt"));
        assert_eq!(PathHash::of("d/ac2vu.txt").to_string(), "3553f04d");
    }
}
