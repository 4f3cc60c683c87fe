use super::ByteSource;
use crate::cipher::{Cipher, StreamPosition};

/// Keystream decrypt decorator
///
/// Each read pulls raw bytes from upstream and decodes them in place. The
/// decorator carries the stream position across reads, so the bytes come out
/// exactly as one whole-stream [`Cipher::decode`] would produce them.
#[derive(Debug)]
pub struct DecryptSource<'k> {
    upstream: ByteSource<'k>,
    cipher: &'k Cipher,
    position: StreamPosition,
}

impl<'k> DecryptSource<'k> {
    pub fn new(upstream: ByteSource<'k>, cipher: &'k Cipher) -> Self {
        Self::resume(upstream, cipher, StreamPosition::start())
    }

    /// Decrypt an upstream that is already positioned mid-stream
    pub fn resume(upstream: ByteSource<'k>, cipher: &'k Cipher, position: StreamPosition) -> Self {
        Self {
            upstream,
            cipher,
            position,
        }
    }

    pub fn position(&self) -> StreamPosition {
        self.position
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = self.upstream.read(buf);
        self.cipher.decode_at(&mut self.position, &mut buf[..n]);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_decrypts_across_small_reads() {
        let cipher = Cipher::new(b"decorator");
        let plain: Vec<u8> = (0..777u32).map(|i| (i * 7) as u8).collect();
        let mut sealed = plain.clone();
        cipher.encode(&mut sealed);

        let upstream = ByteSource::Memory(MemorySource::new(sealed).with_max_chunk(5));
        let mut source = DecryptSource::new(upstream, &cipher);
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = source.read(&mut buf);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }

        assert_eq!(out, plain);
        assert_eq!(source.position().offset(), 777);
    }

    #[test]
    fn test_cipher_shared_by_two_sources() {
        let cipher = Cipher::new(b"shared");
        let mut sealed = b"same payload".to_vec();
        cipher.encode(&mut sealed);

        let mut first = ByteSource::memory(sealed.clone()).decrypt(&cipher);
        let mut second = ByteSource::memory(sealed).decrypt(&cipher);
        assert_eq!(first.read_to_vec(), b"same payload");
        assert_eq!(second.read_to_vec(), b"same payload");
    }
}
