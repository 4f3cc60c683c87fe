//! Composable read-only byte sources
//!
//! Every loader hands out a [`ByteSource`]. A base source (disk file, archive
//! entry, memory, or empty) can be wrapped by a decrypting and/or inflating
//! decorator without the caller knowing which layers are present:
//!
//! ```text
//! raw | entry  ->  decrypt (optional)  ->  inflate (optional)
//! ```
//!
//! `read` returns the number of bytes produced; `0` means the stream is
//! exhausted or has failed, and the two are not distinguished here. Failures
//! are logged where they happen.

mod decrypt;
mod inflate;

pub use decrypt::DecryptSource;
pub use inflate::{InflateSource, STAGING_BUFFER_SIZE};

use crate::archive::EntrySource;
use crate::cipher::Cipher;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Closed set of byte source variants
///
/// Decorators own the source they wrap. The cipher used by a decrypt layer is
/// borrowed for `'k` and must outlive the source.
#[derive(Debug)]
pub enum ByteSource<'k> {
    /// Loose file on disk
    Raw(RawSource),
    /// Entry inside a ZIP container
    Entry(EntrySource),
    /// Bytes already in memory
    Memory(MemorySource),
    /// zlib inflate over another source
    Inflate(Box<InflateSource<'k>>),
    /// Keystream decryption over another source
    Decrypt(Box<DecryptSource<'k>>),
    /// Always exhausted
    Empty,
}

impl<'k> ByteSource<'k> {
    /// Open a disk file; a missing file yields a source that reads nothing
    pub fn raw<P: AsRef<Path>>(path: P) -> Self {
        ByteSource::Raw(RawSource::open(path))
    }

    pub fn memory(data: Vec<u8>) -> Self {
        ByteSource::Memory(MemorySource::new(data))
    }

    pub fn empty() -> Self {
        ByteSource::Empty
    }

    /// Wrap this source in a zlib inflate layer
    pub fn inflate(self) -> Self {
        ByteSource::Inflate(Box::new(InflateSource::new(self)))
    }

    /// Wrap this source in a decrypt layer starting at stream offset 0
    pub fn decrypt(self, cipher: &'k Cipher) -> Self {
        ByteSource::Decrypt(Box::new(DecryptSource::new(self, cipher)))
    }

    /// Produce up to `buf.len()` bytes; `0` signals end of stream
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        match self {
            ByteSource::Raw(source) => source.read(buf),
            ByteSource::Entry(source) => source.read(buf),
            ByteSource::Memory(source) => source.read(buf),
            ByteSource::Inflate(source) => source.read(buf),
            ByteSource::Decrypt(source) => source.read(buf),
            ByteSource::Empty => 0,
        }
    }

    /// Drain the source into a vector
    pub fn read_to_vec(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = ByteSource::read(self, &mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        out
    }

    pub fn is_empty_source(&self) -> bool {
        matches!(self, ByteSource::Empty)
    }
}

impl Read for ByteSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(ByteSource::read(self, buf))
    }
}

/// Read from `reader` until `buf` is full or the reader is exhausted
///
/// Errors end the stream: they are logged and reported as the bytes read so
/// far, and `failed` is set so later calls return 0.
pub(crate) fn fill_from<R: Read>(reader: &mut R, buf: &mut [u8], failed: &mut bool) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Read failed, ending stream: {}", e);
                *failed = true;
                break;
            }
        }
    }
    filled
}

/// Loose disk file
#[derive(Debug)]
pub struct RawSource {
    file: Option<File>,
}

impl RawSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                debug!("Cannot open {}: {}", path.display(), e);
                None
            }
        };
        Self { file }
    }

    /// Whether the file was opened successfully and has not failed since
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        let mut failed = false;
        let n = fill_from(file, buf, &mut failed);
        if failed {
            self.file = None;
        }
        n
    }
}

/// In-memory buffer, optionally handed out in bounded chunks
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<u8>,
    position: usize,
    max_chunk: usize,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            position: 0,
            max_chunk: usize::MAX,
        }
    }

    /// Never return more than `max_chunk` bytes per read
    pub fn with_max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk.max(1);
        self
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.remaining()).min(self.max_chunk);
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        n
    }
}
