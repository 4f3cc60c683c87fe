//! Read-write view of a single container
//!
//! Reads go through a lazily built [`ArchiveIndex`]; every write leaves the
//! index dirty so the next query re-enumerates the container and sees the new
//! entry. Writing the same name twice stores two entries: `file_count` counts
//! both and lookups return the later one.

use crate::archive::{ContainerWriter, EntrySource};
use crate::error::Result;
use crate::index::{ArchiveIndex, IndexEntry, IndexState};
use crate::path_hash::PathHash;
use crate::source::ByteSource;
use flate2::Compression;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Container that can be queried and appended to
///
/// The instance assumes it is the only writer of its file. The appender is
/// opened by the first write and kept until the archive is dropped.
#[derive(Debug)]
pub struct WritableArchive {
    path: PathBuf,
    index: IndexState,
    writer: Option<ContainerWriter>,
}

impl WritableArchive {
    /// Attach to a container path; nothing is read or created until used
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            index: IndexState::Dirty,
            writer: None,
        }
    }

    pub fn container_path(&self) -> &Path {
        &self.path
    }

    fn index(&mut self) -> &ArchiveIndex {
        let path = &self.path;
        self.index.get_or_rebuild(|| ArchiveIndex::build(path, b""))
    }

    fn entry(&mut self, hash: PathHash) -> Option<IndexEntry> {
        self.index().get(hash).copied()
    }

    /// Number of entries, duplicate names counted separately
    pub fn file_count(&mut self) -> usize {
        self.index().len()
    }

    /// Name of the entry at `index` in container order
    pub fn file_at(&mut self, index: usize) -> Option<String> {
        self.index().name_at(index).map(str::to_string)
    }

    pub fn has(&mut self, path: &str) -> bool {
        self.has_hash(PathHash::of(path))
    }

    pub fn has_hash(&mut self, hash: PathHash) -> bool {
        self.entry(hash).is_some()
    }

    pub fn length(&mut self, path: &str) -> u64 {
        self.length_hash(PathHash::of(path))
    }

    pub fn length_hash(&mut self, hash: PathHash) -> u64 {
        self.entry(hash).map_or(0, |entry| entry.size)
    }

    /// Read the start of an entry into `buf`; returns the bytes read
    pub fn read(&mut self, path: &str, buf: &mut [u8]) -> usize {
        self.read_hash(PathHash::of(path), buf)
    }

    pub fn read_hash(&mut self, hash: PathHash, buf: &mut [u8]) -> usize {
        self.open_hash(hash).read(buf)
    }

    /// Read a whole entry; a missing entry reads as empty
    pub fn read_to_vec(&mut self, path: &str) -> Vec<u8> {
        self.open_hash(PathHash::of(path)).read_to_vec()
    }

    fn open_hash(&mut self, hash: PathHash) -> ByteSource<'static> {
        let Some(entry) = self.entry(hash) else {
            return ByteSource::empty();
        };
        match EntrySource::open(&self.path, entry.locator) {
            Ok(source) => ByteSource::Entry(source),
            Err(e) => {
                warn!("Cannot open entry {} in {}: {}", hash, self.path.display(), e);
                ByteSource::empty()
            }
        }
    }

    /// Append an entry at maximum compression; returns the bytes written
    pub fn write(&mut self, path: &str, data: &[u8]) -> Result<usize> {
        let writer = match self.writer.as_mut() {
            Some(writer) => writer,
            None => self
                .writer
                .insert(ContainerWriter::append_or_create(&self.path)?),
        };
        let result = writer.add_entry(path, data, Compression::best());
        self.index.invalidate();
        result
    }
}
