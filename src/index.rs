//! Hash-keyed index over container entries
//!
//! The index maps the [`PathHash`] of each entry name (with the mount prefix
//! stripped) to its uncompressed size and [`EntryLocator`], and remembers the
//! names in container order for iteration. Two names with the same hash keep
//! only the entry enumerated last.

use crate::archive::{scan_container, ContainerEntry, EntryLocator};
use crate::path_hash::PathHash;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Size and position of one indexed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub size: u64,
    pub locator: EntryLocator,
}

/// Lookup table built by enumerating a container
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    names: Vec<String>,
    entries: HashMap<PathHash, IndexEntry>,
}

impl ArchiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the entries whose raw name starts with `prefix`
    pub fn from_entries<'a, I>(entries: I, prefix: &[u8]) -> Self
    where
        I: IntoIterator<Item = &'a ContainerEntry>,
    {
        let mut index = Self::new();
        for entry in entries {
            let Some(name) = entry.name_bytes().strip_prefix(prefix) else {
                continue;
            };
            index.insert(
                name,
                IndexEntry {
                    size: entry.uncompressed_size(),
                    locator: entry.locator,
                },
            );
        }
        index
    }

    /// Enumerate a container and index it
    ///
    /// A container that cannot be read yields an empty index.
    pub fn build<P: AsRef<Path>>(container: P, prefix: &[u8]) -> Self {
        let container = container.as_ref();
        match scan_container(container) {
            Ok(entries) => {
                let index = Self::from_entries(&entries, prefix);
                debug!(
                    "Indexed {} of {} entries in {}",
                    index.names.len(),
                    entries.len(),
                    container.display()
                );
                index
            }
            Err(e) => {
                warn!("Cannot index {}: {}", container.display(), e);
                Self::new()
            }
        }
    }

    /// Add an entry; returns the entry it displaced when the hash was taken
    pub fn insert(&mut self, name: &[u8], entry: IndexEntry) -> Option<IndexEntry> {
        self.names.push(String::from_utf8_lossy(name).into_owned());
        self.entries.insert(PathHash::of(name), entry)
    }

    pub fn get(&self, hash: PathHash) -> Option<&IndexEntry> {
        self.entries.get(&hash)
    }

    pub fn lookup<P: AsRef<[u8]> + ?Sized>(&self, path: &P) -> Option<&IndexEntry> {
        self.get(PathHash::of(path))
    }

    /// Indexed names in container order, duplicates included
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of indexed names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of distinct hashes
    pub fn distinct_hashes(&self) -> usize {
        self.entries.len()
    }
}

/// Lazily rebuilt index
///
/// Writes move the state to `Dirty`; the next query rebuilds the whole index
/// and moves back to `Clean`.
#[derive(Debug, Clone, Default)]
pub enum IndexState {
    #[default]
    Dirty,
    Clean(ArchiveIndex),
}

impl IndexState {
    pub fn invalidate(&mut self) {
        *self = IndexState::Dirty;
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, IndexState::Dirty)
    }

    /// Return the current index, rebuilding it with `build` when dirty
    pub fn get_or_rebuild<F>(&mut self, build: F) -> &ArchiveIndex
    where
        F: FnOnce() -> ArchiveIndex,
    {
        if let IndexState::Dirty = self {
            *self = IndexState::Clean(build());
        }
        match self {
            IndexState::Clean(index) => index,
            IndexState::Dirty => unreachable!("index state was just rebuilt"),
        }
    }
}
