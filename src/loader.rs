//! Path loaders over loose directories and packed containers
//!
//! Both loaders answer the same four questions about a relative path: does it
//! exist, how long is it, open it as a [`ByteSource`], and which disk path it
//! resolves to. Misses and failures never surface as errors here: they read as
//! `false`, `0`, an empty source, or `None`.

use crate::archive::EntrySource;
use crate::cipher::Cipher;
use crate::index::ArchiveIndex;
use crate::path_hash::PathHash;
use crate::source::ByteSource;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Append a trailing `/` to a non-empty prefix that lacks one
fn normalize_prefix(prefix: &str) -> String {
    let mut prefix = prefix.to_string();
    if !prefix.is_empty() && !prefix.ends_with('/') {
        prefix.push('/');
    }
    prefix
}

/// Apply the optional decrypt and inflate layers to a base source
fn decorate<'k>(base: ByteSource<'k>, key: Option<&'k Cipher>, compressed: bool) -> ByteSource<'k> {
    if base.is_empty_source() {
        return base;
    }
    let source = match key {
        Some(cipher) => base.decrypt(cipher),
        None => base,
    };
    if compressed {
        source.inflate()
    } else {
        source
    }
}

/// Loader over loose files below a directory prefix
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    prefix: String,
}

impl DirectoryLoader {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Disk path of `path` below the prefix (plain concatenation)
    pub fn resolve(&self, path: &str) -> Option<String> {
        Some(format!("{}{}", self.prefix, path))
    }

    fn disk_path(&self, path: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.prefix, path))
    }

    /// Whether the file can be opened for reading
    pub fn exists(&self, path: &str) -> bool {
        File::open(self.disk_path(path)).is_ok()
    }

    pub fn length(&self, path: &str) -> u64 {
        match fs::metadata(self.disk_path(path)) {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => 0,
            Err(e) => {
                debug!("No length for {}{}: {}", self.prefix, path, e);
                0
            }
        }
    }

    pub fn open(&self, path: &str) -> ByteSource<'static> {
        ByteSource::raw(self.disk_path(path))
    }
}

/// Loader over the entries of a ZIP container below an entry prefix
///
/// The index is built once, when the loader is created; later changes to the
/// container are not seen.
#[derive(Debug, Clone)]
pub struct PackedLoader {
    container: PathBuf,
    prefix: String,
    index: ArchiveIndex,
}

impl PackedLoader {
    pub fn new<P: AsRef<Path>>(container: P, prefix: &str) -> Self {
        let container = container.as_ref().to_path_buf();
        let prefix = normalize_prefix(prefix);
        let index = ArchiveIndex::build(&container, prefix.as_bytes());
        Self {
            container,
            prefix,
            index,
        }
    }

    pub fn container(&self) -> &Path {
        &self.container
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Mounted names with the prefix stripped, in container order
    pub fn files(&self) -> &[String] {
        self.index.names()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.index.lookup(path).is_some()
    }

    pub fn length(&self, path: &str) -> u64 {
        self.index.lookup(path).map_or(0, |entry| entry.size)
    }

    pub fn open(&self, path: &str) -> ByteSource<'static> {
        self.open_hash(PathHash::of(path))
    }

    /// Open by a precomputed fingerprint
    pub fn open_hash(&self, hash: PathHash) -> ByteSource<'static> {
        let Some(entry) = self.index.get(hash) else {
            return ByteSource::empty();
        };
        match EntrySource::open(&self.container, entry.locator) {
            Ok(source) => ByteSource::Entry(source),
            Err(e) => {
                warn!(
                    "Cannot open entry {} in {}: {}",
                    hash,
                    self.container.display(),
                    e
                );
                ByteSource::empty()
            }
        }
    }

    /// Entries have no standalone disk path
    pub fn resolve(&self, _path: &str) -> Option<String> {
        None
    }
}

/// Either kind of loader
#[derive(Debug, Clone)]
pub enum Loader {
    Directory(DirectoryLoader),
    Packed(PackedLoader),
}

impl Loader {
    pub fn directory(prefix: &str) -> Self {
        Loader::Directory(DirectoryLoader::new(prefix))
    }

    pub fn packed<P: AsRef<Path>>(container: P, prefix: &str) -> Self {
        Loader::Packed(PackedLoader::new(container, prefix))
    }

    pub fn exists(&self, path: &str) -> bool {
        match self {
            Loader::Directory(loader) => loader.exists(path),
            Loader::Packed(loader) => loader.exists(path),
        }
    }

    pub fn length(&self, path: &str) -> u64 {
        match self {
            Loader::Directory(loader) => loader.length(path),
            Loader::Packed(loader) => loader.length(path),
        }
    }

    pub fn open(&self, path: &str) -> ByteSource<'static> {
        match self {
            Loader::Directory(loader) => loader.open(path),
            Loader::Packed(loader) => loader.open(path),
        }
    }

    /// Open through the optional decrypt and inflate layers
    ///
    /// Data sealed with [`crate::payload::seal`] reads back with the same
    /// cipher and `compressed = true`.
    pub fn open_with<'k>(&self, path: &str, key: Option<&'k Cipher>, compressed: bool) -> ByteSource<'k> {
        decorate(self.open(path), key, compressed)
    }

    pub fn resolve(&self, path: &str) -> Option<String> {
        match self {
            Loader::Directory(loader) => loader.resolve(path),
            Loader::Packed(loader) => loader.resolve(path),
        }
    }
}

impl From<DirectoryLoader> for Loader {
    fn from(loader: DirectoryLoader) -> Self {
        Loader::Directory(loader)
    }
}

impl From<PackedLoader> for Loader {
    fn from(loader: PackedLoader) -> Self {
        Loader::Packed(loader)
    }
}
