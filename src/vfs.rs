//! Ordered mount table over loaders
//!
//! Queries walk the mounts in order and use the first one that has the path,
//! so earlier mounts shadow later ones.

use crate::cipher::Cipher;
use crate::config::{MountConfig, VfsConfig};
use crate::loader::Loader;
use crate::source::ByteSource;
use std::path::Path;
use tracing::debug;

/// Virtual file system made of directory and container mounts
#[derive(Debug, Clone, Default)]
pub struct Vfs {
    mounts: Vec<Loader>,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount everything a configuration lists, in order
    pub fn from_config(config: &VfsConfig) -> Self {
        let mut vfs = Self::new();
        for mount in &config.mounts {
            match mount {
                MountConfig::Directory { prefix } => vfs.mount_directory(prefix),
                MountConfig::Packed { container, prefix } => vfs.mount_packed(container, prefix),
            };
        }
        vfs
    }

    /// Add a loader at the end of the table; returns its mount index
    pub fn mount(&mut self, loader: Loader) -> usize {
        self.mounts.push(loader);
        self.mounts.len() - 1
    }

    pub fn mount_directory(&mut self, prefix: &str) -> usize {
        debug!("Mounting directory {:?}", prefix);
        self.mount(Loader::directory(prefix))
    }

    pub fn mount_packed<P: AsRef<Path>>(&mut self, container: P, prefix: &str) -> usize {
        debug!(
            "Mounting container {} at {:?}",
            container.as_ref().display(),
            prefix
        );
        self.mount(Loader::packed(container, prefix))
    }

    /// Remove the mount at `index`, shifting later mounts down
    pub fn unmount(&mut self, index: usize) -> Option<Loader> {
        if index < self.mounts.len() {
            Some(self.mounts.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    pub fn mounts(&self) -> &[Loader] {
        &self.mounts
    }

    fn find(&self, path: &str) -> Option<&Loader> {
        self.mounts.iter().find(|loader| loader.exists(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    pub fn length(&self, path: &str) -> u64 {
        self.find(path).map_or(0, |loader| loader.length(path))
    }

    pub fn open(&self, path: &str) -> ByteSource<'static> {
        self.find(path)
            .map_or_else(ByteSource::empty, |loader| loader.open(path))
    }

    pub fn open_with<'k>(&self, path: &str, key: Option<&'k Cipher>, compressed: bool) -> ByteSource<'k> {
        self.find(path).map_or_else(ByteSource::empty, |loader| {
            loader.open_with(path, key, compressed)
        })
    }

    /// Disk path from the first mount that has the file and can name one
    pub fn resolve(&self, path: &str) -> Option<String> {
        self.find(path).and_then(|loader| loader.resolve(path))
    }
}
