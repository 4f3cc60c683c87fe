use crate::archive::end_record::EndRecord;
use crate::archive::format::{
    CentralDirectoryEntry, CompressionMethod, DosDateTime, FLAG_UTF8, VERSION_MADE_BY,
    VERSION_NEEDED,
};
use crate::archive::local_entry::LocalEntryHeader;
use crate::archive::reader::read_directory;
use crate::error::{PackError, Result};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Most entries a container without ZIP64 records can list
const MAX_ENTRIES: usize = u16::MAX as usize - 1;

/// Appending writer for ZIP containers
///
/// New entries overwrite the old central directory, and the directory plus end
/// record are rewritten after every entry. The file on disk is therefore a
/// complete container between calls, and a reader opened at any point sees
/// every entry written so far.
pub struct ContainerWriter {
    file: File,
    path: PathBuf,
    entries: Vec<CentralDirectoryEntry>,
    directory_offset: u64,
    comment: Vec<u8>,
}

impl ContainerWriter {
    /// Create a new, empty container (truncating any existing file)
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        debug!("Creating container {}", path.display());
        let mut writer = Self {
            file,
            path: path.to_path_buf(),
            entries: Vec::new(),
            directory_offset: 0,
            comment: Vec::new(),
        };
        writer.write_directory()?;
        Ok(writer)
    }

    /// Open an existing container and position after its last entry
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let (end, entries) = read_directory(BufReader::new(&mut file))?;

        debug!(
            "Appending to container {} with {} entries",
            path.display(),
            entries.len()
        );
        Ok(Self {
            file,
            path: path.to_path_buf(),
            entries: entries.into_iter().map(|entry| entry.record).collect(),
            directory_offset: u64::from(end.central_directory_offset),
            comment: end.comment,
        })
    }

    /// Append to the container if it can be parsed, otherwise start a new one
    pub fn append_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            match Self::append(path) {
                Ok(writer) => return Ok(writer),
                Err(e) => warn!("Cannot append to {}, recreating: {}", path.display(), e),
            }
        }
        Self::create(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Add a deflated entry; returns the number of uncompressed bytes written
    pub fn add_entry(&mut self, name: &str, data: &[u8], level: Compression) -> Result<usize> {
        let mut encoder = DeflateEncoder::new(Vec::new(), level);
        encoder
            .write_all(data)
            .map_err(|e| PackError::CompressionFailed(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| PackError::CompressionFailed(e.to_string()))?;

        self.write_entry(
            name,
            data,
            &compressed,
            CompressionMethod::Deflated,
            DosDateTime::now(),
        )
    }

    /// Add an entry without compression
    pub fn add_stored(&mut self, name: &str, data: &[u8]) -> Result<usize> {
        self.write_entry(
            name,
            data,
            data,
            CompressionMethod::Stored,
            DosDateTime::now(),
        )
    }

    fn write_entry(
        &mut self,
        name: &str,
        data: &[u8],
        payload: &[u8],
        method: CompressionMethod,
        modified: DosDateTime,
    ) -> Result<usize> {
        if self.entries.len() >= MAX_ENTRIES {
            return Err(PackError::Zip64Unsupported);
        }
        let too_large = |size: usize| PackError::EntryTooLarge {
            name: name.to_string(),
            size: size as u64,
        };
        let uncompressed_size = u32::try_from(data.len()).map_err(|_| too_large(data.len()))?;
        let compressed_size = u32::try_from(payload.len()).map_err(|_| too_large(payload.len()))?;
        let local_header_offset =
            u32::try_from(self.directory_offset).map_err(|_| PackError::Zip64Unsupported)?;

        let flags = if name.is_ascii() { 0 } else { FLAG_UTF8 };
        let crc32 = crc32fast::hash(data);
        let header = LocalEntryHeader {
            version_needed: VERSION_NEEDED,
            flags,
            compression: method as u16,
            modified,
            crc32,
            compressed_size,
            uncompressed_size,
            name: name.as_bytes().to_vec(),
            extra: Vec::new(),
        };

        self.file.seek(SeekFrom::Start(self.directory_offset))?;
        let mut out = BufWriter::new(&mut self.file);
        let header_len = header.write_to(&mut out)?;
        out.write_all(payload)?;
        out.flush()?;
        drop(out);

        self.directory_offset += (header_len + payload.len()) as u64;
        self.entries.push(CentralDirectoryEntry {
            version_made_by: VERSION_MADE_BY,
            version_needed: VERSION_NEEDED,
            flags,
            compression: method as u16,
            modified,
            crc32,
            compressed_size,
            uncompressed_size,
            disk_start: 0,
            internal_attributes: 0,
            external_attributes: 0,
            local_header_offset,
            name: header.name,
            extra: Vec::new(),
            comment: Vec::new(),
        });
        self.write_directory()?;

        debug!(
            "Wrote {} ({} -> {} bytes) to {}",
            name,
            data.len(),
            payload.len(),
            self.path.display()
        );
        Ok(data.len())
    }

    /// Rewrite the central directory and end record after the last entry
    fn write_directory(&mut self) -> Result<()> {
        let directory_offset =
            u32::try_from(self.directory_offset).map_err(|_| PackError::Zip64Unsupported)?;

        self.file.seek(SeekFrom::Start(self.directory_offset))?;
        let mut out = BufWriter::new(&mut self.file);
        let mut directory_size = 0usize;
        for entry in &self.entries {
            directory_size += entry.write_to(&mut out)?;
        }
        let directory_size =
            u32::try_from(directory_size).map_err(|_| PackError::Zip64Unsupported)?;

        let mut end = EndRecord::new(self.entries.len() as u16, directory_offset, directory_size);
        end.comment = self.comment.clone();
        end.write_to(&mut out)?;
        out.flush()?;
        drop(out);

        let end_of_container = self.file.stream_position()?;
        self.file.set_len(end_of_container)?;
        Ok(())
    }

    /// Flush the container to stable storage and close it
    pub fn finish(self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

impl std::fmt::Debug for ContainerWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerWriter")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .field("directory_offset", &self.directory_offset)
            .finish()
    }
}
