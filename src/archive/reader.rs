use crate::archive::end_record::EndRecord;
use crate::archive::format::{CentralDirectoryEntry, CompressionMethod};
use crate::archive::local_entry::LocalEntryHeader;
use crate::error::{PackError, Result};
use crate::source::fill_from;
use flate2::bufread::DeflateDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Take};
use std::path::Path;
use tracing::{debug, warn};

/// Physical position of an entry's central directory record
///
/// Reopening an entry from its locator reads one directory record and one
/// local header; the rest of the container is not rescanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryLocator {
    directory_offset: u64,
}

impl EntryLocator {
    pub fn new(directory_offset: u64) -> Self {
        Self { directory_offset }
    }

    pub fn directory_offset(&self) -> u64 {
        self.directory_offset
    }
}

/// One enumerated container entry
#[derive(Debug, Clone)]
pub struct ContainerEntry {
    pub record: CentralDirectoryEntry,
    pub locator: EntryLocator,
}

impl ContainerEntry {
    pub fn name_bytes(&self) -> &[u8] {
        &self.record.name
    }

    pub fn display_name(&self) -> String {
        self.record.display_name()
    }

    pub fn uncompressed_size(&self) -> u64 {
        u64::from(self.record.uncompressed_size)
    }
}

/// Read the central directory of a container and its end record
pub(crate) fn read_directory<R: Read + Seek>(mut reader: R) -> Result<(EndRecord, Vec<ContainerEntry>)> {
    let (end, _) = EndRecord::locate(&mut reader)?;
    if end.uses_zip64() {
        return Err(PackError::Zip64Unsupported);
    }
    if end.disk_number != end.directory_disk || end.entries_on_disk != end.total_entries {
        return Err(PackError::InvalidFormat(
            "Multi-disk containers are not supported".to_string(),
        ));
    }

    let mut offset = u64::from(end.central_directory_offset);
    reader.seek(SeekFrom::Start(offset))?;

    let mut entries = Vec::with_capacity(end.total_entries as usize);
    for _ in 0..end.total_entries {
        let record = CentralDirectoryEntry::read_from(&mut reader)?;
        let size = record.record_size() as u64;
        entries.push(ContainerEntry {
            record,
            locator: EntryLocator::new(offset),
        });
        offset += size;
    }

    Ok((end, entries))
}

/// Enumerate every entry of a container in directory order
pub fn scan_container<P: AsRef<Path>>(path: P) -> Result<Vec<ContainerEntry>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let (_, entries) = read_directory(reader)?;
    debug!("Scanned {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

enum EntryReader {
    Stored(Take<BufReader<File>>),
    Deflated(DeflateDecoder<Take<BufReader<File>>>),
}

/// Streaming reader over one container entry
///
/// Decompression of deflated entries happens inside the source. The CRC-32 is
/// checked once the entry has been read to the end.
pub struct EntrySource {
    reader: Option<EntryReader>,
    name: String,
    hasher: crc32fast::Hasher,
    expected_crc: u32,
    expected_size: u64,
    produced: u64,
}

impl EntrySource {
    /// Seek to the entry's locator and prepare it for reading
    pub fn open<P: AsRef<Path>>(container: P, locator: EntryLocator) -> Result<Self> {
        let mut file = BufReader::new(File::open(container)?);
        file.seek(SeekFrom::Start(locator.directory_offset))?;
        let record = CentralDirectoryEntry::read_from(&mut file)?;

        let name = record.display_name();
        if record.is_encrypted() {
            return Err(PackError::EncryptedEntry(name));
        }
        if record.uses_zip64() {
            return Err(PackError::Zip64Unsupported);
        }
        let method = CompressionMethod::from_u16(record.compression)?;

        // Local name and extra lengths decide where the data starts
        file.seek(SeekFrom::Start(u64::from(record.local_header_offset)))?;
        LocalEntryHeader::read_from(&mut file)?;

        let data = file.take(u64::from(record.compressed_size));
        let reader = match method {
            CompressionMethod::Stored => EntryReader::Stored(data),
            CompressionMethod::Deflated => EntryReader::Deflated(DeflateDecoder::new(data)),
        };

        Ok(Self {
            reader: Some(reader),
            name,
            hasher: crc32fast::Hasher::new(),
            expected_crc: record.crc32,
            expected_size: u64::from(record.uncompressed_size),
            produced: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uncompressed size recorded in the central directory
    pub fn len(&self) -> u64 {
        self.expected_size
    }

    pub fn is_empty(&self) -> bool {
        self.expected_size == 0
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let Some(reader) = self.reader.as_mut() else {
            return 0;
        };

        let mut failed = false;
        let n = match reader {
            EntryReader::Stored(inner) => fill_from(inner, buf, &mut failed),
            EntryReader::Deflated(inner) => fill_from(inner, buf, &mut failed),
        };
        self.hasher.update(&buf[..n]);
        self.produced += n as u64;

        if failed {
            self.reader = None;
        } else if n < buf.len() {
            self.finish();
        }
        n
    }

    fn finish(&mut self) {
        self.reader = None;
        if self.produced != self.expected_size {
            warn!(
                "Entry {} ended after {} of {} bytes",
                self.name, self.produced, self.expected_size
            );
            return;
        }
        let actual = self.hasher.clone().finalize();
        if actual != self.expected_crc {
            warn!(
                "CRC mismatch in {}: expected {:08x}, got {:08x}",
                self.name, self.expected_crc, actual
            );
        }
    }
}

impl std::fmt::Debug for EntrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntrySource")
            .field("name", &self.name)
            .field("size", &self.expected_size)
            .field("produced", &self.produced)
            .field("open", &self.reader.is_some())
            .finish()
    }
}
