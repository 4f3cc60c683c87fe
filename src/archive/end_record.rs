use crate::archive::format::{read_bytes, read_u16, read_u32, ZIP64_MARKER};
use crate::error::{PackError, Result};
use std::io::{Read, Seek, SeekFrom, Write};

/// End of central directory signature ("PK\x05\x06")
pub const END_RECORD_SIGNATURE: u32 = 0x0605_4b50;

/// Fixed part of the end record in bytes
pub const END_RECORD_SIZE: usize = 22;

/// Longest trailing comment the record can announce
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

/// End of Central Directory Record
///
/// Sits at the end of the container, optionally followed by a comment.
/// Readers locate it by scanning backwards from the end of the file.
///
/// Structure (22 bytes + comment):
/// - Signature: 0x06054b50 (4 bytes)
/// - Disk number, directory start disk: uint16 each
/// - Entries on this disk, total entries: uint16 each
/// - Central directory size: uint32
/// - Central directory offset: uint32
/// - Comment length: uint16, then comment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndRecord {
    pub disk_number: u16,
    pub directory_disk: u16,
    pub entries_on_disk: u16,
    pub total_entries: u16,
    pub central_directory_size: u32,
    pub central_directory_offset: u32,
    pub comment: Vec<u8>,
}

impl EndRecord {
    /// Create an end record for a single-disk container
    pub fn new(total_entries: u16, central_directory_offset: u32, central_directory_size: u32) -> Self {
        Self {
            disk_number: 0,
            directory_disk: 0,
            entries_on_disk: total_entries,
            total_entries,
            central_directory_size,
            central_directory_offset,
            comment: Vec::new(),
        }
    }

    pub fn uses_zip64(&self) -> bool {
        self.total_entries == u16::MAX
            || self.central_directory_size == ZIP64_MARKER
            || self.central_directory_offset == ZIP64_MARKER
    }

    /// Write end record to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        if self.comment.len() > MAX_COMMENT_LEN {
            return Err(PackError::InvalidFormat(format!(
                "Container comment too long: {} bytes",
                self.comment.len()
            )));
        }

        writer.write_all(&END_RECORD_SIGNATURE.to_le_bytes())?;
        writer.write_all(&self.disk_number.to_le_bytes())?;
        writer.write_all(&self.directory_disk.to_le_bytes())?;
        writer.write_all(&self.entries_on_disk.to_le_bytes())?;
        writer.write_all(&self.total_entries.to_le_bytes())?;
        writer.write_all(&self.central_directory_size.to_le_bytes())?;
        writer.write_all(&self.central_directory_offset.to_le_bytes())?;
        writer.write_all(&(self.comment.len() as u16).to_le_bytes())?;
        writer.write_all(&self.comment)?;

        Ok(END_RECORD_SIZE + self.comment.len())
    }

    /// Read end record from a reader positioned at its signature
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let signature = read_u32(&mut reader)?;
        if signature != END_RECORD_SIGNATURE {
            return Err(PackError::InvalidFormat(
                "Invalid end of central directory signature".to_string(),
            ));
        }

        let disk_number = read_u16(&mut reader)?;
        let directory_disk = read_u16(&mut reader)?;
        let entries_on_disk = read_u16(&mut reader)?;
        let total_entries = read_u16(&mut reader)?;
        let central_directory_size = read_u32(&mut reader)?;
        let central_directory_offset = read_u32(&mut reader)?;
        let comment_len = read_u16(&mut reader)?;
        let comment = read_bytes(&mut reader, comment_len as usize)?;

        Ok(Self {
            disk_number,
            directory_disk,
            entries_on_disk,
            total_entries,
            central_directory_size,
            central_directory_offset,
            comment,
        })
    }

    /// Locate and read the end record of a container
    ///
    /// Returns the record and its absolute offset. The search covers the last
    /// `22 + 65535` bytes and accepts the candidate nearest the end whose
    /// comment length reaches exactly to end of file.
    pub fn locate<R: Read + Seek>(mut reader: R) -> Result<(Self, u64)> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        if file_len < END_RECORD_SIZE as u64 {
            return Err(PackError::InvalidFormat(format!(
                "Container too small: {} bytes",
                file_len
            )));
        }

        let window = file_len.min((END_RECORD_SIZE + MAX_COMMENT_LEN) as u64);
        let window_start = file_len - window;
        reader.seek(SeekFrom::Start(window_start))?;
        let tail = read_bytes(&mut reader, window as usize)?;

        let signature = END_RECORD_SIGNATURE.to_le_bytes();
        for pos in (0..=tail.len() - END_RECORD_SIZE).rev() {
            if tail[pos..pos + 4] != signature {
                continue;
            }
            let comment_len = u16::from_le_bytes([tail[pos + 20], tail[pos + 21]]) as usize;
            if pos + END_RECORD_SIZE + comment_len != tail.len() {
                continue;
            }
            let record = Self::read_from(&tail[pos..])?;
            return Ok((record, window_start + pos as u64));
        }

        Err(PackError::InvalidFormat(
            "End of central directory record not found".to_string(),
        ))
    }
}
