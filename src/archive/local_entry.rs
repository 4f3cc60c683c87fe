use crate::archive::format::{read_bytes, read_u16, read_u32, DosDateTime};
use crate::error::{PackError, Result};
use std::io::{Read, Write};

/// Local file header signature ("PK\x03\x04")
pub const LOCAL_ENTRY_SIGNATURE: u32 = 0x0403_4b50;

/// Fixed part of a local file header in bytes
pub const LOCAL_ENTRY_FIXED_SIZE: usize = 30;

/// Local File Header
///
/// Precedes each entry's data. The central directory is authoritative for
/// sizes and CRC; the local header is read only to find where data starts,
/// since its name and extra field lengths may differ from the directory copy.
///
/// Structure (variable length):
/// - Signature: 0x04034b50 (4 bytes)
/// - Version needed: uint16
/// - Flags: uint16
/// - Compression method: uint16
/// - Modified time, date: uint16 each
/// - CRC32: uint32
/// - Compressed size: uint32
/// - Uncompressed size: uint32
/// - Name length, extra length: uint16 each
/// - Name, extra: variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntryHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression: u16,
    pub modified: DosDateTime,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name: Vec<u8>,
    pub extra: Vec<u8>,
}

impl LocalEntryHeader {
    /// Size of the serialized header, which is also the offset of entry data
    pub fn header_size(&self) -> usize {
        LOCAL_ENTRY_FIXED_SIZE + self.name.len() + self.extra.len()
    }

    /// Write local entry header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        if self.name.len() > u16::MAX as usize {
            return Err(PackError::PathTooLong(self.name.len()));
        }

        writer.write_all(&LOCAL_ENTRY_SIGNATURE.to_le_bytes())?;
        writer.write_all(&self.version_needed.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&self.compression.to_le_bytes())?;
        writer.write_all(&self.modified.time.to_le_bytes())?;
        writer.write_all(&self.modified.date.to_le_bytes())?;
        writer.write_all(&self.crc32.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        writer.write_all(&self.uncompressed_size.to_le_bytes())?;
        writer.write_all(&(self.name.len() as u16).to_le_bytes())?;
        writer.write_all(&(self.extra.len() as u16).to_le_bytes())?;
        writer.write_all(&self.name)?;
        writer.write_all(&self.extra)?;

        Ok(self.header_size())
    }

    /// Read local entry header from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let signature = read_u32(&mut reader)?;
        if signature != LOCAL_ENTRY_SIGNATURE {
            return Err(PackError::InvalidFormat(format!(
                "Invalid local header signature {:08x}",
                signature
            )));
        }

        let version_needed = read_u16(&mut reader)?;
        let flags = read_u16(&mut reader)?;
        let compression = read_u16(&mut reader)?;
        let time = read_u16(&mut reader)?;
        let date = read_u16(&mut reader)?;
        let crc32 = read_u32(&mut reader)?;
        let compressed_size = read_u32(&mut reader)?;
        let uncompressed_size = read_u32(&mut reader)?;
        let name_len = read_u16(&mut reader)?;
        let extra_len = read_u16(&mut reader)?;
        let name = read_bytes(&mut reader, name_len as usize)?;
        let extra = read_bytes(&mut reader, extra_len as usize)?;

        Ok(Self {
            version_needed,
            flags,
            compression,
            modified: DosDateTime { time, date },
            crc32,
            compressed_size,
            uncompressed_size,
            name,
            extra,
        })
    }
}
