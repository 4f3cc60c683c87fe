use crate::error::{PackError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::io::{Read, Write};

/// Central directory file header signature ("PK\x01\x02")
pub const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;

/// Fixed part of a central directory record in bytes
pub const CENTRAL_DIRECTORY_FIXED_SIZE: usize = 46;

/// Version needed to extract deflated entries (2.0)
pub const VERSION_NEEDED: u16 = 20;

/// Version made by: MS-DOS attribute mapping, spec 2.0
pub const VERSION_MADE_BY: u16 = 20;

/// Marker value of 32-bit fields that moved to a ZIP64 extra field
pub const ZIP64_MARKER: u32 = 0xFFFF_FFFF;

/// General purpose flag: entry is encrypted
pub const FLAG_ENCRYPTED: u16 = 1 << 0;

/// General purpose flag: name and comment are UTF-8
pub const FLAG_UTF8: u16 = 1 << 11;

/// Compression methods understood by the container layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    Stored = 0,
    Deflated = 8,
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::Stored),
            8 => Ok(Self::Deflated),
            _ => Err(PackError::UnsupportedCompression(value)),
        }
    }
}

/// MS-DOS packed date and time as stored in ZIP headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// Pack a calendar timestamp; years outside 1980..=2107 are clamped
    pub fn from_naive(stamp: NaiveDateTime) -> Self {
        let year = stamp.year().clamp(1980, 2107) as u16;
        let date = ((year - 1980) << 9) | ((stamp.month() as u16) << 5) | stamp.day() as u16;
        let time = ((stamp.hour() as u16) << 11)
            | ((stamp.minute() as u16) << 5)
            | (stamp.second() as u16 / 2);
        Self { time, date }
    }

    /// Current local wall-clock time
    pub fn now() -> Self {
        Self::from_naive(chrono::Local::now().naive_local())
    }

    /// Unpack into a calendar timestamp, if the fields form a valid date
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        let year = 1980 + i32::from(self.date >> 9);
        let month = u32::from((self.date >> 5) & 0x0F);
        let day = u32::from(self.date & 0x1F);
        let hour = u32::from(self.time >> 11);
        let minute = u32::from((self.time >> 5) & 0x3F);
        let second = u32::from(self.time & 0x1F) * 2;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }
}

/// Central directory record for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryEntry {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression: u16,
    pub modified: DosDateTime,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub disk_start: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub local_header_offset: u32,
    pub name: Vec<u8>,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
}

impl CentralDirectoryEntry {
    /// Entry name for display; invalid UTF-8 is replaced
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    pub fn uses_zip64(&self) -> bool {
        self.compressed_size == ZIP64_MARKER
            || self.uncompressed_size == ZIP64_MARKER
            || self.local_header_offset == ZIP64_MARKER
    }

    /// Size of the serialized record in bytes
    pub fn record_size(&self) -> usize {
        CENTRAL_DIRECTORY_FIXED_SIZE + self.name.len() + self.extra.len() + self.comment.len()
    }

    /// Write record to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        for field in [&self.name, &self.extra, &self.comment] {
            if field.len() > u16::MAX as usize {
                return Err(PackError::PathTooLong(field.len()));
            }
        }

        writer.write_all(&CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes())?;
        writer.write_all(&self.version_made_by.to_le_bytes())?;
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
        writer.write_all(&(self.comment.len() as u16).to_le_bytes())?;
        writer.write_all(&self.disk_start.to_le_bytes())?;
        writer.write_all(&self.internal_attributes.to_le_bytes())?;
        writer.write_all(&self.external_attributes.to_le_bytes())?;
        writer.write_all(&self.local_header_offset.to_le_bytes())?;
        writer.write_all(&self.name)?;
        writer.write_all(&self.extra)?;
        writer.write_all(&self.comment)?;

        Ok(self.record_size())
    }

    /// Read record from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let signature = read_u32(&mut reader)?;
        if signature != CENTRAL_DIRECTORY_SIGNATURE {
            return Err(PackError::InvalidFormat(format!(
                "Invalid central directory signature {:08x}",
                signature
            )));
        }

        let version_made_by = read_u16(&mut reader)?;
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
        let comment_len = read_u16(&mut reader)?;
        let disk_start = read_u16(&mut reader)?;
        let internal_attributes = read_u16(&mut reader)?;
        let external_attributes = read_u32(&mut reader)?;
        let local_header_offset = read_u32(&mut reader)?;

        let name = read_bytes(&mut reader, name_len as usize)?;
        let extra = read_bytes(&mut reader, extra_len as usize)?;
        let comment = read_bytes(&mut reader, comment_len as usize)?;

        Ok(Self {
            version_made_by,
            version_needed,
            flags,
            compression,
            modified: DosDateTime { time, date },
            crc32,
            compressed_size,
            uncompressed_size,
            disk_start,
            internal_attributes,
            external_attributes,
            local_header_offset,
            name,
            extra,
            comment,
        })
    }
}

// Helper functions for reading little-endian primitives
pub(crate) fn read_u16<R: Read>(mut reader: R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(mut reader: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_bytes<R: Read>(mut reader: R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
