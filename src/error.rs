use std::io;
use thiserror::Error;

/// Result type for packfs operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Unified error type for container, cipher pipeline and configuration operations
#[derive(Debug, Error)]
pub enum PackError {
    // Container errors
    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error("Entry uses ZIP encryption: {0}")]
    EncryptedEntry(String),

    #[error("ZIP64 containers are not supported")]
    Zip64Unsupported,

    #[error("Entry too large for container: {name} ({size} bytes)")]
    EntryTooLarge { name: String, size: u64 },

    #[error("Entry name too long: {0} bytes")]
    PathTooLong(usize),

    // Codec errors
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<toml::de::Error> for PackError {
    fn from(err: toml::de::Error) -> Self {
        PackError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PackError {
    fn from(err: toml::ser::Error) -> Self {
        PackError::Config(err.to_string())
    }
}
