//! TOML mount configuration
//!
//! ```toml
//! [[mounts]]
//! kind = "directory"
//! prefix = "mods/"
//!
//! [[mounts]]
//! kind = "packed"
//! container = "data/base.zip"
//! prefix = "assets"
//! ```
//!
//! Mounts are consulted in the order they are listed.

use crate::error::{PackError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One mount point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MountConfig {
    /// Loose files below a directory prefix
    Directory {
        #[serde(default)]
        prefix: String,
    },

    /// Entries of a ZIP container below an entry prefix
    Packed {
        container: PathBuf,
        #[serde(default)]
        prefix: String,
    },
}

/// Ordered list of mounts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsConfig {
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

impl VfsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    ///
    /// Relative container paths are kept as written; they resolve against the
    /// process working directory when mounted.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PackError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mounts_in_order() {
        let config = VfsConfig::from_toml_str(
            r#"
            [[mounts]]
            kind = "directory"
            prefix = "mods"

            [[mounts]]
            kind = "packed"
            container = "base.zip"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.mounts,
            vec![
                MountConfig::Directory {
                    prefix: "mods".to_string()
                },
                MountConfig::Packed {
                    container: PathBuf::from("base.zip"),
                    prefix: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_serialize_and_parse_back() {
        let config = VfsConfig {
            mounts: vec![MountConfig::Packed {
                container: PathBuf::from("a.zip"),
                prefix: "assets".to_string(),
            }],
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("kind = \"packed\""));
        assert_eq!(VfsConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let result = VfsConfig::from_toml_str("[[mounts]]\nkind = \"ftp\"\n");
        assert!(matches!(result, Err(PackError::Config(_))));
        assert!(VfsConfig::from_toml_str("").unwrap().mounts.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            VfsConfig::load(dir.path().join("vfs.toml")),
            Err(PackError::Config(_))
        ));
    }
}
