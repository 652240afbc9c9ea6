//! Loading job configurations from JSON files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::job::PrintJobConfiguration;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read print configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse print configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PrintJobConfiguration {
    /// Parses a configuration document. Unknown mnemonics are rejected.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads a configuration file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{DuplexMode, Orientation, PaperSetting, PaperSize};
    use tempfile::tempdir;

    #[test]
    fn loads_settings_from_disk() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("print.json");
        fs::write(
            &path,
            r#"{"printer": "Office", "paper": "a3", "orientation": "Landscape", "duplex": "short"}"#,
        )
        .unwrap();

        let config = PrintJobConfiguration::load(&path).unwrap();
        assert_eq!(config.printer.as_deref(), Some("Office"));
        assert_eq!(config.paper, Some(PaperSetting::Named(PaperSize::A3)));
        assert_eq!(config.orientation, Some(Orientation::Landscape));
        assert_eq!(config.duplex, Some(DuplexMode::ShortEdge));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let config = PrintJobConfiguration::load(temp.path().join("absent.json")).unwrap();
        assert_eq!(config, PrintJobConfiguration::default());
    }

    #[test]
    fn unknown_mnemonic_is_a_parse_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("print.json");
        fs::write(&path, r#"{"paper": "banana"}"#).unwrap();

        let err = PrintJobConfiguration::load(&path).unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse { .. }));
        assert!(err.to_string().contains("unknown paper size `banana`"));
    }
}
