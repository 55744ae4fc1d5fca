//! JSON persistence for the seat configuration and device map documents.
//!
//! Both files live in one directory:
//!
//! ```text
//! $XDG_CONFIG_HOME/mpx-wayland/    (or ~/.config/mpx-wayland/)
//!   config.json    seats and global options
//!   devices.json   device → seat mappings
//! ```
//!
//! A missing file is not an error: it loads as the document's default, which
//! is what a first run sees.  A file that exists but does not parse is an
//! error, so a hand-edited typo is reported instead of silently replaced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mpx_core::{DeviceMapDocument, SeatConfigDocument};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::application::DocumentRepository;
use crate::error::CtlError;

pub const CONFIG_FILE: &str = "config.json";
pub const DEVICES_FILE: &str = "devices.json";
const APP_DIR: &str = "mpx-wayland";

#[derive(Debug, Error)]
pub enum StoreError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine the configuration directory (set XDG_CONFIG_HOME or HOME)")]
    NoConfigDir,

    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The two configuration documents, read from and written to one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A store in the user's XDG configuration directory.
    pub fn from_env() -> Result<Self, StoreError> {
        default_config_dir().map(Self::new).ok_or(StoreError::NoConfigDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn devices_path(&self) -> PathBuf {
        self.dir.join(DEVICES_FILE)
    }

    pub fn load_seat_config(&self) -> Result<SeatConfigDocument, StoreError> {
        load_or_default(&self.config_path())
    }

    pub fn load_device_map(&self) -> Result<DeviceMapDocument, StoreError> {
        load_or_default(&self.devices_path())
    }

    pub fn save_seat_config(&self, document: &SeatConfigDocument) -> Result<(), StoreError> {
        self.save(&self.config_path(), document)
    }

    pub fn save_device_map(&self, document: &DeviceMapDocument) -> Result<(), StoreError> {
        self.save(&self.devices_path(), document)
    }

    fn save<T: Serialize>(&self, path: &Path, document: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut content = serde_json::to_string_pretty(document)?;
        content.push('\n');
        fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

impl DocumentRepository for ConfigStore {
    fn load_documents(&self) -> Result<(SeatConfigDocument, DeviceMapDocument), CtlError> {
        Ok((self.load_seat_config()?, self.load_device_map()?))
    }

    fn save_documents(
        &self,
        config: &SeatConfigDocument,
        devices: &DeviceMapDocument,
    ) -> Result<(), CtlError> {
        self.save_seat_config(config)?;
        self.save_device_map(devices)?;
        Ok(())
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(T::default())
        }
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `$XDG_CONFIG_HOME/mpx-wayland`, or `~/.config/mpx-wayland`.
fn default_config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use mpx_core::{DeviceKind, DeviceMapping, SeatEntry};

    use super::*;

    fn scratch_store() -> ConfigStore {
        let name = format!("mpx-ctl-store-{}", uuid::Uuid::new_v4());
        ConfigStore::new(std::env::temp_dir().join(name))
    }

    #[test]
    fn test_missing_files_load_as_defaults() {
        // Arrange
        let store = scratch_store();

        // Act
        let config = store.load_seat_config().unwrap();
        let devices = store.load_device_map().unwrap();

        // Assert
        assert_eq!(config, SeatConfigDocument::default());
        assert_eq!(devices, DeviceMapDocument::default());
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_saved_documents_load_back_unchanged() {
        // Arrange
        let store = scratch_store();
        let mut config = SeatConfigDocument::default();
        config.seats.push(SeatEntry::new("aux"));
        let devices = DeviceMapDocument {
            mappings: vec![DeviceMapping {
                device_id: "mouse1".into(),
                seat_name: Some("aux".into()),
                device_name: "Mouse".into(),
                priority: 0,
                kind: DeviceKind::Pointer,
                usb_id: Some("046d:c077".into()),
            }],
            ..DeviceMapDocument::default()
        };

        // Act
        store.save_seat_config(&config).unwrap();
        store.save_device_map(&devices).unwrap();

        // Assert
        assert_eq!(store.load_seat_config().unwrap(), config);
        assert_eq!(store.load_device_map().unwrap(), devices);
        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_malformed_file_is_a_parse_error_naming_the_path() {
        let store = scratch_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.config_path(), "{\"version\": 1, \"verbose\": true}").unwrap();

        let err = store.load_seat_config().unwrap_err();

        assert!(matches!(&err, StoreError::Parse { path, .. } if *path == store.config_path()));
        assert!(err.to_string().contains(CONFIG_FILE));
        fs::remove_dir_all(store.dir()).unwrap();
    }
}
