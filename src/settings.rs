//! Persistence for the last-used export settings.
//!
//! Settings are a single JSON document holding an [`ExportConfig`]. They are read once at
//! startup and written only when a caller asks for it; nothing here is global.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::export_config::ExportConfig;
use crate::{Error, Result};

const APP_DIR: &str = "transkripto";
const SETTINGS_FILE: &str = "settings.json";

/// A settings file on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user store, e.g. `~/.config/transkripto/settings.json` on Linux.
    pub fn user_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Settings("no user configuration directory".to_owned()))?;
        Ok(Self::new(dir.join(APP_DIR).join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored config. A missing file yields [`ExportConfig::default`].
    pub fn load(&self) -> Result<ExportConfig> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved settings, using defaults");
                return Ok(ExportConfig::default());
            }
            Err(err) => {
                return Err(Error::Settings(format!(
                    "failed to read '{}': {err}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_slice(&bytes).map_err(|err| {
            Error::Settings(format!("invalid settings in '{}': {err}", self.path.display()))
        })
    }

    /// Replace the stored config, creating the parent directory if needed.
    pub fn save(&self, config: &ExportConfig) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(|err| Error::write(dir, err))?;

        let mut json = serde_json::to_vec_pretty(config)?;
        json.push(b'\n');

        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| Error::write(&self.path, err))?;
        tmp.write_all(&json)
            .map_err(|err| Error::write(&self.path, err))?;
        tmp.persist(&self.path)
            .map_err(|err| Error::write(&self.path, err.error))?;

        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export_format::ExportFormat;
    use crate::timestamp::TimestampStyle;

    #[test]
    fn missing_file_loads_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = SettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load()?, ExportConfig::default());
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = SettingsStore::new(dir.path().join("nested").join("settings.json"));
        let config = ExportConfig::new(ExportFormat::Srt)
            .with_timestamps(false)
            .with_timestamp_style(TimestampStyle::MinutesSeconds);

        store.save(&config)?;
        assert_eq!(store.load()?, config);

        let raw = std::fs::read_to_string(store.path())?;
        assert!(raw.contains("\"format\": \"SRT\""));
        assert!(raw.contains("\"timestamp_style\": \"mm:ss\""));
        Ok(())
    }

    #[test]
    fn unknown_stored_format_is_a_settings_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "format": "PDF" }"#)?;

        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
        assert!(err.to_string().contains("unsupported export format"));
        Ok(())
    }

    #[test]
    fn corrupt_file_is_a_settings_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json")?;

        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
        Ok(())
    }
}
