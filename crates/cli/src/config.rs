#![forbid(unsafe_code)]

use dk_core::dates;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Process-wide configuration, loaded once at startup and passed into every
/// component explicitly.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub timezone: String,
    pub git_auto_commit: bool,
    pub use_index: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            timezone: dates::offset_label(dates::local_offset()),
            git_auto_commit: true,
            use_index: true,
        }
    }
}

impl AppConfig {
    pub fn path() -> PathBuf {
        default_data_dir().join("config.json")
    }

    /// Read the config file, or fall back to defaults. A missing file is
    /// created with the defaults; an unreadable one is only warned about,
    /// so a broken config never locks the user out.
    pub fn load() -> Self {
        let path = Self::path();
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => return config,
                Err(err) => {
                    log::warn!("config at {} is invalid, using defaults: {err}", path.display());
                    return Self::default();
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                log::warn!("cannot read config at {}: {err}", path.display());
                return Self::default();
            }
        }

        let config = Self::default();
        if let Err(err) = config.save() {
            log::warn!("cannot write default config at {}: {err}", path.display());
        }
        config
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "timezone" => self.timezone = value.to_string(),
            "git_auto_commit" => self.git_auto_commit = parse_bool(value)?,
            "use_index" => self.use_index = parse_bool(value)?,
            _ => {
                return Err(format!(
                    "unknown key: {key} (known: data_dir, timezone, git_auto_commit, use_index)"
                ));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "timezone" => Some(self.timezone.clone()),
            "git_auto_commit" => Some(self.git_auto_commit.to_string()),
            "use_index" => Some(self.use_index.to_string()),
            _ => None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".daykeep"))
        .unwrap_or_else(|| PathBuf::from(".daykeep"))
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected true or false, got {other}")),
    }
}
