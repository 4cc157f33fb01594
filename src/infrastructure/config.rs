use crate::constants::{ANKI_CONNECT_TIMEOUT_SECS, ANKI_CONNECT_URL, NOTE_FILE_EXTENSION};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// TOML configuration for ankisync
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub anki_connect: AnkiConnectConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
}

/// Which collaborator notes are pushed to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// AnkiConnect add-on of the running Anki desktop app
    #[default]
    Connect,
    /// Direct access to a closed collection.anki2 file
    Collection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SyncConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnkiConnectConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as AnkiConnect `key` when non-empty
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub allow_duplicate: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct CollectionConfig {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub profile: String,
}

// Default value functions
fn default_extension() -> String {
    NOTE_FILE_EXTENSION.to_string()
}

fn default_url() -> String {
    ANKI_CONNECT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    ANKI_CONNECT_TIMEOUT_SECS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            extension: default_extension(),
        }
    }
}

impl Default for AnkiConnectConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            api_key: String::new(),
            allow_duplicate: false,
        }
    }
}

impl CollectionConfig {
    pub fn path(&self) -> Option<PathBuf> {
        (!self.path.is_empty()).then(|| PathBuf::from(&self.path))
    }

    pub fn profile(&self) -> Option<&str> {
        (!self.profile.is_empty()).then_some(self.profile.as_str())
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// `<config dir>/ankisync/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ankisync").join("config.toml"))
    }

    /// Load `explicit` if given, else the default location if it exists, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(?path, "Loading configuration");
            return Self::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()));
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!(?path, "Loading configuration from default location");
                Self::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))
            }
            _ => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }
}
