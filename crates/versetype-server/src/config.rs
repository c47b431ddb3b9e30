//! Server configuration.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where progress records are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(format!("Invalid storage backend: '{}'. Use 'sqlite', 'file' or 'memory'.", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,
    /// Extra origins allowed to open the WebSocket, besides localhost.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("versetype")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("./kjv.json")
}

fn default_db_path() -> PathBuf {
    data_dir().join("progress.db")
}

fn default_progress_file() -> PathBuf {
    data_dir().join("progress.json")
}

fn default_allowed_origins() -> Vec<String> {
    vec!["https://elespe.onrender.com".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            corpus_path: default_corpus_path(),
            storage: StorageBackend::default(),
            db_path: default_db_path(),
            progress_file: default_progress_file(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from default location (config/default.toml) or fall back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/default.toml");
        if config_path.exists() {
            return Self::load_from(&config_path);
        }
        Ok(Config::default())
    }

    /// Apply a `PORT` environment value, as set by hosting platforms.
    pub fn apply_port_env(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(port) = value.map(str::trim).filter(|p| !p.is_empty()) {
            self.port = port.parse()?;
        }
        Ok(())
    }
}
