//! Glint Configuration Management
//!
//! Loads the shader manifest from `./glint.toml`, falling back to
//! `~/.glint/config.toml`. The manifest carries general settings and a list
//! of named `[[program]]` entries.

pub mod programs;

pub use programs::{ProgramEntry, ProgramKind, ProgramSpec};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Manifest file name looked up in the working directory
pub const MANIFEST_FILE_NAME: &str = "glint.toml";
/// Default configuration directory name
const CONFIG_DIR_NAME: &str = ".glint";
/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// General configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory program paths are relative to, itself relative to the manifest
    #[serde(default = "default_shader_dir")]
    pub shader_dir: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shader_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            shader_dir: default_shader_dir(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default, rename = "program")]
    pub programs: Vec<ProgramEntry>,

    /// File the manifest was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load the manifest found by [`Config::find`], or defaults if none exists
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match Self::find(&cwd)? {
            Some(path) => Self::load_from(&path),
            None => {
                log::info!("No manifest found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        let mut config = Self::parse(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;
        config.source = Some(path.to_path_buf());
        config.validate()?;

        log::info!(
            "Loaded {} program(s) from {:?}",
            config.programs.len(),
            path
        );
        Ok(config)
    }

    /// Parse manifest text without validating it
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Locate the manifest: `<dir>/glint.toml`, then `~/.glint/config.toml`
    pub fn find(dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
        let local = dir.join(MANIFEST_FILE_NAME);
        if local.is_file() {
            return Ok(Some(local));
        }

        let user = Self::config_file_path()?;
        Ok(user.is_file().then_some(user))
    }

    /// Get the configuration directory path (~/.glint/)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file path (~/.glint/config.toml)
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Check every entry and reject duplicate names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.programs {
            entry.kind()?;
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateProgram(entry.name.clone()));
            }
        }
        Ok(())
    }

    /// Directory program paths are resolved against
    pub fn shader_root(&self) -> PathBuf {
        let base = self
            .source
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        base.join(&self.general.shader_dir)
    }

    pub fn program(&self, name: &str) -> Option<&ProgramEntry> {
        self.programs.iter().find(|entry| entry.name == name)
    }

    /// Resolve one entry by name
    pub fn resolve(&self, name: &str) -> Result<ProgramSpec, ConfigError> {
        let entry = self
            .program(name)
            .ok_or_else(|| ConfigError::UnknownProgram(name.to_string()))?;
        entry.resolve(&self.shader_root())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDirectory,
    #[error("Failed to read {0:?}: {1}")]
    ReadError(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse {0:?}: {1}")]
    ParseError(PathBuf, #[source] toml::de::Error),
    #[error("Program `{name}` is invalid: {reason}")]
    InvalidProgram { name: String, reason: String },
    #[error("Program `{0}` is defined more than once")]
    DuplicateProgram(String),
    #[error("No program named `{0}`")]
    UnknownProgram(String),
}
