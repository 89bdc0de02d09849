//! Application configuration management.
//!
//! Settings are layered with `figment`, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory
//! 3. `MIRRORMATCH_*` environment variables
//!
//! CLI flags are applied on top by the caller.

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scanner::DEFAULT_CHUNK_SIZE;

/// Document and image suffixes offered by `scan --office`.
pub const OFFICE_EXTENSIONS: &[&str] = &[
    ".docx", ".xlsx", ".doc", ".ppt", ".pptx", ".xls", ".png", ".jpg", ".gif", ".heif",
];

/// Errors from loading or saving the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No home directory to derive the config path from.
    #[error("Failed to determine project directories")]
    NoProjectDirs,

    /// A layer could not be parsed or extracted.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The config could not be rendered as TOML.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Reading or writing the file failed.
    #[error("Config I/O error on {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read size for checksums and comparisons, in bytes.
    pub chunk_size: usize,
    /// Suffixes to scan by default; empty means every file.
    pub extensions: Vec<String>,
    /// Directory reports are written to; the working directory if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Open the CSV report after a scan that found duplicates.
    pub open_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            extensions: Vec::new(),
            report_dir: None,
            follow_symlinks: false,
            open_report: false,
        }
    }
}

impl Config {
    /// Load from the default locations, falling back to defaults on error.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                log::debug!("{e}, using default configuration");
                return Self::from_env_only();
            }
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load with `path` as the TOML layer. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the file or an environment
    /// variable does not fit the schema.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::figment(Some(path)).extract().map_err(Box::new)?)
    }

    fn from_env_only() -> Self {
        Self::figment(None).extract().unwrap_or_default()
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("MIRRORMATCH_"))
    }

    /// Save to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Fails if the config directory is unknown or not writable.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save as TOML to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)
    }

    /// Platform-specific configuration file path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoProjectDirs`] without a home directory.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let project_dirs = ProjectDirs::from("com", "mirrormatch", "mirrormatch")
            .ok_or(ConfigError::NoProjectDirs)?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
