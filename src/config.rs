//! Package-relative directory settings.
//!
//! Everything the storyteller touches on disk hangs off a base directory:
//!
//! ```text
//! <base_dir>/
//! ├── .env
//! ├── data/                        # data_dir
//! │   └── music_generation/
//! │       ├── lrc/eg_en_full.lrc
//! │       └── music/empty.lrc
//! └── vendor/                      # vendor_dir
//!     └── DiffRhythm/
//! ```

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const BASE_DIR_VAR: &str = "STORYTELLER_BASE_DIR";
pub const DATA_DIR_VAR: &str = "STORYTELLER_DATA_DIR";
pub const VENDOR_DIR_VAR: &str = "STORYTELLER_VENDOR_DIR";
pub const SECRET_DIRS_VAR: &str = "STORYTELLER_SECRET_DIRS";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine the current directory: {0}")]
    CurrentDir(std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub data_dir: PathBuf,
    pub vendor_dir: PathBuf,
    /// Mounted secret directories, searched in order before the environment.
    #[serde(default)]
    pub secret_dirs: Vec<PathBuf>,
}

impl Settings {
    /// Settings with the conventional `data/` and `vendor/` layout under `base_dir`.
    pub fn from_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            data_dir: base_dir.join("data"),
            vendor_dir: base_dir.join("vendor"),
            base_dir,
            secret_dirs: Vec::new(),
        }
    }

    /// Load settings from the process environment.
    ///
    /// A `.env` file in the working directory (or any parent) is loaded first
    /// if one exists. Unset variables fall back to the current directory
    /// layout.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_vars(|name| env::var_os(name))
    }

    /// Resolve settings from `STORYTELLER_*` variables supplied by `var`.
    ///
    /// The base directory defaults to the current directory; the data, vendor
    /// and secret directories override the values derived from it.
    pub fn from_vars(var: impl Fn(&str) -> Option<OsString>) -> Result<Self, ConfigError> {
        let base_dir = match var(BASE_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir().map_err(ConfigError::CurrentDir)?,
        };

        let mut settings = Self::from_base_dir(base_dir);
        if let Some(dir) = var(DATA_DIR_VAR) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var(VENDOR_DIR_VAR) {
            settings.vendor_dir = PathBuf::from(dir);
        }
        if let Some(dirs) = var(SECRET_DIRS_VAR) {
            settings.secret_dirs = env::split_paths(&dirs).collect();
        }

        log::debug!("Settings resolved: {settings:?}");
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn dotenv_path(&self) -> PathBuf {
        self.base_dir.join(".env")
    }
}
