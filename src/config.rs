//! Dashboard configuration.
//!
//! Stored in TOML at `~/.config/quechat/config.toml` (or the XDG
//! equivalent). Every key is optional; a missing file means defaults, which
//! match the export file names in the working directory.
//!
//! # Example Configuration
//!
//! ```toml
//! owner_name = "Niki"
//!
//! [data]
//! dir = "/srv/quechat/exports"
//! orders = "order_data.csv"
//! feedback = "feedback_data.csv"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analytics::Dataset;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Name used in the chat greeting.
    pub owner_name: String,
    pub data: DataConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            owner_name: "Niki".into(),
            data: DataConfig::default(),
        }
    }
}

/// Where the four source files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Base directory for relative file names.
    pub dir: PathBuf,
    pub categories: PathBuf,
    pub menu: PathBuf,
    pub orders: PathBuf,
    pub feedback: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            categories: PathBuf::from("categories.csv"),
            menu: PathBuf::from("menu.csv"),
            orders: PathBuf::from("order_data.csv"),
            feedback: PathBuf::from("feedback_data.csv"),
        }
    }
}

impl DataConfig {
    fn file(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Categories => &self.categories,
            Dataset::Menu => &self.menu,
            Dataset::Orders => &self.orders,
            Dataset::Feedback => &self.feedback,
        }
    }
}

/// Values supplied on the command line or through `QUECHAT_*` variables.
/// They take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct DataOverrides {
    pub dir: Option<PathBuf>,
    pub categories: Option<PathBuf>,
    pub menu: Option<PathBuf>,
    pub orders: Option<PathBuf>,
    pub feedback: Option<PathBuf>,
}

/// Fully resolved source file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub categories: PathBuf,
    pub menu: PathBuf,
    pub orders: PathBuf,
    pub feedback: PathBuf,
}

impl DataPaths {
    pub fn get(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Categories => &self.categories,
            Dataset::Menu => &self.menu,
            Dataset::Orders => &self.orders,
            Dataset::Feedback => &self.feedback,
        }
    }

    /// All four files under `dir` with their default names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let data = DataConfig {
            dir: dir.as_ref().to_path_buf(),
            ..DataConfig::default()
        };
        data.resolve()
    }
}

impl DataConfig {
    /// Join each file name onto `dir`. Absolute names are kept as they are.
    pub fn resolve(&self) -> DataPaths {
        let path = |dataset| self.dir.join(self.file(dataset));
        DataPaths {
            categories: path(Dataset::Categories),
            menu: path(Dataset::Menu),
            orders: path(Dataset::Orders),
            feedback: path(Dataset::Feedback),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from the default location.
    ///
    /// Returns defaults if the file doesn't exist or no config directory can
    /// be determined.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(ConfigError::NoConfigDir) => {
                warn!("could not determine config directory; using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get the default configuration file path.
    ///
    /// Uses XDG conventions:
    /// - Primary: `$XDG_CONFIG_HOME/quechat/config.toml`
    /// - Fallback: platform-specific config dir (e.g., `~/.config/quechat/config.toml` on Linux)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Ok(PathBuf::from(xdg_config)
                .join("quechat")
                .join("config.toml"));
        }

        dirs::config_dir()
            .map(|p| p.join("quechat").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner_name.trim().is_empty() {
            return Err(ConfigError::Validation("owner_name cannot be empty".into()));
        }
        for dataset in Dataset::ALL {
            if self.data.file(dataset).as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "data.{dataset} cannot be empty"
                )));
            }
        }
        Ok(())
    }

    /// Fold CLI/env overrides into this config and re-validate.
    pub fn with_overrides(mut self, overrides: &DataOverrides) -> Result<Self, ConfigError> {
        let data = &mut self.data;
        if let Some(dir) = &overrides.dir {
            data.dir = dir.clone();
        }
        for (slot, value) in [
            (&mut data.categories, &overrides.categories),
            (&mut data.menu, &overrides.menu),
            (&mut data.orders, &overrides.orders),
            (&mut data.feedback, &overrides.feedback),
        ] {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn data_paths(&self) -> DataPaths {
        self.data.resolve()
    }
}
