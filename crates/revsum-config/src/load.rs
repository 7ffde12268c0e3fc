//! Layered settings loading.
//!
//! Precedence, highest first: CLI flags and environment variables (merged by
//! the CLI into one [`SettingsLayer`]), the settings file, built-in defaults.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::settings::{Settings, SettingsLayer};

/// Settings file name inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Application directory under the platform config dir.
pub const APP_DIR_NAME: &str = "revsum";

/// Errors from loading the settings file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<LoadError> for revsum_common::Error {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(path) => revsum_common::Error::SettingsNotFound {
                path: path.display().to_string(),
            },
            LoadError::Io { source, .. } => revsum_common::Error::Io(source),
            LoadError::Parse { path, source } => revsum_common::Error::Config(format!(
                "failed to parse {}: {}",
                path.display(),
                source
            )),
        }
    }
}

/// Where the settings file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Path to the settings file, if any.
    pub settings: Option<PathBuf>,

    /// Whether the path was requested explicitly (missing file is an error).
    pub explicit: bool,
}

impl ConfigPaths {
    /// Use an explicitly requested file, else the default location.
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        match explicit {
            Some(path) => ConfigPaths {
                settings: Some(path),
                explicit: true,
            },
            None => ConfigPaths {
                settings: default_settings_path(),
                explicit: false,
            },
        }
    }

    /// No settings file at all.
    pub fn none() -> Self {
        ConfigPaths {
            settings: None,
            explicit: false,
        }
    }
}

/// `<config_dir>/revsum/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// Read one settings file layer.
pub fn read_layer(path: &Path) -> Result<SettingsLayer, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build settings from defaults, the settings file, then `overrides`.
pub fn load_settings(paths: &ConfigPaths, overrides: &SettingsLayer) -> Result<Settings, LoadError> {
    let mut settings = Settings::default();

    if let Some(path) = &paths.settings {
        match read_layer(path) {
            Ok(layer) => {
                debug!(path = %path.display(), "loaded settings file");
                settings.apply(&layer);
            }
            Err(LoadError::NotFound(_)) if !paths.explicit => {
                debug!(path = %path.display(), "no settings file, using defaults");
            }
            Err(e) => return Err(e),
        }
    }

    settings.apply(overrides);
    Ok(settings)
}
