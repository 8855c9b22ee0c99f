//! Settings file loading and parsing.
//!
//! # Settings File Locations
//!
//! The settings file is searched in the following order:
//!
//! 1. Path given on the command line (or by the embedding host)
//! 2. Default location:
//!    - **Linux/macOS:** `~/.editor-context-mcp/settings.json`
//!    - **Windows:** `%USERPROFILE%\.editor-context-mcp\settings.json`
//!
//! Settings are optional. When no path is given and the default file does
//! not exist, every option takes its default value.
//!
//! # Example Settings
//!
//! See `config/example-settings.json`.

mod settings;

pub use settings::{Config, LoggingConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.editor-context-mcp/`
/// - **Windows:** `%USERPROFILE%\.editor-context-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".editor-context-mcp"))
}

/// Returns the platform-specific default settings file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("settings.json"))
}

/// Loads and parses the settings file.
///
/// If `path` is `None`, uses the platform-specific default location and
/// falls back to [`Config::default`] when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - A field is invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                tracing::debug!("No settings file found, using defaults");
                return Ok(Config::default());
            }
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}
