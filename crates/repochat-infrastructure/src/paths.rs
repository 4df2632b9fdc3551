//! Unified path management for repochat files.
//!
//! ```text
//! ~/.config/repochat/          # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/repochat/     # Data directory
//! ├── repositories.json        # One file per persisted slot
//! ├── chats.json
//! ├── messages.json
//! ├── settings.json
//! ├── isAuthenticated.json
//! └── selectedRepos.json
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "repochat";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for repochat_core::ChatError {
    fn from(err: PathError) -> Self {
        repochat_core::ChatError::config(err.to_string())
    }
}

/// Platform-appropriate locations (XDG on Linux, the native equivalents elsewhere).
pub struct RepochatPaths;

impl RepochatPaths {
    /// Returns the configuration directory, e.g. `~/.config/repochat/`.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory holding the persisted slots, e.g. `~/.local/share/repochat/`.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
