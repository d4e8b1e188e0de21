//! Path resolution for tomo configuration and data files.
//!
//! All tomo data is stored in `~/.tomo/`:
//! - `config.yaml` - Main configuration file
//! - `sessions.json` - Session log (JSON array)
//! - `sessions.pending.json` - Sessions waiting to be merged into the log
//! - `exports/` - Default export directory

use std::path::PathBuf;

use crate::error::TomoError;

/// Paths to tomo configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.tomo/`
    pub root: PathBuf,
    /// Config file: `~/.tomo/config.yaml`
    pub config_file: PathBuf,
    /// Session log: `~/.tomo/sessions.json`
    pub sessions: PathBuf,
    /// Pending sessions: `~/.tomo/sessions.pending.json`
    pub pending: PathBuf,
    /// Exports directory: `~/.tomo/exports/`
    pub exports: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, TomoError> {
        let home = std::env::var("HOME")
            .map_err(|_| TomoError::Config("Could not determine home directory".to_string()))?;

        Ok(Self::with_root(PathBuf::from(home).join(".tomo")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            sessions: root.join("sessions.json"),
            pending: root.join("sessions.pending.json"),
            exports: root.join("exports"),
            root,
        }
    }
}
