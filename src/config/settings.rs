//! Configuration settings for tomo.
//!
//! Settings are loaded from `~/.tomo/config.yaml`. Every field has a
//! default, so a partial file (or no file) is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Paths;
use crate::error::TomoError;
use crate::features::export::ExportFormat;
use crate::features::focus::{SoundKind, SoundRequest};
use crate::features::stats::WeekBoundary;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Focus and break timing.
    pub focus: FocusConfig,
    /// Ambient sound settings.
    pub sound: SoundConfig,
    /// Export defaults.
    pub export: ExportConfig,
    /// Statistics settings.
    pub stats: StatsConfig,
}

/// Focus and break timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Default focus duration in minutes.
    #[serde(default = "default_focus_duration")]
    pub default_duration_minutes: u32,
    /// Break duration in minutes.
    #[serde(default = "default_break_duration")]
    pub break_duration_minutes: u32,
    /// Offer a break after a completed focus session.
    #[serde(default = "default_true")]
    pub auto_break: bool,
    /// Minutes added by one break extension.
    #[serde(default = "default_extend_increment")]
    pub extend_increment_minutes: u32,
}

/// Ambient sound settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Master switch for ambient sound and the end-of-session bell.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ambient sound requested during focus sessions.
    #[serde(default)]
    pub focus_sound: SoundKind,
    /// Volume, 0 to 100.
    #[serde(default = "default_volume")]
    pub volume: u8,
}

/// Export defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportConfig {
    /// Format used when `--format` is not given.
    #[serde(default)]
    pub format: ExportFormat,
    /// Directory for exports. Defaults to `~/.tomo/exports/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Statistics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatsConfig {
    /// Which days count as "this week".
    #[serde(default)]
    pub week: WeekBoundary,
}

// Default value functions for serde
const fn default_focus_duration() -> u32 {
    25
}

const fn default_break_duration() -> u32 {
    5
}

const fn default_extend_increment() -> u32 {
    5
}

const fn default_volume() -> u8 {
    50
}

const fn default_true() -> bool {
    true
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: default_focus_duration(),
            break_duration_minutes: default_break_duration(),
            auto_break: default_true(),
            extend_increment_minutes: default_extend_increment(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            focus_sound: SoundKind::default(),
            volume: default_volume(),
        }
    }
}

impl FocusConfig {
    /// Default focus duration in seconds.
    #[must_use]
    pub const fn focus_seconds(&self) -> u64 {
        self.default_duration_minutes as u64 * 60
    }

    /// Break duration in seconds.
    #[must_use]
    pub const fn break_seconds(&self) -> u64 {
        self.break_duration_minutes as u64 * 60
    }

    /// Extension increment in seconds.
    #[must_use]
    pub const fn extend_seconds(&self) -> u64 {
        self.extend_increment_minutes as u64 * 60
    }
}

impl SoundConfig {
    /// The request issued at the start of a focus session, if any.
    #[must_use]
    pub const fn focus_request(&self) -> Option<SoundRequest> {
        if !self.enabled || matches!(self.focus_sound, SoundKind::None) {
            return None;
        }
        Some(SoundRequest {
            kind: self.focus_sound,
            volume: self.volume,
        })
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds invalid values.
    pub fn load_from_path(path: &Path) -> Result<Self, TomoError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            TomoError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            TomoError::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or cannot be written.
    pub fn save_to_path(&self, path: &Path) -> Result<(), TomoError> {
        self.validate()?;

        let contents = serde_yaml::to_string(self)
            .map_err(|e| TomoError::Config(format!("Failed to serialize config: {e}")))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TomoError::io(parent, e))?;
        }

        std::fs::write(path, contents).map_err(|e| {
            TomoError::Config(format!("Failed to write config file {}: {e}", path.display()))
        })
    }

    /// Reject values the timer cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Config` naming the first bad field.
    pub fn validate(&self) -> Result<(), TomoError> {
        let durations = [
            ("focus.default_duration_minutes", self.focus.default_duration_minutes),
            ("focus.break_duration_minutes", self.focus.break_duration_minutes),
            ("focus.extend_increment_minutes", self.focus.extend_increment_minutes),
        ];
        for (field, minutes) in durations {
            if minutes == 0 {
                return Err(TomoError::Config(format!("{field} must be greater than 0")));
            }
        }

        if self.sound.volume > SoundRequest::MAX_VOLUME {
            return Err(TomoError::Config(format!(
                "sound.volume must be between 0 and {}, got {}",
                SoundRequest::MAX_VOLUME,
                self.sound.volume
            )));
        }
        Ok(())
    }

    /// Directory exports go to when no destination is given.
    #[must_use]
    pub fn export_directory(&self, paths: &Paths) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| paths.exports.clone())
    }
}
