//! Ambient sound requests.
//!
//! The timer never plays audio itself. It hands a `SoundRequest` to an
//! `AmbientSound` sink when a session starts and tells the sink to stop
//! when the session ends. Sink failures are logged and otherwise ignored.

use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TomoError;

/// Ambient sound to loop during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SoundKind {
    /// Silence
    #[default]
    None,
    /// Flat white noise
    WhiteNoise,
    /// Rainfall
    Rain,
    /// Coffee shop murmur
    CoffeeShop,
    /// Birds and wind
    Nature,
}

impl SoundKind {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::WhiteNoise => "White Noise",
            Self::Rain => "Rain",
            Self::CoffeeShop => "Coffee Shop",
            Self::Nature => "Nature",
        }
    }

    /// Icon shown next to the countdown.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::None => "🔇",
            Self::WhiteNoise => "🌫️",
            Self::Rain => "🌧️",
            Self::CoffeeShop => "☕",
            Self::Nature => "🌿",
        }
    }
}

impl std::fmt::Display for SoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// An opaque request for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRequest {
    /// What to play
    pub kind: SoundKind,
    /// Volume, 0 to 100
    pub volume: u8,
}

impl SoundRequest {
    /// Maximum accepted volume.
    pub const MAX_VOLUME: u8 = 100;

    /// Build a request, rejecting volumes above 100.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Validation` if `volume` is out of range.
    pub fn new(kind: SoundKind, volume: u8) -> Result<Self, TomoError> {
        let request = Self { kind, volume };
        request.validate()?;
        Ok(request)
    }

    /// Check the volume range.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Validation` if `volume` is out of range.
    pub fn validate(&self) -> Result<(), TomoError> {
        if self.volume > Self::MAX_VOLUME {
            return Err(TomoError::Validation(format!(
                "volume must be between 0 and {}, got {}",
                Self::MAX_VOLUME,
                self.volume
            )));
        }
        Ok(())
    }

    /// A request for silence, or at volume 0, asks for nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.kind, SoundKind::None) || self.volume == 0
    }
}

/// Sink for ambient sound requests.
#[cfg_attr(test, mockall::automock)]
pub trait AmbientSound {
    /// Start looping the requested sound.
    ///
    /// # Errors
    ///
    /// Returns an error if playback could not start. Callers treat this as
    /// non-fatal.
    fn play(&mut self, request: &SoundRequest) -> Result<(), TomoError>;

    /// Stop whatever is playing. Must be safe to call when nothing plays.
    fn stop(&mut self);
}

/// Sink that only rings the terminal bell when a sound is stopped.
///
/// Used by the CLI: no audio backend ships with tomo, so the request is
/// logged and the bell marks the end of the session.
#[derive(Debug, Default)]
pub struct TerminalBell {
    active: Option<SoundRequest>,
    enabled: bool,
}

impl TerminalBell {
    /// Create a bell sink. When `enabled` is false it stays silent.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            active: None,
            enabled,
        }
    }

    /// Ring the bell once.
    pub fn ring(&self) {
        if self.enabled {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "\x07");
            let _ = stdout.flush();
        }
    }
}

impl AmbientSound for TerminalBell {
    fn play(&mut self, request: &SoundRequest) -> Result<(), TomoError> {
        tracing::debug!(sound = %request.kind, volume = request.volume, "ambient sound requested");
        self.active = Some(*request);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(request) = self.active.take() {
            tracing::debug!(sound = %request.kind, "ambient sound stopped");
        }
    }
}

/// Sink that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AmbientSound for Silent {
    fn play(&mut self, _request: &SoundRequest) -> Result<(), TomoError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_validation() {
        assert!(SoundRequest::new(SoundKind::Rain, 100).is_ok());
        assert!(SoundRequest::new(SoundKind::Rain, 0).is_ok());
        assert!(matches!(
            SoundRequest::new(SoundKind::Rain, 101),
            Err(TomoError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_request() {
        assert!(SoundRequest { kind: SoundKind::None, volume: 50 }.is_empty());
        assert!(SoundRequest { kind: SoundKind::Rain, volume: 0 }.is_empty());
        assert!(!SoundRequest { kind: SoundKind::Rain, volume: 10 }.is_empty());
    }

    #[test]
    fn test_sound_kind_serde_names() {
        let json = serde_json::to_string(&SoundKind::CoffeeShop).unwrap();
        assert_eq!(json, "\"coffee-shop\"");
        let kind: SoundKind = serde_json::from_str("\"white-noise\"").unwrap();
        assert_eq!(kind, SoundKind::WhiteNoise);
    }

    #[test]
    fn test_terminal_bell_tracks_active_request() {
        let mut bell = TerminalBell::new(false);
        let request = SoundRequest::new(SoundKind::Nature, 40).unwrap();
        bell.play(&request).unwrap();
        assert_eq!(bell.active, Some(request));
        bell.stop();
        assert!(bell.active.is_none());
    }
}
