// Settings management and persistence
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub poll_interval_ms: u64, // How often the engine checks for finished tracks
    pub channels: usize,       // Mixer channels available for parallel playback
    pub volume: f32,           // 0.0-1.0
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            channels: 8,
            volume: 1.0,
        }
    }
}

/// Container compilation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileSettings {
    pub pretty_metadata: bool,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            pretty_metadata: true,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub playback: PlaybackSettings,
    pub compile: CompileSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            playback: PlaybackSettings::default(),
            compile: CompileSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;

        let mut settings: AppSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))?;
        settings.sanitize();

        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).with_context(|| format!("Failed to write settings file {:?}", path))?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }

    fn sanitize(&mut self) {
        let playback = &mut self.playback;
        if playback.channels == 0 {
            warn!("playback.channels must be at least 1");
            playback.channels = 1;
        }
        if playback.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            warn!("playback.poll_interval_ms raised to {}", MIN_POLL_INTERVAL_MS);
            playback.poll_interval_ms = MIN_POLL_INTERVAL_MS;
        }
        if !(0.0..=1.0).contains(&playback.volume) {
            playback.volume = if playback.volume.is_nan() { 1.0 } else { playback.volume.clamp(0.0, 1.0) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.playback.poll_interval_ms, 100);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.playback.channels = 16;
        settings.compile.pretty_metadata = false;
        settings.save(&path).unwrap();

        assert_eq!(AppSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"playback": {"channels": 0, "volume": 3.5, "poll_interval_ms": 1}}"#).unwrap();

        let settings = AppSettings::load(&path).unwrap();
        assert_eq!(settings.playback.channels, 1);
        assert_eq!(settings.playback.volume, 1.0);
        assert_eq!(settings.playback.poll_interval_ms, MIN_POLL_INTERVAL_MS);
        assert!(settings.compile.pretty_metadata);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppSettings::load(&path).is_err());
    }
}
