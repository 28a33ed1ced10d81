//! Persisted player settings.
//!
//! ```toml
//! volume = 256
//!
//! [reverb]
//! amount = 0
//! realloc_on_rate_change = true
//!
//! [output]
//! sample_rate = 44100
//! buffer_frames = 1024
//!
//! [disk_saver]
//! enabled = false
//! path = "tapline-out.wav"
//! bits_per_sample = 16
//! ```
//!
//! Every field has a default, so a partial (or empty) file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tapline_effects::RatePolicy;
use tapline_io::{BackendStreamConfig, DiskFormat, UNITY_VOLUME};

use crate::ConfigError;

/// Lowest output rate accepted.
const MIN_SAMPLE_RATE: u32 = 8000;
/// Highest output rate accepted.
const MAX_SAMPLE_RATE: u32 = 384_000;
/// Accepted device buffer sizes, in frames.
const BUFFER_FRAMES: std::ops::RangeInclusive<u32> = 16..=16384;

/// Reverb settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverbSettings {
    /// 0 = off, 1..=15 = feedback strength. Larger values act as 15.
    pub amount: u8,
    /// Re-size delay lines when the output rate changes.
    pub realloc_on_rate_change: bool,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            amount: 0,
            realloc_on_rate_change: true,
        }
    }
}

impl ReverbSettings {
    /// Rate-change policy for the reverb stage.
    pub fn rate_policy(&self) -> RatePolicy {
        if self.realloc_on_rate_change {
            RatePolicy::Reallocate
        } else {
            RatePolicy::Keep
        }
    }
}

/// Audio device settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per device callback.
    pub buffer_frames: u32,
    /// Device index or (partial) name; system default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_frames: 1024,
            device: None,
        }
    }
}

/// Disk saver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskSaverSettings {
    /// Record to disk instead of playing.
    pub enabled: bool,
    /// Output file.
    pub path: PathBuf,
    /// 16 (PCM) or 32 (float).
    pub bits_per_sample: u16,
}

impl Default for DiskSaverSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("tapline-out.wav"),
            bits_per_sample: 16,
        }
    }
}

/// Everything the player persists between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Output gain numerator; 256 is unity.
    pub volume: i16,
    /// Reverb settings.
    pub reverb: ReverbSettings,
    /// Audio device settings.
    pub output: OutputSettings,
    /// Disk saver settings.
    pub disk_saver: DiskSaverSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: UNITY_VOLUME,
            reverb: ReverbSettings::default(),
            output: OutputSettings::default(),
            disk_saver: DiskSaverSettings::default(),
        }
    }
}

impl PlayerSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load settings, or the defaults if the file does not exist yet.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save the settings to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.volume < 0 {
            return Err(ConfigError::invalid(
                "volume",
                format!("{} is negative", self.volume),
            ));
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.output.sample_rate) {
            return Err(ConfigError::invalid(
                "output.sample_rate",
                format!(
                    "{} Hz is outside {}..={} Hz",
                    self.output.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
                ),
            ));
        }
        if !BUFFER_FRAMES.contains(&self.output.buffer_frames) {
            return Err(ConfigError::invalid(
                "output.buffer_frames",
                format!(
                    "{} is outside {}..={}",
                    self.output.buffer_frames,
                    BUFFER_FRAMES.start(),
                    BUFFER_FRAMES.end()
                ),
            ));
        }
        if !matches!(self.disk_saver.bits_per_sample, 16 | 32) {
            return Err(ConfigError::invalid(
                "disk_saver.bits_per_sample",
                format!("{} (expected 16 or 32)", self.disk_saver.bits_per_sample),
            ));
        }
        Ok(())
    }

    /// Stream configuration for the audio backend.
    pub fn stream_config(&self) -> BackendStreamConfig {
        BackendStreamConfig {
            sample_rate: self.output.sample_rate,
            buffer_size: self.output.buffer_frames,
            channels: 2,
            device_name: self.output.device.clone(),
        }
    }

    /// File layout for the disk saver.
    pub fn disk_format(&self) -> DiskFormat {
        DiskFormat {
            sample_rate: self.output.sample_rate,
            channels: 2,
            bits_per_sample: self.disk_saver.bits_per_sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = PlayerSettings::default();
        assert_eq!(s.volume, 256);
        assert_eq!(s.reverb.amount, 0);
        assert!(s.reverb.realloc_on_rate_change);
        assert_eq!(s.output.sample_rate, 44100);
        assert_eq!(s.output.buffer_frames, 1024);
        assert!(!s.disk_saver.enabled);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(PlayerSettings::from_toml("").unwrap(), PlayerSettings::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let s = PlayerSettings::from_toml("[reverb]\namount = 9\n").unwrap();
        assert_eq!(s.reverb.amount, 9);
        assert!(s.reverb.realloc_on_rate_change);
        assert_eq!(s.volume, 256);
    }

    #[test]
    fn test_amount_above_fifteen_is_accepted() {
        let s = PlayerSettings::from_toml("[reverb]\namount = 40\n").unwrap();
        assert_eq!(s.reverb.amount, 40);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut s = PlayerSettings::default();
        s.volume = 200;
        s.reverb.amount = 4;
        s.output.device = Some("USB".into());
        s.disk_saver.bits_per_sample = 32;
        let text = s.to_toml().unwrap();
        assert_eq!(PlayerSettings::from_toml(&text).unwrap(), s);
    }

    #[test]
    fn test_absent_device_is_not_serialized() {
        let text = PlayerSettings::default().to_toml().unwrap();
        assert!(!text.contains("device"));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(PlayerSettings::from_toml("volume = -1").is_err());
        assert!(PlayerSettings::from_toml("[output]\nsample_rate = 100").is_err());
        assert!(PlayerSettings::from_toml("[output]\nbuffer_frames = 4").is_err());
        assert!(PlayerSettings::from_toml("[disk_saver]\nbits_per_sample = 24").is_err());
    }

    #[test]
    fn test_rate_policy_follows_flag() {
        let mut r = ReverbSettings::default();
        assert_eq!(r.rate_policy(), RatePolicy::Reallocate);
        r.realloc_on_rate_change = false;
        assert_eq!(r.rate_policy(), RatePolicy::Keep);
    }

    #[test]
    fn test_stream_config_and_disk_format() {
        let mut s = PlayerSettings::default();
        s.output.sample_rate = 48000;
        s.output.buffer_frames = 256;
        s.output.device = Some("1".into());
        let c = s.stream_config();
        assert_eq!(c.sample_rate, 48000);
        assert_eq!(c.buffer_size, 256);
        assert_eq!(c.channels, 2);
        assert_eq!(c.device_name.as_deref(), Some("1"));
        assert_eq!(s.disk_format().sample_rate, 48000);
        assert_eq!(s.disk_format().bits_per_sample, 16);
    }
}
