use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Result, SoundMode};

/// Top-level configuration structure for the application.
///
/// Every section falls back to its defaults, so a configuration file only
/// needs to name the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timing: TimingConfig,
    pub font: FontConfig,
    pub swipe: SwipeConfig,
    pub sound: SoundConfig,
    pub input: InputConfig,
}

impl AppConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Timing of the falling-word cascade and of the background fade.
///
/// These values must agree with the stylesheet driving the visual effect,
/// otherwise the busy gate opens too early or too late.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before the first letter starts falling.
    pub base_delay_ms: u64,
    /// Additional delay for each following letter.
    pub per_letter_ms: u64,
    /// Length of a single letter's fall keyframe.
    pub keyframe_ms: u64,
    /// Background cross-fade length; `0` disables the image wait.
    pub image_transition_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            per_letter_ms: 100,
            keyframe_ms: 1_000,
            image_transition_ms: 1_000,
        }
    }
}

impl TimingConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn per_letter(&self) -> Duration {
        Duration::from_millis(self.per_letter_ms)
    }

    pub fn keyframe(&self) -> Duration {
        Duration::from_millis(self.keyframe_ms)
    }

    pub fn image_transition(&self) -> Option<Duration> {
        (self.image_transition_ms > 0).then(|| Duration::from_millis(self.image_transition_ms))
    }
}

/// Word-length based font sizing, in rem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Words up to this many characters use the maximum size.
    pub shrink_threshold: usize,
    pub max_size_rem: f32,
    pub min_size_rem: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            shrink_threshold: 5,
            max_size_rem: 7.0,
            min_size_rem: 2.5,
        }
    }
}

/// Thresholds a pointer gesture must satisfy to count as a swipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Minimum horizontal travel, in pixels.
    pub min_distance: f32,
    /// Maximum vertical drift, in pixels.
    pub max_vertical: f32,
    /// Maximum gesture length.
    pub max_duration_ms: u64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            min_distance: 50.0,
            max_vertical: 75.0,
            max_duration_ms: 500,
        }
    }
}

impl SwipeConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_duration_ms)
    }
}

/// Initial playback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    pub force_muted: bool,
    pub mode: SoundMode,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            force_muted: false,
            mode: SoundMode::Animal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Whether a press on the big button moves to the next item.
    pub advance_on_press: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            advance_on_press: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "timing": { "per_letter_ms": 150 }, "sound": { "mode": "spoken-word" } }"#,
        )
        .unwrap();

        assert_eq!(config.timing.per_letter_ms, 150);
        assert_eq!(config.timing.base_delay_ms, 1_000);
        assert_eq!(config.sound.mode, SoundMode::SpokenWord);
        assert!(config.sound.enabled);
        assert_eq!(config.swipe, SwipeConfig::default());
    }

    #[test]
    fn zero_image_transition_disables_wait() {
        let timing = TimingConfig {
            image_transition_ms: 0,
            ..TimingConfig::default()
        };
        assert_eq!(timing.image_transition(), None);
        assert_eq!(
            TimingConfig::default().image_transition(),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(AppConfig::from_json_str("{ timing: ").is_err());
    }
}
