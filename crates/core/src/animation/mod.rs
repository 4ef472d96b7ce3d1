//! Timing and sizing of the falling-word effect.
//!
//! The renderer gives no completion signal, so the engine estimates when the
//! cascade ends from the same constants the stylesheet uses. The estimate sits
//! behind [`AnimationEstimator`] so a backend with a real "animation finished"
//! event can replace it without touching the sequencer.

use std::time::Duration;

use crate::{FontConfig, TimingConfig};

/// Estimates how long the entrance of a word takes on screen.
pub trait AnimationEstimator {
    /// Delay before letter `index` starts falling.
    fn letter_delay(&self, index: usize) -> Duration;

    /// Time until the last letter has landed.
    fn word_duration(&self, word: &str) -> Duration;
}

/// Letter-by-letter cascade: each letter starts `per_letter` after the
/// previous one and falls for `keyframe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeTiming {
    pub base_delay: Duration,
    pub per_letter: Duration,
    pub keyframe: Duration,
}

impl CascadeTiming {
    pub fn from_config(config: &TimingConfig) -> Self {
        Self {
            base_delay: config.base_delay(),
            per_letter: config.per_letter(),
            keyframe: config.keyframe(),
        }
    }
}

impl Default for CascadeTiming {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default())
    }
}

impl AnimationEstimator for CascadeTiming {
    fn letter_delay(&self, index: usize) -> Duration {
        self.base_delay + self.per_letter * index as u32
    }

    fn word_duration(&self, word: &str) -> Duration {
        word_animation_duration(word.chars().count(), self)
    }
}

/// `base + max(0, len - 1) * per_letter + keyframe`.
pub fn word_animation_duration(letters: usize, timing: &CascadeTiming) -> Duration {
    let trailing = letters.saturating_sub(1) as u32;
    timing.base_delay + timing.per_letter * trailing + timing.keyframe
}

/// Font size in rem for a word of `letters` characters. Short words use the
/// maximum size, longer ones shrink proportionally down to the minimum.
pub fn calculate_font_size(letters: usize, font: &FontConfig) -> f32 {
    if letters <= font.shrink_threshold {
        return font.max_size_rem;
    }

    let scale = font.shrink_threshold as f32 / letters as f32;
    (font.max_size_rem * scale).clamp(font.min_size_rem, font.max_size_rem)
}

/// Everything the display needs to render one falling word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordLayout {
    pub text: String,
    pub font_size_rem: f32,
    pub letter_delays: Vec<Duration>,
    pub duration: Duration,
}

impl WordLayout {
    pub fn compose(text: &str, estimator: &dyn AnimationEstimator, font: &FontConfig) -> Self {
        let letters = text.chars().count();
        let font_size_rem = calculate_font_size(letters, font);
        tracing::debug!(word = text, letters, font_size_rem, "word layout composed");

        Self {
            text: text.to_string(),
            font_size_rem,
            letter_delays: (0..letters).map(|i| estimator.letter_delay(i)).collect(),
            duration: estimator.word_duration(text),
        }
    }

    /// A word made only of whitespace has nothing to animate.
    pub fn is_displayable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
