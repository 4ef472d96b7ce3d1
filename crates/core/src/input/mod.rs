use std::time::Duration;

use crate::{SoundMode, SwipeConfig};

/// Horizontal swipe direction, named after the finger's motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved right to left; shows the next item.
    Left,
    /// Finger moved left to right; shows the previous item.
    Right,
}

/// Pointer position on the display region at a point in session time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub at: Duration,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, at: Duration) -> Self {
        Self { x, y, at }
    }
}

/// Discrete input delivered to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Big button pressed (mouse down / touch start).
    PressStart,
    /// Big button released, cancelled or left.
    PressEnd,
    /// Tap on the word region.
    Tap,
    Swipe(SwipeDirection),
    /// Raw pointer contact on the display region, fed to swipe recognition.
    PointerDown(PointerSample),
    PointerUp(PointerSample),
    ToggleSound,
    SetForceMuted(bool),
    SetSoundMode(SoundMode),
    SelectLevel(String),
}

/// Classifies a pointer gesture. All three thresholds must hold at once.
pub fn recognize_swipe(
    start: &PointerSample,
    end: &PointerSample,
    config: &SwipeConfig,
) -> Option<SwipeDirection> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let elapsed = end.at.saturating_sub(start.at);

    if dx.abs() < config.min_distance
        || dy.abs() > config.max_vertical
        || elapsed > config.max_duration()
    {
        return None;
    }

    if dx < 0.0 {
        Some(SwipeDirection::Left)
    } else if dx > 0.0 {
        Some(SwipeDirection::Right)
    } else {
        None
    }
}

/// Remembers where a pointer went down until it comes back up.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    config: SwipeConfig,
    start: Option<PointerSample>,
}

impl SwipeTracker {
    pub fn new(config: SwipeConfig) -> Self {
        Self { config, start: None }
    }

    pub fn begin(&mut self, sample: PointerSample) {
        self.start = Some(sample);
    }

    /// Ends the gesture. A release without a matching press yields nothing.
    pub fn finish(&mut self, sample: PointerSample) -> Option<SwipeDirection> {
        let start = self.start.take()?;
        let direction = recognize_swipe(&start, &sample, &self.config);
        tracing::debug!(
            dx = sample.x - start.x,
            dy = sample.y - start.y,
            ?direction,
            "pointer gesture finished"
        );
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, y: f32, ms: u64) -> PointerSample {
        PointerSample::new(x, y, Duration::from_millis(ms))
    }

    #[test]
    fn rightward_gesture_is_a_right_swipe() {
        let config = SwipeConfig::default();
        let direction = recognize_swipe(
            &sample(100.0, 100.0, 0),
            &sample(160.0, 120.0, 300),
            &config,
        );
        assert_eq!(direction, Some(SwipeDirection::Right));
    }

    #[test]
    fn leftward_gesture_is_a_left_swipe() {
        let config = SwipeConfig::default();
        let direction = recognize_swipe(
            &sample(300.0, 50.0, 0),
            &sample(200.0, 40.0, 200),
            &config,
        );
        assert_eq!(direction, Some(SwipeDirection::Left));
    }

    #[test]
    fn every_threshold_must_hold() {
        let config = SwipeConfig::default();
        let start = sample(0.0, 0.0, 0);

        assert_eq!(recognize_swipe(&start, &sample(49.0, 0.0, 100), &config), None);
        assert_eq!(recognize_swipe(&start, &sample(80.0, 76.0, 100), &config), None);
        assert_eq!(recognize_swipe(&start, &sample(80.0, 0.0, 501), &config), None);
        assert_eq!(
            recognize_swipe(&start, &sample(-50.0, 75.0, 500), &config),
            Some(SwipeDirection::Left)
        );
    }

    #[test]
    fn tracker_needs_a_start() {
        let mut tracker = SwipeTracker::new(SwipeConfig::default());
        assert_eq!(tracker.finish(sample(100.0, 0.0, 10)), None);

        tracker.begin(sample(200.0, 0.0, 0));
        assert_eq!(
            tracker.finish(sample(100.0, 0.0, 100)),
            Some(SwipeDirection::Left)
        );
        assert_eq!(tracker.finish(sample(0.0, 0.0, 200)), None);
    }
}
