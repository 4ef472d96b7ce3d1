use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{ButtonError, ContentItem, Result, SoundConfig};

/// Which sound of the current item a tap plays.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundMode {
    /// The noise the animal makes.
    #[default]
    Animal,
    /// A recording of the word being read aloud.
    SpokenWord,
}

/// Opaque reference to one in-flight sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AudioHandle(u64);

impl AudioHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Completion notifications an audio backend delivers for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Ended(AudioHandle),
    Errored(AudioHandle),
}

impl PlaybackEvent {
    pub fn handle(self) -> AudioHandle {
        match self {
            Self::Ended(handle) | Self::Errored(handle) => handle,
        }
    }
}

/// A sound the backend accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedPlayback {
    pub handle: AudioHandle,
    /// Known length of the sound. Backends that report completion on their
    /// own return `None` and deliver a [`PlaybackEvent`] later.
    pub duration: Option<Duration>,
}

/// Audio capability. There is no stop operation: once started, a sound runs
/// until it ends or errors.
pub trait AudioBackend {
    fn play(&mut self, url: &str) -> Result<StartedPlayback>;
}

/// Picks the sound reference of `item` that matches `mode`.
pub fn resolve_sound_url(item: &ContentItem, mode: SoundMode) -> Option<&str> {
    match mode {
        SoundMode::Animal => item.animal_sound_ref.as_deref(),
        SoundMode::SpokenWord => item.spoken_word_ref.as_deref(),
    }
}

/// Serialises sound playback: at most one sound started through the gate is
/// playing at any time.
#[derive(Debug)]
pub struct PlaybackGate {
    active: Option<AudioHandle>,
    sound_enabled: bool,
    force_muted: bool,
    mode: SoundMode,
}

impl Default for PlaybackGate {
    fn default() -> Self {
        Self::new(&SoundConfig::default())
    }
}

impl PlaybackGate {
    pub fn new(config: &SoundConfig) -> Self {
        Self {
            active: None,
            sound_enabled: config.enabled,
            force_muted: config.force_muted,
            mode: config.mode,
        }
    }

    /// Effective mute: forced, or sound switched off by the user.
    pub fn is_muted(&self) -> bool {
        self.force_muted || !self.sound_enabled
    }

    /// Flips the user-facing sound switch and returns the new value.
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        tracing::info!(sound_enabled = self.sound_enabled, "sound toggled");
        self.sound_enabled
    }

    pub fn set_force_muted(&mut self, muted: bool) {
        self.force_muted = muted;
    }

    pub fn mode(&self) -> SoundMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SoundMode) {
        self.mode = mode;
    }

    pub fn active_handle(&self) -> Option<AudioHandle> {
        self.active
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Starts `url` unless the gate is muted, the url is blank or another
    /// sound is still playing. A backend failure is logged and treated like a
    /// refusal.
    pub fn try_play(
        &mut self,
        url: &str,
        backend: &mut dyn AudioBackend,
    ) -> Option<StartedPlayback> {
        if self.force_muted {
            tracing::debug!(url, "playback refused: force-muted");
            return None;
        }
        if !self.sound_enabled {
            tracing::debug!(url, "playback refused: sound disabled");
            return None;
        }
        if url.trim().is_empty() {
            tracing::warn!("playback refused: empty sound url");
            return None;
        }
        if let Some(active) = self.active {
            tracing::debug!(
                url,
                active = active.raw(),
                "playback refused: sound already playing"
            );
            return None;
        }

        match backend.play(url) {
            Ok(started) => {
                tracing::info!(url, handle = started.handle.raw(), "playback started");
                self.active = Some(started.handle);
                Some(started)
            }
            Err(err) => {
                tracing::error!(url, %err, "playback failed to start");
                None
            }
        }
    }

    /// Handles an end/error notification. The slot is cleared only when it
    /// still refers to the notifying handle. Returns whether it was cleared.
    pub fn on_event(&mut self, event: PlaybackEvent) -> bool {
        if let PlaybackEvent::Errored(handle) = event {
            tracing::error!(handle = handle.raw(), "playback errored");
        }

        if self.active == Some(event.handle()) {
            self.active = None;
            true
        } else {
            tracing::debug!(
                handle = event.handle().raw(),
                "stale playback notification ignored"
            );
            false
        }
    }

    /// Releases the slot regardless of the sound's state. The only way out
    /// of a sound that never signals completion.
    pub fn clear(&mut self) {
        if let Some(handle) = self.active.take() {
            tracing::warn!(handle = handle.raw(), "active playback cleared manually");
        }
    }
}

/// Backend whose sounds last a known amount of time. Stands in for a real
/// audio device on targets without one; completion is delivered through the
/// timeline using [`StartedPlayback::duration`].
#[derive(Debug)]
pub struct TimedAudioBackend {
    next_handle: u64,
    default_duration: Option<Duration>,
    durations: HashMap<String, Duration>,
    failing: HashSet<String>,
    played: Vec<String>,
}

impl Default for TimedAudioBackend {
    fn default() -> Self {
        Self::new(Some(Duration::from_millis(1_500)))
    }
}

impl TimedAudioBackend {
    /// `default_duration` of `None` produces sounds that never end on their own.
    pub fn new(default_duration: Option<Duration>) -> Self {
        Self {
            next_handle: 1,
            default_duration,
            durations: HashMap::new(),
            failing: HashSet::new(),
            played: Vec::new(),
        }
    }

    pub fn with_duration(mut self, url: impl Into<String>, duration: Duration) -> Self {
        self.durations.insert(url.into(), duration);
        self
    }

    /// Makes every attempt to play `url` fail to start.
    pub fn failing_on(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Urls that started playing, in order.
    pub fn played(&self) -> &[String] {
        &self.played
    }
}

impl AudioBackend for TimedAudioBackend {
    fn play(&mut self, url: &str) -> Result<StartedPlayback> {
        if self.failing.contains(url) {
            return Err(ButtonError::playback(url, "decoder rejected the stream"));
        }

        let handle = AudioHandle::new(self.next_handle);
        self.next_handle += 1;
        self.played.push(url.to_string());

        Ok(StartedPlayback {
            handle,
            duration: self.durations.get(url).copied().or(self.default_duration),
        })
    }
}
