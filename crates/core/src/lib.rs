//! Core library for the Big Red Button application.
//!
//! A single screen shows a background picture and a word that falls onto it
//! letter by letter. Pressing the big button moves to the next picture and
//! plays a sound. This crate holds the engine behind that screen: the
//! sequencer that gates navigation while an entrance is animating, the gate
//! that keeps sounds from overlapping, and the dispatcher translating input
//! into both. Rendering and audio output are collaborators supplied through
//! the [`Display`] and [`AudioBackend`] traits.

pub mod animation;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod input;
pub mod sequencer;
pub mod timeline;

pub use animation::{
    calculate_font_size, word_animation_duration, AnimationEstimator, CascadeTiming, WordLayout,
};
pub use audio::{
    resolve_sound_url, AudioBackend, AudioHandle, PlaybackEvent, PlaybackGate, SoundMode,
    StartedPlayback, TimedAudioBackend,
};
pub use catalog::{CatalogSet, ContentCatalog, ContentItem};
pub use config::{AppConfig, FontConfig, InputConfig, SoundConfig, SwipeConfig, TimingConfig};
pub use dispatcher::InteractionDispatcher;
pub use display::{Display, DisplayCommand, RecordingDisplay};
pub use error::{ButtonError, Result};
pub use input::{recognize_swipe, InputEvent, PointerSample, SwipeDirection, SwipeTracker};
pub use sequencer::{PendingWaits, Phase, Transition, TransitionSequencer};
pub use timeline::{FiredTimer, PlaybackClock, TimerEvent, TimerId, Timeline, Timers};
