use std::time::Duration;

use crate::{
    resolve_sound_url, AppConfig, AudioBackend, ButtonError, CatalogSet, Display, InputEvent,
    PlaybackEvent, PlaybackGate, Result, SwipeDirection, SwipeTracker, TimerEvent, Timeline,
    Timers, Transition, TransitionSequencer,
};

/// Turns raw input into sequencer and playback calls.
///
/// The dispatcher owns all session state. Collaborators (display and audio)
/// are borrowed per call, so the same engine can drive a browser, a test
/// double or the command line recorder.
#[derive(Debug)]
pub struct InteractionDispatcher {
    config: AppConfig,
    catalogs: CatalogSet,
    sequencer: TransitionSequencer,
    gate: PlaybackGate,
    timeline: Timeline,
    swipes: SwipeTracker,
    inert: bool,
}

impl InteractionDispatcher {
    pub fn new(config: AppConfig, catalogs: CatalogSet) -> Self {
        let sequencer = TransitionSequencer::new(catalogs.first().clone(), &config);
        let gate = PlaybackGate::new(&config.sound);
        let swipes = SwipeTracker::new(config.swipe.clone());
        Self {
            config,
            catalogs,
            sequencer,
            gate,
            timeline: Timeline::new(),
            swipes,
            inert: false,
        }
    }

    pub fn sequencer(&self) -> &TransitionSequencer {
        &self.sequencer
    }

    pub fn gate(&self) -> &PlaybackGate {
        &self.gate
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn catalogs(&self) -> &CatalogSet {
        &self.catalogs
    }

    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    pub fn is_busy(&self) -> bool {
        self.sequencer.is_busy()
    }

    /// True when the display lacked a required element at start-up.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Checks the display and plays the entrance of the first item.
    ///
    /// A display without its required elements leaves every control inert.
    pub fn start(&mut self, display: &mut dyn Display) -> Result<Transition> {
        if let Some(element) = display.missing_element() {
            let err = ButtonError::ConfigurationMissing(element);
            tracing::error!(%err, "controls disabled");
            self.inert = true;
            display.set_control_enabled(false);
            return Err(err);
        }

        self.inert = false;
        tracing::info!(catalog = self.sequencer.catalog().name(), "session started");
        self.enter(display)
    }

    /// Routes one input event. Failures are logged and never escape.
    pub fn handle(
        &mut self,
        event: InputEvent,
        display: &mut dyn Display,
        audio: &mut dyn AudioBackend,
    ) {
        if self.inert {
            tracing::debug!(?event, "input ignored: controls are inert");
            return;
        }

        match event {
            InputEvent::PressStart => self.press(display, audio),
            InputEvent::PressEnd => self.release(display),
            InputEvent::Tap => self.tap(audio),
            InputEvent::Swipe(direction) => self.swipe(direction, display),
            InputEvent::PointerDown(sample) => self.swipes.begin(sample),
            InputEvent::PointerUp(sample) => {
                if let Some(direction) = self.swipes.finish(sample) {
                    self.swipe(direction, display);
                }
            }
            InputEvent::ToggleSound => {
                self.gate.toggle_sound();
            }
            InputEvent::SetForceMuted(muted) => {
                tracing::info!(muted, "force mute changed");
                self.gate.set_force_muted(muted);
            }
            InputEvent::SetSoundMode(mode) => {
                tracing::info!(?mode, "sound mode changed");
                self.gate.set_mode(mode);
            }
            InputEvent::SelectLevel(name) => {
                if let Err(err) = self.select_level(&name, display) {
                    tracing::error!(%err, level = %name, "level switch failed");
                    display.alert(&err.to_string());
                }
            }
        }
    }

    /// Big button pressed: bounce and advance when idle, and in any case
    /// try to play the sound of the item now on screen.
    pub fn press(&mut self, display: &mut dyn Display, audio: &mut dyn AudioBackend) {
        if self.ignore_inert("press") {
            return;
        }
        display.set_pressed(true);

        if self.sequencer.is_busy() {
            tracing::debug!("press during entrance: bounce and advance suppressed");
        } else {
            display.bounce();
            if self.config.input.advance_on_press {
                let outcome = self.sequencer.next(display, &mut self.timeline);
                Self::after_navigation(outcome, display);
            }
        }

        self.play_current_sound(audio);
    }

    /// Only undoes the pressed look.
    pub fn release(&mut self, display: &mut dyn Display) {
        display.set_pressed(false);
    }

    /// Word tapped: same sound path as a press, whatever the busy state.
    pub fn tap(&mut self, audio: &mut dyn AudioBackend) {
        if self.ignore_inert("tap") {
            return;
        }
        self.play_current_sound(audio);
    }

    pub fn swipe(&mut self, direction: SwipeDirection, display: &mut dyn Display) {
        if self.ignore_inert("swipe") {
            return;
        }
        if self.sequencer.is_busy() {
            tracing::debug!(?direction, "swipe ignored: transition already in progress");
            return;
        }

        let outcome = match direction {
            SwipeDirection::Left => self.sequencer.next(display, &mut self.timeline),
            SwipeDirection::Right => self.sequencer.previous(display, &mut self.timeline),
        };
        Self::after_navigation(outcome, display);
    }

    /// Switches to another level and plays the entrance of its first item.
    pub fn select_level(&mut self, name: &str, display: &mut dyn Display) -> Result<Transition> {
        let catalog = self.catalogs.level(name)?.clone();
        self.sequencer.set_catalog(catalog, &mut self.timeline);
        self.enter(display)
    }

    /// Completion reported by an audio backend outside of the timeline.
    pub fn notify_playback(&mut self, event: PlaybackEvent) -> bool {
        self.gate.on_event(event)
    }

    /// Releases a sound that never reported completion.
    pub fn clear_playback(&mut self) {
        self.gate.clear();
    }

    /// Moves session time forward by `delta`, delivering every timer that
    /// comes due on the way. Returns how many timers fired.
    pub fn advance(&mut self, delta: Duration, display: &mut dyn Display) -> usize {
        let until = self.timeline.now() + delta;
        let mut fired = 0;

        while let Some(timer) = self.timeline.pop_due(until) {
            fired += 1;
            match timer.event {
                TimerEvent::PlaybackEnded(handle) => {
                    self.gate.on_event(PlaybackEvent::Ended(handle));
                }
                event => {
                    if self.sequencer.on_timer(timer.id, event) {
                        display.set_control_enabled(true);
                    }
                }
            }
        }

        self.timeline.settle_at(until);
        fired
    }

    /// Runs the timeline until nothing is pending.
    pub fn run_until_idle(&mut self, display: &mut dyn Display) -> usize {
        let mut fired = 0;
        while let Some(due) = self.timeline.next_due() {
            fired += self.advance(due.saturating_sub(self.timeline.now()), display);
        }
        fired
    }

    fn enter(&mut self, display: &mut dyn Display) -> Result<Transition> {
        let outcome = self.sequencer.advance_to(0, display, &mut self.timeline);
        if let Ok(transition) = &outcome {
            Self::sync_control(*transition, display);
        }
        outcome
    }

    fn after_navigation(outcome: Result<Transition>, display: &mut dyn Display) {
        match outcome {
            Ok(transition) => Self::sync_control(transition, display),
            Err(err) => tracing::error!(%err, "navigation failed"),
        }
    }

    /// An item that is ready at once re-enables the button itself; a
    /// cancelled cycle never delivers its own re-enable.
    fn sync_control(transition: Transition, display: &mut dyn Display) {
        match transition {
            Transition::Started { .. } => display.set_control_enabled(false),
            Transition::Completed { .. } => display.set_control_enabled(true),
            Transition::Ignored => {}
        }
    }

    fn ignore_inert(&self, input: &str) -> bool {
        if self.inert {
            tracing::debug!(input, "input ignored: controls are inert");
        }
        self.inert
    }

    fn play_current_sound(&mut self, audio: &mut dyn AudioBackend) {
        let item = self.sequencer.current_item();
        let mode = self.gate.mode();
        let Some(url) = resolve_sound_url(item, mode) else {
            tracing::warn!(
                item = %item.display_name,
                ?mode,
                "no sound for item; playback skipped"
            );
            return;
        };

        if let Some(started) = self.gate.try_play(url, audio) {
            if let Some(duration) = started.duration {
                self.timeline
                    .schedule(duration, TimerEvent::PlaybackEnded(started.handle));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ContentCatalog, ContentItem, DisplayCommand, PointerSample, RecordingDisplay, SoundMode,
        TimedAudioBackend,
    };

    fn catalogs() -> CatalogSet {
        let zoo = ContentCatalog::new(
            "zoo",
            vec![
                ContentItem::new(1, "Cat", "/img/cat.jpg")
                    .with_animal_sound("/snd/meow.mp3")
                    .with_spoken_word("/snd/cat.mp3"),
                ContentItem::new(2, "Crocodiles", "/img/croc.jpg")
                    .with_animal_sound("/snd/snap.mp3"),
            ],
        )
        .unwrap();
        let farm =
            ContentCatalog::new("farm", vec![ContentItem::new(1, "Cow", "/img/cow.jpg")]).unwrap();
        let blank =
            ContentCatalog::new("blank", vec![ContentItem::new(1, "", "/img/empty.jpg")]).unwrap();
        CatalogSet::new(vec![zoo, farm, blank]).unwrap()
    }

    fn started() -> (InteractionDispatcher, RecordingDisplay, TimedAudioBackend) {
        let mut dispatcher = InteractionDispatcher::new(AppConfig::default(), catalogs());
        let mut display = RecordingDisplay::new();
        dispatcher.start(&mut display).unwrap();
        dispatcher.run_until_idle(&mut display);
        display.take_commands();
        (dispatcher, display, TimedAudioBackend::new(None))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn start_plays_entrance_of_first_item() {
        let mut dispatcher = InteractionDispatcher::new(AppConfig::default(), catalogs());
        let mut display = RecordingDisplay::new();

        let outcome = dispatcher.start(&mut display).unwrap();
        assert_eq!(outcome, Transition::Started { index: 0 });
        assert!(dispatcher.is_busy());
        assert_eq!(display.last_word(), Some("Cat"));

        dispatcher.advance(ms(2_200), &mut display);
        assert!(!dispatcher.is_busy());
        assert_eq!(display.commands().last(), Some(&DisplayCommand::ControlEnabled(true)));
    }

    #[test]
    fn missing_element_makes_controls_inert() {
        let mut dispatcher = InteractionDispatcher::new(AppConfig::default(), catalogs());
        let mut display = RecordingDisplay::missing("inner-button");
        let mut audio = TimedAudioBackend::new(None);

        let err = dispatcher.start(&mut display).unwrap_err();
        assert!(matches!(err, ButtonError::ConfigurationMissing("inner-button")));
        assert!(dispatcher.is_inert());

        dispatcher.handle(InputEvent::PressStart, &mut display, &mut audio);
        assert_eq!(dispatcher.sequencer().current_index(), 0);
        assert!(audio.played().is_empty());
        assert_eq!(display.commands(), [DisplayCommand::ControlEnabled(false)]);
    }

    #[test]
    fn direct_calls_respect_inert_controls() {
        let mut dispatcher = InteractionDispatcher::new(AppConfig::default(), catalogs());
        let mut display = RecordingDisplay::missing("animal-name-display");
        let mut audio = TimedAudioBackend::new(None);
        dispatcher.start(&mut display).unwrap_err();

        dispatcher.press(&mut display, &mut audio);
        dispatcher.tap(&mut audio);
        dispatcher.swipe(SwipeDirection::Left, &mut display);

        assert_eq!(dispatcher.sequencer().current_index(), 0);
        assert!(audio.played().is_empty());
        assert_eq!(display.commands(), [DisplayCommand::ControlEnabled(false)]);
    }

    #[test]
    fn level_switch_to_blank_item_re_enables_button() {
        let (mut dispatcher, mut display, mut audio) = started();

        dispatcher.handle(InputEvent::PressStart, &mut display, &mut audio);
        assert!(dispatcher.is_busy());
        dispatcher.handle(InputEvent::SelectLevel("blank".to_string()), &mut display, &mut audio);
        dispatcher.run_until_idle(&mut display);

        let last_enabled = display.commands().iter().rev().find_map(|command| match command {
            DisplayCommand::ControlEnabled(enabled) => Some(*enabled),
            _ => None,
        });
        assert!(!dispatcher.is_busy());
        assert_eq!(last_enabled, Some(true));
    }

    #[test]
    fn press_advances_and_plays_new_item() {
        let (mut dispatcher, mut display, mut audio) = started();

        dispatcher.handle(InputEvent::PressStart, &mut display, &mut audio);

        assert_eq!(dispatcher.sequencer().current_index(), 1);
        assert_eq!(display.count(&DisplayCommand::Bounce), 1);
        assert_eq!(audio.played(), ["/snd/snap.mp3"]);

        dispatcher.advance(ms(2_899), &mut display);
        assert!(dispatcher.is_busy());
        dispatcher.advance(ms(1), &mut display);
        assert!(!dispatcher.is_busy());
    }

    #[test]
    fn press_while_busy_plays_sound_without_bounce() {
        let mut dispatcher = InteractionDispatcher::new(AppConfig::default(), catalogs());
        let mut display = RecordingDisplay::new();
        let mut audio = TimedAudioBackend::new(Some(ms(100)));
        dispatcher.start(&mut display).unwrap();

        dispatcher.handle(InputEvent::PressStart, &mut display, &mut audio);
        dispatcher.handle(InputEvent::PressEnd, &mut display, &mut audio);

        assert_eq!(dispatcher.sequencer().current_index(), 0);
        assert_eq!(display.count(&DisplayCommand::Bounce), 0);
        assert_eq!(display.count(&DisplayCommand::Pressed(false)), 1);
        assert_eq!(audio.played(), ["/snd/meow.mp3"]);
    }

    #[test]
    fn rapid_taps_do_not_overlap_sounds() {
        let (mut dispatcher, mut display, _) = started();
        let mut audio = TimedAudioBackend::new(Some(ms(800)));

        dispatcher.handle(InputEvent::Tap, &mut display, &mut audio);
        dispatcher.handle(InputEvent::Tap, &mut display, &mut audio);
        assert_eq!(audio.played().len(), 1);

        dispatcher.advance(ms(800), &mut display);
        dispatcher.handle(InputEvent::Tap, &mut display, &mut audio);
        assert_eq!(audio.played().len(), 2);
    }

    #[test]
    fn stuck_sound_blocks_until_cleared() {
        let (mut dispatcher, mut display, mut audio) = started();

        dispatcher.tap(&mut audio);
        dispatcher.advance(ms(60_000), &mut display);
        dispatcher.tap(&mut audio);
        assert_eq!(audio.played().len(), 1);

        dispatcher.clear_playback();
        dispatcher.tap(&mut audio);
        assert_eq!(audio.played().len(), 2);
    }

    #[test]
    fn externally_reported_completion_releases_gate() {
        let (mut dispatcher, _display, mut audio) = started();

        dispatcher.tap(&mut audio);
        let handle = dispatcher.gate().active_handle().unwrap();
        assert!(dispatcher.notify_playback(PlaybackEvent::Errored(handle)));
        assert!(!dispatcher.gate().is_playing());
    }

    #[test]
    fn spoken_word_without_reference_is_skipped() {
        let (mut dispatcher, mut display, mut audio) = started();
        dispatcher.handle(
            InputEvent::SetSoundMode(SoundMode::SpokenWord),
            &mut display,
            &mut audio,
        );
        dispatcher.handle(InputEvent::Swipe(SwipeDirection::Left), &mut display, &mut audio);
        dispatcher.run_until_idle(&mut display);

        dispatcher.handle(InputEvent::Tap, &mut display, &mut audio);
        assert!(audio.played().is_empty());
        assert!(dispatcher.gate().active_handle().is_none());
    }

    #[test]
    fn swipes_navigate_only_when_idle() {
        let (mut dispatcher, mut display, mut audio) = started();

        dispatcher.handle(InputEvent::Swipe(SwipeDirection::Right), &mut display, &mut audio);
        assert_eq!(dispatcher.sequencer().current_index(), 1);

        dispatcher.handle(InputEvent::Swipe(SwipeDirection::Left), &mut display, &mut audio);
        assert_eq!(dispatcher.sequencer().current_index(), 1);

        dispatcher.run_until_idle(&mut display);
        dispatcher.handle(InputEvent::Swipe(SwipeDirection::Left), &mut display, &mut audio);
        assert_eq!(dispatcher.sequencer().current_index(), 0);
    }

    #[test]
    fn pointer_gesture_becomes_swipe() {
        let (mut dispatcher, mut display, mut audio) = started();
        let now = dispatcher.now();

        dispatcher.handle(
            InputEvent::PointerDown(PointerSample::new(400.0, 200.0, now)),
            &mut display,
            &mut audio,
        );
        dispatcher.handle(
            InputEvent::PointerUp(PointerSample::new(320.0, 210.0, now + ms(250))),
            &mut display,
            &mut audio,
        );

        assert_eq!(dispatcher.sequencer().current_index(), 1);
    }

    #[test]
    fn level_switch_resets_to_first_item() {
        let (mut dispatcher, mut display, mut audio) = started();
        dispatcher.handle(InputEvent::PressStart, &mut display, &mut audio);

        dispatcher.handle(InputEvent::SelectLevel("farm".to_string()), &mut display, &mut audio);

        assert_eq!(dispatcher.sequencer().catalog().name(), "farm");
        assert_eq!(dispatcher.sequencer().current_index(), 0);
        assert_eq!(display.last_word(), Some("Cow"));
        assert!(dispatcher.is_busy());
    }

    #[test]
    fn unknown_level_raises_alert() {
        let (mut dispatcher, mut display, mut audio) = started();

        dispatcher.handle(InputEvent::SelectLevel("space".to_string()), &mut display, &mut audio);

        assert_eq!(dispatcher.sequencer().catalog().name(), "zoo");
        assert!(display
            .commands()
            .iter()
            .any(|command| matches!(command, DisplayCommand::Alert(msg) if msg.contains("space"))));
    }

    #[test]
    fn press_without_advance_only_bounces() {
        let mut config = AppConfig::default();
        config.input.advance_on_press = false;
        let mut dispatcher = InteractionDispatcher::new(config, catalogs());
        let mut display = RecordingDisplay::new();
        let mut audio = TimedAudioBackend::new(None);
        dispatcher.start(&mut display).unwrap();
        dispatcher.run_until_idle(&mut display);

        dispatcher.press(&mut display, &mut audio);

        assert_eq!(dispatcher.sequencer().current_index(), 0);
        assert_eq!(display.count(&DisplayCommand::Bounce), 1);
        assert_eq!(audio.played(), ["/snd/meow.mp3"]);
    }
}
