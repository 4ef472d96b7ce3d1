use std::{fmt, time::Duration};

use crate::{
    AnimationEstimator, AppConfig, ButtonError, CascadeTiming, ContentCatalog, ContentItem,
    Display, FontConfig, Result, TimerEvent, TimerId, Timers, WordLayout,
};

/// Sub-waits a transition is still blocked on. Each holds the id of the
/// timer that will release it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingWaits {
    pub word: Option<TimerId>,
    pub image: Option<TimerId>,
}

impl PendingWaits {
    pub fn is_empty(&self) -> bool {
        self.word.is_none() && self.image.is_none()
    }

    fn timers(&self) -> impl Iterator<Item = TimerId> {
        self.word.into_iter().chain(self.image)
    }
}

/// Readiness of the screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Content is fully shown; navigation is accepted.
    #[default]
    Idle,
    /// An entrance is on screen; navigation is rejected until every pending
    /// wait is released.
    Transitioning(PendingWaits),
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The item is on screen and its entrance is being timed.
    Started { index: usize },
    /// The item had nothing to animate and is ready immediately.
    Completed { index: usize },
    /// A transition was already in flight; nothing changed.
    Ignored,
}

/// Owns the current position in the catalog and gates navigation while an
/// entrance animation is running.
pub struct TransitionSequencer {
    catalog: ContentCatalog,
    current_index: usize,
    phase: Phase,
    animation_complete: bool,
    estimator: Box<dyn AnimationEstimator>,
    font: FontConfig,
    image_transition: Option<Duration>,
}

impl TransitionSequencer {
    pub fn new(catalog: ContentCatalog, config: &AppConfig) -> Self {
        Self {
            catalog,
            current_index: 0,
            phase: Phase::Idle,
            animation_complete: false,
            estimator: Box::new(CascadeTiming::from_config(&config.timing)),
            font: config.font.clone(),
            image_transition: config.timing.image_transition(),
        }
    }

    /// Replaces the timing estimate, e.g. with one backed by a renderer that
    /// knows its real animation length.
    pub fn with_estimator(mut self, estimator: Box<dyn AnimationEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> &ContentItem {
        &self.catalog.items()[self.current_index]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn animation_complete(&self) -> bool {
        self.animation_complete
    }

    /// Shows the item at `index` and starts timing its entrance.
    ///
    /// Rejected without any state change while a transition is in flight.
    pub fn advance_to(
        &mut self,
        index: usize,
        display: &mut dyn Display,
        timers: &mut dyn Timers,
    ) -> Result<Transition> {
        if index >= self.catalog.len() {
            let err = ButtonError::InvalidIndex {
                index,
                len: self.catalog.len(),
            };
            tracing::warn!(%err, "navigation rejected");
            return Err(err);
        }
        if self.is_busy() {
            tracing::debug!(
                index,
                current = self.current_index,
                "ignored: transition already in progress"
            );
            return Ok(Transition::Ignored);
        }

        self.cancel_pending(timers);
        self.animation_complete = false;
        self.current_index = index;

        let item = &self.catalog.items()[index];
        display.show_background(&item.image_ref);
        let layout =
            WordLayout::compose(&item.display_name, self.estimator.as_ref(), &self.font);
        tracing::info!(
            index,
            word = %layout.text,
            duration_ms = layout.duration.as_millis() as u64,
            "transition started"
        );

        if !display.show_word(&layout) {
            tracing::debug!(index, "nothing to animate; ready immediately");
            self.phase = Phase::Idle;
            return Ok(Transition::Completed { index });
        }

        let waits = PendingWaits {
            word: Some(timers.schedule(layout.duration, TimerEvent::WordAnimation)),
            image: self
                .image_transition
                .map(|fade| timers.schedule(fade, TimerEvent::ImageTransition)),
        };
        self.phase = Phase::Transitioning(waits);
        Ok(Transition::Started { index })
    }

    pub fn next(
        &mut self,
        display: &mut dyn Display,
        timers: &mut dyn Timers,
    ) -> Result<Transition> {
        if self.is_busy() {
            tracing::debug!("ignored next: transition already in progress");
            return Ok(Transition::Ignored);
        }
        self.advance_to(self.catalog.next_index(self.current_index), display, timers)
    }

    pub fn previous(
        &mut self,
        display: &mut dyn Display,
        timers: &mut dyn Timers,
    ) -> Result<Transition> {
        if self.is_busy() {
            tracing::debug!("ignored previous: transition already in progress");
            return Ok(Transition::Ignored);
        }
        self.advance_to(self.catalog.previous_index(self.current_index), display, timers)
    }

    /// Delivers a fired timer. Returns true when it made the screen ready.
    pub fn on_timer(&mut self, id: TimerId, event: TimerEvent) -> bool {
        let Phase::Transitioning(mut waits) = self.phase else {
            tracing::debug!(?id, ?event, "timer fired while idle; ignored");
            return false;
        };

        match event {
            TimerEvent::WordAnimation if waits.word == Some(id) => {
                waits.word = None;
                self.animation_complete = true;
                tracing::debug!(index = self.current_index, "word animation finished");
            }
            TimerEvent::ImageTransition if waits.image == Some(id) => {
                waits.image = None;
                tracing::debug!(index = self.current_index, "image transition finished");
            }
            _ => {
                tracing::debug!(?id, ?event, "stale timer ignored");
                return false;
            }
        }

        let ready = waits.is_empty();
        self.phase = if ready {
            tracing::info!(index = self.current_index, "content ready");
            Phase::Idle
        } else {
            Phase::Transitioning(waits)
        };
        self.animation_complete = false;
        ready
    }

    /// Swaps the catalog, returning to its first item with nothing pending.
    pub fn set_catalog(&mut self, catalog: ContentCatalog, timers: &mut dyn Timers) {
        self.cancel_pending(timers);
        tracing::info!(catalog = catalog.name(), items = catalog.len(), "catalog swapped");
        self.catalog = catalog;
        self.current_index = 0;
        self.phase = Phase::Idle;
        self.animation_complete = false;
    }

    fn cancel_pending(&mut self, timers: &mut dyn Timers) {
        if let Phase::Transitioning(waits) = self.phase {
            for id in waits.timers() {
                timers.cancel(id);
            }
        }
    }
}

impl fmt::Debug for TransitionSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionSequencer")
            .field("catalog", &self.catalog.name())
            .field("current_index", &self.current_index)
            .field("phase", &self.phase)
            .field("animation_complete", &self.animation_complete)
            .field("image_transition", &self.image_transition)
            .finish()
    }
}
