use std::time::Duration;

use crate::AudioHandle;

/// Virtual session clock. Time only moves when the driver advances it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Moves the clock forward to `instant`; never moves it backwards.
    pub fn advance_to(&mut self, instant: Duration) {
        self.elapsed = self.elapsed.max(instant);
    }
}

/// Identifier returned by [`Timers::schedule`], used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Callbacks the engine can ask the timeline to deliver later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The falling-word cascade has finished.
    WordAnimation,
    /// The background cross-fade has finished.
    ImageTransition,
    /// A timed audio backend reports that a sound ran to its end.
    PlaybackEnded(AudioHandle),
}

/// Timer capability used by the sequencer. The sequencer never waits; it
/// schedules an event and is resumed when the event is delivered.
pub trait Timers {
    fn schedule(&mut self, after: Duration, event: TimerEvent) -> TimerId;

    /// Cancels a pending timer. Returns false if it already fired or never
    /// existed.
    fn cancel(&mut self, id: TimerId) -> bool;
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub event: TimerEvent,
}

#[derive(Debug, Clone)]
struct ScheduledTimer {
    id: TimerId,
    due: Duration,
    event: TimerEvent,
}

/// Single-threaded timer queue driven by a [`PlaybackClock`].
#[derive(Debug, Default)]
pub struct Timeline {
    clock: PlaybackClock,
    next_id: u64,
    pending: Vec<ScheduledTimer>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Instant of the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|timer| timer.due).min()
    }

    /// Removes and returns the earliest timer due at or before `until`,
    /// moving the clock to its due instant. Timers due at the same instant
    /// fire in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<FiredTimer> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(position, _)| position)?;

        let timer = self.pending.remove(position);
        self.clock.advance_to(timer.due);
        Some(FiredTimer {
            id: timer.id,
            event: timer.event,
        })
    }

    /// Moves the clock to `instant` without firing anything. Callers drain
    /// [`Timeline::pop_due`] first.
    pub fn settle_at(&mut self, instant: Duration) {
        self.clock.advance_to(instant);
    }
}

impl Timers for Timeline {
    fn schedule(&mut self, after: Duration, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.clock.elapsed() + after;
        tracing::trace!(?id, ?event, due_ms = due.as_millis() as u64, "timer scheduled");
        self.pending.push(ScheduledTimer { id, due, event });
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        before != self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fires_in_due_order() {
        let mut timeline = Timeline::new();
        let late = timeline.schedule(ms(300), TimerEvent::WordAnimation);
        let early = timeline.schedule(ms(100), TimerEvent::ImageTransition);

        let first = timeline.pop_due(ms(1_000)).unwrap();
        assert_eq!(first.id, early);
        assert_eq!(timeline.now(), ms(100));

        let second = timeline.pop_due(ms(1_000)).unwrap();
        assert_eq!(second.id, late);
        assert_eq!(timeline.now(), ms(300));
        assert!(timeline.pop_due(ms(1_000)).is_none());
    }

    #[test]
    fn does_not_fire_before_due() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(500), TimerEvent::WordAnimation);

        assert!(timeline.pop_due(ms(499)).is_none());
        timeline.settle_at(ms(499));
        assert_eq!(timeline.now(), ms(499));
        assert!(timeline.pop_due(ms(500)).is_some());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timeline = Timeline::new();
        let id = timeline.schedule(ms(10), TimerEvent::WordAnimation);

        assert!(timeline.cancel(id));
        assert!(!timeline.cancel(id));
        assert!(timeline.pop_due(ms(100)).is_none());
    }

    #[test]
    fn schedules_relative_to_current_time() {
        let mut timeline = Timeline::new();
        timeline.settle_at(ms(1_000));
        timeline.schedule(ms(250), TimerEvent::ImageTransition);
        assert_eq!(timeline.next_due(), Some(ms(1_250)));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut clock = PlaybackClock::default();
        clock.advance_to(ms(40));
        clock.advance_to(ms(10));
        assert_eq!(clock.elapsed(), ms(40));
    }
}
