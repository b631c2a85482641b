//! Session-owned timers on a single virtual clock.
//!
//! Every periodic or delayed activity of a run (elapsed clock, fade
//! countdowns, removals, auto-play) is a [`Timer`] in one [`TimerQueue`].
//! The owner advances the queue and handles due timers one at a time, so
//! timer callbacks are serialized and never interleave.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// advance the elapsed clock by one step
    Clock,
    /// decrement the countdown of a fading target
    Countdown(u32),
    /// drop a fading target from the field
    Removal(u32),
    /// let auto-play hit the next target
    AutoPlay,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position of the virtual clock
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn schedule_once(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.push(kind, delay, None)
    }

    /// Fires every `period`, first one `period` from now
    pub fn schedule_repeating(&mut self, kind: TimerKind, period: Duration) -> TimerId {
        // a zero period would fire forever within a single advance
        let period = period.max(Duration::from_millis(1));
        self.push(kind, period, Some(period))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to its
    /// due time. Repeating timers are re-armed for their next period.
    ///
    /// Call in a loop; the handler may schedule or cancel between pops.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, TimerKind)> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(idx, _)| idx)?;

        let Timer {
            id,
            kind,
            due,
            period,
        } = self.timers[idx];
        self.now = self.now.max(due);

        // a repeating timer whose next period would pass the end of time retires
        match period.and_then(|period| due.checked_add(period)) {
            Some(next) => self.timers[idx].due = next,
            None => {
                self.timers.swap_remove(idx);
            }
        }

        Some((id, kind))
    }

    /// Moves the clock to `until` once every due timer has been popped
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn push(&mut self, kind: TimerKind, delay: Duration, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            due: self.now.saturating_add(delay),
            period,
        });
        id
    }
}
