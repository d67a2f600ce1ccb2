use std::time::{Duration, Instant};

use crate::stimulus::StimulusId;

/// Opaque handle for a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What to do when a timer fires. Every variant carries the session epoch it was
/// scheduled under so a late callback from a discarded run can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// "get ready" countdown before the first stimulus of a run
    Countdown { epoch: u64 },
    /// the delay before a stimulus has elapsed
    StimulusDue { epoch: u64, stimulus: StimulusId },
    /// pause after a scored click before the next stimulus is armed
    Rearm { epoch: u64 },
}

impl TimerEvent {
    pub fn epoch(&self) -> u64 {
        match *self {
            TimerEvent::Countdown { epoch }
            | TimerEvent::StimulusDue { epoch, .. }
            | TimerEvent::Rearm { epoch } => epoch,
        }
    }
}

/// Schedules callbacks after a delay. Cancelling an unknown or already fired
/// handle is a no-op.
pub trait TimerService {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle;
    /// Returns true if a pending timer was removed
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// A timer that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub at: Instant,
    pub handle: TimerHandle,
    pub event: TimerEvent,
}

#[derive(Debug, Clone)]
struct Entry {
    deadline: Instant,
    seq: u64,
    handle: TimerHandle,
    event: TimerEvent,
}

/// Deterministic timer queue driven by caller-supplied instants.
///
/// Delays are measured from the queue's notion of "now", which only moves forward.
/// While draining due timers the clock is set to each timer's deadline, so callbacks
/// scheduled from inside a handler are timed from the moment their parent fired.
#[derive(Debug, Clone)]
pub struct TimerQueue {
    now: Instant,
    next_seq: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_seq: 0,
            entries: Vec::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance_to(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Earliest outstanding deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<Fired> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.seq))
            .map(|(i, _)| i);

        match idx {
            Some(i) => {
                let entry = self.entries.remove(i);
                self.advance_to(entry.deadline);
                Some(Fired {
                    at: entry.deadline,
                    handle: entry.handle,
                    event: entry.event,
                })
            }
            None => {
                self.advance_to(now);
                None
            }
        }
    }
}

impl TimerService for TimerQueue {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TimerHandle(seq);
        self.entries.push(Entry {
            deadline: self.now + delay,
            seq,
            handle,
            event,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }
}
