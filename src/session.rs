use std::time::Instant;

use crate::difficulty::{Difficulty, GameMode};
use crate::stimulus::{Stimulus, StimulusId};
use crate::timer::{TimerEvent, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// no run in progress; the resting state between runs
    Idle,
    /// fixed countdown before the first stimulus of a run
    Preparing,
    /// timer armed, stimulus not yet visible
    Waiting,
    /// stimulus visible, awaiting a click
    Presented,
    /// a click was scored; the next stimulus is armed after a short pause
    Resolved,
}

/// The at-most-one stimulus a session owns
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingStimulus {
    Scheduled { timer: TimerHandle, id: StimulusId },
    Presented(Stimulus),
}

impl PendingStimulus {
    pub fn id(&self) -> StimulusId {
        match self {
            PendingStimulus::Scheduled { id, .. } => *id,
            PendingStimulus::Presented(s) => s.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub active: bool,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub current_score: u64,
    /// never decreases
    pub best_score: u64,
    pub pending_stimulus: Option<PendingStimulus>,
    pub stimulus_shown_at: Option<Instant>,
    pub phase: Phase,
    /// bumped whenever a run starts, resumes or stops
    pub epoch: u64,
    /// a run has been started at least once, so it can be continued
    pub has_session: bool,
    /// countdown or re-arm timer, whichever is outstanding
    pub phase_timer: Option<TimerHandle>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(0, GameMode::default(), Difficulty::default())
    }
}

impl GameSession {
    pub fn new(best_score: u64, mode: GameMode, difficulty: Difficulty) -> Self {
        Self {
            active: false,
            mode,
            difficulty,
            current_score: 0,
            best_score,
            pending_stimulus: None,
            stimulus_shown_at: None,
            phase: Phase::Idle,
            epoch: 0,
            has_session: false,
            phase_timer: None,
        }
    }

    /// The stimulus currently on screen, if any
    pub fn presented(&self) -> Option<&Stimulus> {
        match &self.pending_stimulus {
            Some(PendingStimulus::Presented(s)) => Some(s),
            _ => None,
        }
    }

    pub fn can_continue(&self) -> bool {
        !self.active && self.has_session
    }

    /// Nothing is running and nothing is scheduled
    pub fn is_resting(&self) -> bool {
        !self.active
            && self.phase == Phase::Idle
            && self.pending_stimulus.is_none()
            && self.phase_timer.is_none()
    }

    /// Starts a new epoch, invalidating every callback scheduled under the old one
    pub fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// A timer callback belongs to a discarded run, or the run is no longer active
    pub fn is_stale(&self, event: &TimerEvent) -> bool {
        !self.active || event.epoch() != self.epoch
    }

    pub fn invariants_hold(&self) -> bool {
        let shown_implies_pending =
            self.stimulus_shown_at.is_none() || self.pending_stimulus.is_some();
        let inactive_implies_clear = self.active
            || (self.pending_stimulus.is_none() && self.phase_timer.is_none());
        let presented_matches_phase =
            self.presented().is_some() == (self.phase == Phase::Presented);

        shown_implies_pending && inactive_implies_clear && presented_matches_phase
    }
}
