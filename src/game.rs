use std::time::{Duration, Instant};

use crate::difficulty::{Difficulty, GameMode};
use crate::ports::{Effect, Presentation};
use crate::scheduler::StimulusScheduler;
use crate::scorer::{self, ScoreResult};
use crate::session::{GameSession, Phase};
use crate::settings::{Settings, SettingsStore};
use crate::stimulus::{Playfield, Stimulus, StimulusId};
use crate::timer::{Fired, TimerEvent, TimerQueue, TimerService};

/// "Get ready" pause before the first stimulus of a run
pub const COUNTDOWN: Duration = Duration::from_millis(2000);
/// How long a result stays up before the next stimulus is armed
pub const RESULT_PAUSE: Duration = Duration::from_millis(1000);

pub const NEW_GAME_MESSAGE: &str = "Get ready!\nThe game starts in 2 seconds...";
pub const CONTINUE_MESSAGE: &str = "Get ready!\nThe game continues in 2 seconds...";
pub const STOPPED_MESSAGE: &str = "Paused. Choose Continue to resume.";

/// The application controller: the single actor that owns the session and
/// processes commands and timer callbacks one at a time.
#[derive(Debug)]
pub struct Game<P: Presentation, S: SettingsStore> {
    session: GameSession,
    scheduler: StimulusScheduler,
    timers: TimerQueue,
    presentation: P,
    store: S,
    settings: Settings,
}

impl<P: Presentation, S: SettingsStore> Game<P, S> {
    pub fn new(presentation: P, store: S, now: Instant) -> Self {
        Self::with_scheduler(
            presentation,
            store,
            StimulusScheduler::new(Playfield::default()),
            now,
        )
    }

    pub fn with_scheduler(
        presentation: P,
        store: S,
        scheduler: StimulusScheduler,
        now: Instant,
    ) -> Self {
        let settings = store.load();
        tracing::debug!(
            best_score = settings.best_score,
            mode = %settings.game_mode,
            difficulty = %settings.difficulty,
            "settings loaded"
        );
        Self {
            session: GameSession::new(settings.best_score, settings.game_mode, settings.difficulty),
            scheduler,
            timers: TimerQueue::new(now),
            presentation,
            store,
            settings,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Persisted preferences; may differ from the running session's mode
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn playfield(&self) -> Playfield {
        self.scheduler.playfield()
    }

    pub fn presented(&self) -> Option<&Stimulus> {
        self.session.presented()
    }

    pub fn can_continue(&self) -> bool {
        self.session.can_continue()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Starts a fresh run: score reset, any outstanding stimulus discarded
    pub fn new_game(&mut self, mode: GameMode, difficulty: Difficulty, now: Instant) {
        self.session.mode = mode;
        self.session.difficulty = difficulty;
        self.session.current_score = 0;
        tracing::debug!(%mode, %difficulty, "new game");
        self.start_run(now, NEW_GAME_MESSAGE);
    }

    /// Resumes a stopped run, keeping its score but picking up the saved mode and
    /// difficulty. Ignored when there is nothing to continue or a run is already in
    /// progress.
    pub fn continue_game(&mut self, now: Instant) -> bool {
        if !self.session.can_continue() {
            tracing::trace!("continue ignored");
            return false;
        }
        self.session.mode = self.settings.game_mode;
        self.session.difficulty = self.settings.difficulty;
        tracing::debug!(score = self.session.current_score, "continue game");
        self.start_run(now, CONTINUE_MESSAGE);
        true
    }

    pub fn stop(&mut self) {
        if self.session.is_resting() {
            tracing::trace!("stop ignored, nothing running");
            return;
        }
        self.session.active = false;
        self.discard_run();
        self.session.phase = Phase::Idle;
        self.presentation.clear_field();
        self.presentation.draw_idle_message(STOPPED_MESSAGE);
        tracing::debug!(score = self.session.current_score, "game stopped");
    }

    /// Persists new preferences. A run in progress keeps its mode and difficulty
    /// until the next `new_game`.
    pub fn change_settings(&mut self, mode: GameMode, difficulty: Difficulty) {
        self.settings.game_mode = mode;
        self.settings.difficulty = difficulty;
        self.settings.best_score = self.session.best_score;
        if let Err(e) = self.store.save(&self.settings) {
            tracing::warn!(error = %e, "failed to persist settings");
        }
    }

    /// A click at logical playfield coordinates. Misses and clicks while nothing is
    /// presented are ignored.
    pub fn click(&mut self, x: f64, y: f64, at: Instant) -> Option<ScoreResult> {
        if self.session.phase != Phase::Presented {
            return None;
        }
        let stimulus = *self.session.presented()?;
        if !self.presentation.hit_test(&stimulus, x, y) {
            tracing::trace!(x, y, "click missed");
            return None;
        }
        self.resolve(stimulus, x, y, at)
    }

    /// A click already resolved to a stimulus by the host's own hit-testing.
    /// Ids of superseded stimuli never score.
    pub fn click_stimulus(&mut self, id: StimulusId, at: Instant) -> Option<ScoreResult> {
        let stimulus = *self.session.presented()?;
        if stimulus.id != id {
            tracing::trace!(stimulus = %id, "click on stale stimulus");
            return None;
        }
        self.resolve(stimulus, stimulus.position.x, stimulus.position.y, at)
    }

    /// Fires every timer due at or before `now`, in deadline order.
    /// Returns how many fired.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(f) = self.timers.pop_due(now) {
            self.on_timer(f, now);
            fired += 1;
        }
        fired
    }

    /// `now` is when the host got round to polling; a stimulus becomes visible then,
    /// not at its deadline.
    fn on_timer(&mut self, fired: Fired, now: Instant) {
        if self.session.is_stale(&fired.event) {
            tracing::trace!(event = ?fired.event, "stale timer callback");
            return;
        }

        match fired.event {
            TimerEvent::Countdown { .. } | TimerEvent::Rearm { .. } => {
                if self.session.phase_timer != Some(fired.handle) {
                    tracing::trace!(event = ?fired.event, "superseded phase timer");
                    return;
                }
                self.session.phase_timer = None;
                self.presentation.clear_field();
                self.scheduler.arm_next(&mut self.session, &mut self.timers);
            }
            TimerEvent::StimulusDue { stimulus, .. } => {
                self.scheduler.on_timer_fired(
                    &mut self.session,
                    stimulus,
                    now,
                    &mut self.presentation,
                );
            }
        }
    }

    fn start_run(&mut self, now: Instant, message: &str) {
        self.timers.advance_to(now);
        self.discard_run();

        self.session.active = true;
        self.session.has_session = true;
        self.session.phase = Phase::Preparing;

        self.presentation.clear_field();
        self.presentation.draw_idle_message(message);

        let epoch = self.session.epoch;
        let handle = self.timers.schedule(COUNTDOWN, TimerEvent::Countdown { epoch });
        self.session.phase_timer = Some(handle);
    }

    /// Cancels every outstanding timer and invalidates callbacks already in flight
    fn discard_run(&mut self) {
        self.scheduler
            .cancel_pending(&mut self.session, &mut self.timers);
        if let Some(handle) = self.session.phase_timer.take() {
            self.timers.cancel(handle);
        }
        self.session.bump_epoch();
    }

    fn resolve(&mut self, stimulus: Stimulus, x: f64, y: f64, at: Instant) -> Option<ScoreResult> {
        let result = scorer::score(
            &mut self.session,
            &stimulus,
            at,
            &mut self.settings,
            &self.store,
        )?;

        self.presentation.play_effect(Effect::ring_fade(x, y));
        self.presentation.clear_field();
        self.presentation
            .draw_result(result.reaction_time_ms, result.points_awarded);
        self.presentation.play_effect(Effect::text_zoom());

        self.session.pending_stimulus = None;
        self.session.stimulus_shown_at = None;
        self.session.phase = Phase::Resolved;

        self.timers.advance_to(at);
        let epoch = self.session.epoch;
        let handle = self.timers.schedule(RESULT_PAUSE, TimerEvent::Rearm { epoch });
        self.session.phase_timer = Some(handle);

        tracing::debug!(
            stimulus = %stimulus.id,
            reaction_ms = result.reaction_time_ms,
            points = result.points_awarded,
            score = self.session.current_score,
            "stimulus hit"
        );
        Some(result)
    }
}
