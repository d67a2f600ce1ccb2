use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use crate::difficulty::{profile_for, Difficulty, GameMode};
use crate::ports::{Effect, Presentation};
use crate::session::{GameSession, PendingStimulus, Phase};
use crate::stimulus::{Playfield, Position, Stimulus, StimulusId};
use crate::timer::{TimerEvent, TimerService};

/// Logical edge length of every stimulus
pub const STIMULUS_SIZE: f64 = 100.0;

/// Owns the single in-flight stimulus timer and hands out stimulus ids
#[derive(Debug)]
pub struct StimulusScheduler<R: Rng = StdRng> {
    rng: R,
    next_id: u64,
    playfield: Playfield,
    stimulus_size: f64,
}

impl StimulusScheduler<StdRng> {
    pub fn new(playfield: Playfield) -> Self {
        Self::with_rng(StdRng::from_entropy(), playfield)
    }

    pub fn seeded(seed: u64, playfield: Playfield) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), playfield)
    }
}

impl<R: Rng> StimulusScheduler<R> {
    pub fn with_rng(rng: R, playfield: Playfield) -> Self {
        Self {
            rng,
            next_id: 1,
            playfield,
            stimulus_size: STIMULUS_SIZE,
        }
    }

    pub fn with_stimulus_size(mut self, size: f64) -> Self {
        self.stimulus_size = size;
        self
    }

    pub fn playfield(&self) -> Playfield {
        self.playfield
    }

    /// Uniform over the difficulty's inclusive delay window
    pub fn pick_delay(&mut self, difficulty: Difficulty) -> Duration {
        let (min, max) = profile_for(difficulty).delay_range;
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    /// Independent uniform x and y, inset by half the stimulus size on every side
    pub fn pick_position(&mut self) -> Position {
        let half = self.stimulus_size / 2.0;
        let x = self.pick_axis(self.playfield.width, half);
        let y = self.pick_axis(self.playfield.height, half);
        Position::new(x, y)
    }

    fn pick_axis(&mut self, extent: f64, half: f64) -> f64 {
        let (lo, hi) = (half, extent - half);
        if hi < lo {
            // playfield narrower than the stimulus
            return extent / 2.0;
        }
        self.rng.gen_range(lo..=hi)
    }

    fn fresh_id(&mut self) -> StimulusId {
        let id = StimulusId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Schedules the next stimulus and moves the session to `Waiting`.
    /// Returns the chosen delay, or None if the session is not active.
    pub fn arm_next<T: TimerService + ?Sized>(
        &mut self,
        session: &mut GameSession,
        timers: &mut T,
    ) -> Option<Duration> {
        if !session.active {
            return None;
        }
        if session.pending_stimulus.is_some() {
            tracing::debug!("arm_next with a stimulus outstanding, discarding it");
            self.cancel_pending(session, timers);
        }

        let delay = self.pick_delay(session.difficulty);
        let id = self.fresh_id();
        let timer = timers.schedule(
            delay,
            TimerEvent::StimulusDue {
                epoch: session.epoch,
                stimulus: id,
            },
        );

        session.pending_stimulus = Some(PendingStimulus::Scheduled { timer, id });
        session.stimulus_shown_at = None;
        session.phase = Phase::Waiting;
        tracing::debug!(stimulus = %id, delay_ms = delay.as_millis() as u64, "stimulus armed");
        Some(delay)
    }

    /// Presents the stimulus whose timer just fired. A callback for a stopped
    /// session or a superseded stimulus is ignored.
    pub fn on_timer_fired<P: Presentation + ?Sized>(
        &mut self,
        session: &mut GameSession,
        id: StimulusId,
        now: Instant,
        presentation: &mut P,
    ) -> Option<Stimulus> {
        if !session.active {
            tracing::trace!(stimulus = %id, "timer fired for inactive session");
            return None;
        }
        match session.pending_stimulus {
            Some(PendingStimulus::Scheduled { id: pending, .. }) if pending == id => {}
            _ => {
                tracing::trace!(stimulus = %id, "stale stimulus timer");
                return None;
            }
        }

        let stimulus = Stimulus {
            id,
            kind: session.mode,
            position: self.pick_position(),
            size: self.stimulus_size,
        };

        presentation.clear_field();
        presentation.draw_stimulus(&stimulus);
        presentation.play_effect(Effect::scale_in());
        if stimulus.kind == GameMode::Sound {
            presentation.play_alert_sound();
        }

        session.pending_stimulus = Some(PendingStimulus::Presented(stimulus));
        session.stimulus_shown_at = Some(now);
        session.phase = Phase::Presented;
        tracing::debug!(stimulus = %id, x = stimulus.position.x, y = stimulus.position.y, "stimulus presented");
        Some(stimulus)
    }

    /// Drops any scheduled or visible stimulus. Safe to call when nothing is pending.
    pub fn cancel_pending<T: TimerService + ?Sized>(
        &self,
        session: &mut GameSession,
        timers: &mut T,
    ) {
        if let Some(PendingStimulus::Scheduled { timer, .. }) = session.pending_stimulus {
            timers.cancel(timer);
        }
        session.pending_stimulus = None;
        session.stimulus_shown_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Command, RecordingPresentation};
    use crate::timer::TimerQueue;
    use assert_matches::assert_matches;

    fn active_session(mode: GameMode, difficulty: Difficulty) -> GameSession {
        let mut s = GameSession::new(0, mode, difficulty);
        s.active = true;
        s.has_session = true;
        s
    }

    #[test]
    fn test_delay_within_profile_bounds() {
        let mut sched = StimulusScheduler::seeded(7, Playfield::default());
        for d in Difficulty::ALL {
            let p = profile_for(d);
            let mut seen_min = u64::MAX;
            let mut seen_max = 0;
            for _ in 0..5_000 {
                let ms = sched.pick_delay(d).as_millis() as u64;
                assert!(ms >= p.delay_range.0 && ms <= p.delay_range.1, "{d}: {ms}");
                seen_min = seen_min.min(ms);
                seen_max = seen_max.max(ms);
            }
            // the draws should cover most of the window
            let span = p.delay_range.1 - p.delay_range.0;
            assert!(seen_min < p.delay_range.0 + span / 10);
            assert!(seen_max > p.delay_range.1 - span / 10);
        }
    }

    #[test]
    fn test_position_inset_by_half_size() {
        let mut sched = StimulusScheduler::seeded(11, Playfield::new(600.0, 400.0));
        for _ in 0..2_000 {
            let p = sched.pick_position();
            assert!(p.x >= 50.0 && p.x <= 550.0);
            assert!(p.y >= 50.0 && p.y <= 350.0);
        }
    }

    #[test]
    fn test_position_in_tiny_playfield_is_centred() {
        let mut sched = StimulusScheduler::seeded(1, Playfield::new(60.0, 400.0));
        let p = sched.pick_position();
        assert_eq!(p.x, 30.0);
        assert!(p.y >= 50.0 && p.y <= 350.0);
    }

    #[test]
    fn test_position_fixed_when_playfield_matches_size() {
        let mut sched =
            StimulusScheduler::seeded(3, Playfield::new(100.0, 100.0)).with_stimulus_size(100.0);
        assert_eq!(sched.pick_position(), Position::new(50.0, 50.0));
    }

    #[test]
    fn test_arm_next_requires_active() {
        let mut sched = StimulusScheduler::seeded(1, Playfield::default());
        let mut session = GameSession::default();
        let mut timers = TimerQueue::new(Instant::now());

        assert_eq!(sched.arm_next(&mut session, &mut timers), None);
        assert_eq!(timers.pending(), 0);
        assert!(session.pending_stimulus.is_none());
    }

    #[test]
    fn test_arm_next_schedules_one_timer() {
        let mut sched = StimulusScheduler::seeded(1, Playfield::default());
        let mut session = active_session(GameMode::Color, Difficulty::Hard);
        let mut timers = TimerQueue::new(Instant::now());

        let delay = sched.arm_next(&mut session, &mut timers).unwrap();
        assert!(delay >= Duration::from_millis(500) && delay <= Duration::from_millis(1500));
        assert_eq!(timers.pending(), 1);
        assert_eq!(session.phase, Phase::Waiting);
        assert_matches!(
            session.pending_stimulus,
            Some(PendingStimulus::Scheduled { .. })
        );

        // a second arm replaces the first rather than stacking
        sched.arm_next(&mut session, &mut timers).unwrap();
        assert_eq!(timers.pending(), 1);
    }

    #[test]
    fn test_fire_presents_stimulus_and_records_time() {
        let t0 = Instant::now();
        let mut sched = StimulusScheduler::seeded(5, Playfield::default());
        let mut session = active_session(GameMode::Shape, Difficulty::Medium);
        let mut timers = TimerQueue::new(t0);
        let mut pres = RecordingPresentation::new();

        sched.arm_next(&mut session, &mut timers).unwrap();
        let fired = timers.pop_due(t0 + Duration::from_secs(5)).unwrap();
        let id = match fired.event {
            TimerEvent::StimulusDue { stimulus, .. } => stimulus,
            other => panic!("unexpected event {other:?}"),
        };

        let stim = sched
            .on_timer_fired(&mut session, id, fired.at, &mut pres)
            .unwrap();
        assert_eq!(stim.kind, GameMode::Shape);
        assert_eq!(session.phase, Phase::Presented);
        assert_eq!(session.stimulus_shown_at, Some(fired.at));
        assert_eq!(pres.stimuli(), vec![stim]);
        assert_eq!(pres.alerts(), 0);
        assert!(pres
            .commands
            .contains(&Command::Effect(Effect::scale_in())));
        assert!(session.invariants_hold());
    }

    #[test]
    fn test_sound_mode_rings_alert() {
        let t0 = Instant::now();
        let mut sched = StimulusScheduler::seeded(5, Playfield::default());
        let mut session = active_session(GameMode::Sound, Difficulty::Easy);
        let mut timers = TimerQueue::new(t0);
        let mut pres = RecordingPresentation::new();

        sched.arm_next(&mut session, &mut timers).unwrap();
        let id = session.pending_stimulus.unwrap().id();
        sched.on_timer_fired(&mut session, id, t0, &mut pres).unwrap();
        assert_eq!(pres.alerts(), 1);
    }

    #[test]
    fn test_fire_after_stop_is_noop() {
        let t0 = Instant::now();
        let mut sched = StimulusScheduler::seeded(5, Playfield::default());
        let mut session = active_session(GameMode::Color, Difficulty::Medium);
        let mut timers = TimerQueue::new(t0);
        let mut pres = RecordingPresentation::new();

        sched.arm_next(&mut session, &mut timers).unwrap();
        let id = session.pending_stimulus.unwrap().id();
        session.active = false;

        assert!(sched.on_timer_fired(&mut session, id, t0, &mut pres).is_none());
        assert!(pres.commands.is_empty());
        assert!(session.stimulus_shown_at.is_none());
    }

    #[test]
    fn test_fire_with_superseded_id_is_noop() {
        let t0 = Instant::now();
        let mut sched = StimulusScheduler::seeded(5, Playfield::default());
        let mut session = active_session(GameMode::Color, Difficulty::Medium);
        let mut timers = TimerQueue::new(t0);
        let mut pres = RecordingPresentation::new();

        sched.arm_next(&mut session, &mut timers).unwrap();
        let old = session.pending_stimulus.unwrap().id();
        sched.arm_next(&mut session, &mut timers).unwrap();

        assert!(sched.on_timer_fired(&mut session, old, t0, &mut pres).is_none());
        assert_eq!(session.phase, Phase::Waiting);
    }

    #[test]
    fn test_cancel_pending_is_idempotent() {
        let t0 = Instant::now();
        let mut sched = StimulusScheduler::seeded(5, Playfield::default());
        let mut session = active_session(GameMode::Color, Difficulty::Medium);
        let mut timers = TimerQueue::new(t0);

        sched.arm_next(&mut session, &mut timers).unwrap();
        sched.cancel_pending(&mut session, &mut timers);
        let once = (session.pending_stimulus, session.stimulus_shown_at, timers.pending());
        sched.cancel_pending(&mut session, &mut timers);
        let twice = (session.pending_stimulus, session.stimulus_shown_at, timers.pending());

        assert_eq!(once, twice);
        assert_eq!(timers.pending(), 0);
        assert!(timers.pop_due(t0 + Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut sched = StimulusScheduler::seeded(5, Playfield::default());
        let ids: Vec<StimulusId> = (0..100).map(|_| sched.fresh_id()).collect();
        let mut dedup = ids.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(ids.len(), dedup.len());
    }
}
