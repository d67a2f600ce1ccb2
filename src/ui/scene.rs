use std::time::{Duration, Instant};

use reflex::ports::{Effect, Presentation};
use reflex::stimulus::Stimulus;

/// What the playfield currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Blank,
    Message(String),
    Stimulus(Stimulus),
    Result { reaction_time_ms: f64, points: u64 },
}

/// An effect and how far along it is, in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playing {
    pub effect: Effect,
    pub progress: f64,
}

/// Presentation port for the terminal: remembers the logical scene, which the
/// ratatui widgets draw on the next frame.
#[derive(Debug)]
pub struct Scene {
    view: View,
    effects: Vec<(Effect, Instant)>,
    bell: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            view: View::Blank,
            effects: Vec::new(),
            bell: false,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Whether an alert is waiting to be rung; clears it
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Effects still running at `now`
    pub fn effects_at(&self, now: Instant) -> Vec<Playing> {
        self.effects
            .iter()
            .filter_map(|(effect, started)| {
                let elapsed = now.saturating_duration_since(*started);
                let total = effect.duration();
                if elapsed >= total {
                    return None;
                }
                Some(Playing {
                    effect: *effect,
                    progress: progress(elapsed, total),
                })
            })
            .collect()
    }

    /// Size factor of the visible stimulus: grows from 0.1 to 1.0 while ScaleIn runs
    pub fn stimulus_scale(&self, now: Instant) -> f64 {
        self.effects_at(now)
            .iter()
            .find_map(|p| match p.effect {
                Effect::ScaleIn { .. } => Some(0.1 + 0.9 * p.progress),
                _ => None,
            })
            .unwrap_or(1.0)
    }

    /// The stimulus as drawn at `now`
    pub fn drawn(&self, stimulus: &Stimulus, now: Instant) -> Stimulus {
        Stimulus {
            size: stimulus.size * self.stimulus_scale(now),
            ..*stimulus
        }
    }

    pub fn prune(&mut self, now: Instant) {
        self.effects
            .retain(|(effect, started)| now.saturating_duration_since(*started) < effect.duration());
    }
}

fn progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

impl Presentation for Scene {
    fn draw_stimulus(&mut self, stimulus: &Stimulus) {
        self.view = View::Stimulus(*stimulus);
    }

    fn clear_field(&mut self) {
        self.view = View::Blank;
        // the ring flash outlives the stimulus it came from
        self.effects
            .retain(|(e, _)| matches!(e, Effect::RingFade { .. }));
    }

    fn draw_idle_message(&mut self, text: &str) {
        self.view = View::Message(text.to_string());
    }

    fn draw_result(&mut self, reaction_time_ms: f64, points: u64) {
        self.view = View::Result {
            reaction_time_ms,
            points,
        };
    }

    fn play_alert_sound(&mut self) {
        self.bell = true;
    }

    fn play_effect(&mut self, effect: Effect) {
        self.effects.push((effect, Instant::now()));
    }

    fn hit_test(&self, stimulus: &Stimulus, x: f64, y: f64) -> bool {
        self.drawn(stimulus, Instant::now()).contains(x, y)
    }
}
