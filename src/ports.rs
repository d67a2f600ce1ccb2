use std::time::Duration;

use crate::stimulus::Stimulus;

pub const SCALE_IN_DURATION: Duration = Duration::from_millis(100);
pub const RING_FADE_DURATION: Duration = Duration::from_millis(200);
pub const TEXT_ZOOM_DURATION: Duration = Duration::from_millis(200);
pub const FLASH_RINGS: u8 = 5;
pub const MAX_FLASH_RADIUS: f64 = 50.0;

/// An animation the presentation layer plays on its own. The engine only asks for
/// it; easing and frame stepping stay on the other side of the port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// the stimulus grows from 10% to full size
    ScaleIn { duration: Duration },
    /// concentric rings expanding from the click point
    RingFade {
        x: f64,
        y: f64,
        rings: u8,
        max_radius: f64,
        duration: Duration,
    },
    /// the result text zooms in
    TextZoom { duration: Duration },
}

impl Effect {
    pub fn scale_in() -> Self {
        Effect::ScaleIn {
            duration: SCALE_IN_DURATION,
        }
    }

    pub fn ring_fade(x: f64, y: f64) -> Self {
        Effect::RingFade {
            x,
            y,
            rings: FLASH_RINGS,
            max_radius: MAX_FLASH_RADIUS,
            duration: RING_FADE_DURATION,
        }
    }

    pub fn text_zoom() -> Self {
        Effect::TextZoom {
            duration: TEXT_ZOOM_DURATION,
        }
    }

    pub fn duration(&self) -> Duration {
        match *self {
            Effect::ScaleIn { duration }
            | Effect::RingFade { duration, .. }
            | Effect::TextZoom { duration } => duration,
        }
    }
}

/// Draws logical scenes on behalf of the engine. Implementations are sinks: the
/// engine never reads pixels back, except through `hit_test`.
pub trait Presentation {
    /// Show a stimulus; its id doubles as the drawing handle
    fn draw_stimulus(&mut self, stimulus: &Stimulus);
    fn clear_field(&mut self);
    fn draw_idle_message(&mut self, text: &str);
    fn draw_result(&mut self, reaction_time_ms: f64, points: u64);
    fn play_alert_sound(&mut self);

    fn play_effect(&mut self, _effect: Effect) {}

    /// Whether a click at logical (x, y) lands on the drawn stimulus
    fn hit_test(&self, stimulus: &Stimulus, x: f64, y: f64) -> bool {
        stimulus.contains(x, y)
    }
}

/// A single call made through the presentation port
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DrawStimulus(Stimulus),
    ClearField,
    IdleMessage(String),
    Result { reaction_time_ms: f64, points: u64 },
    AlertSound,
    Effect(Effect),
}

/// Presentation that keeps a log of everything asked of it, for headless hosts
#[derive(Debug, Default, Clone)]
pub struct RecordingPresentation {
    pub commands: Vec<Command>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stimuli(&self) -> Vec<Stimulus> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawStimulus(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::AlertSound))
            .count()
    }

    pub fn last_result(&self) -> Option<(f64, u64)> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::Result {
                reaction_time_ms,
                points,
            } => Some((*reaction_time_ms, *points)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Presentation for RecordingPresentation {
    fn draw_stimulus(&mut self, stimulus: &Stimulus) {
        self.commands.push(Command::DrawStimulus(*stimulus));
    }

    fn clear_field(&mut self) {
        self.commands.push(Command::ClearField);
    }

    fn draw_idle_message(&mut self, text: &str) {
        self.commands.push(Command::IdleMessage(text.to_string()));
    }

    fn draw_result(&mut self, reaction_time_ms: f64, points: u64) {
        self.commands.push(Command::Result {
            reaction_time_ms,
            points,
        });
    }

    fn play_alert_sound(&mut self) {
        self.commands.push(Command::AlertSound);
    }

    fn play_effect(&mut self, effect: Effect) {
        self.commands.push(Command::Effect(effect));
    }
}
