use std::time::Instant;

use crate::difficulty::profile_for;
use crate::session::GameSession;
use crate::settings::{Settings, SettingsStore};
use crate::stimulus::Stimulus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub reaction_time_ms: f64,
    pub points_awarded: u64,
    /// this click raised the best score
    pub new_best: bool,
}

/// Milliseconds between presentation and click, clamped at zero
pub fn reaction_time_ms(shown_at: Instant, clicked_at: Instant) -> f64 {
    clicked_at.saturating_duration_since(shown_at).as_nanos() as f64 / 1_000_000.0
}

/// `max(0, floor(base - reaction / 2))`
pub fn points_for(base_points: u64, reaction_time_ms: f64) -> u64 {
    let raw = (base_points as f64 - reaction_time_ms.max(0.0) / 2.0).floor();
    if raw > 0.0 {
        raw as u64
    } else {
        0
    }
}

/// Scores a hit on the presented stimulus and adds it to the running total.
///
/// The caller has already hit-tested the click. Returns None when `stimulus` is not
/// the one on screen. A new best score is written through `store` before returning;
/// a failed write is logged and play continues.
pub fn score<S: SettingsStore + ?Sized>(
    session: &mut GameSession,
    stimulus: &Stimulus,
    clicked_at: Instant,
    persisted: &mut Settings,
    store: &S,
) -> Option<ScoreResult> {
    let shown_at = session.stimulus_shown_at?;
    if session.presented().map(|s| s.id) != Some(stimulus.id) {
        return None;
    }

    let reaction_time_ms = reaction_time_ms(shown_at, clicked_at);
    let points_awarded = points_for(profile_for(session.difficulty).base_points, reaction_time_ms);
    session.current_score += points_awarded;

    let new_best = session.current_score > session.best_score;
    if new_best {
        session.best_score = session.current_score;
        persisted.best_score = session.best_score;
        tracing::info!(best_score = session.best_score, "new best score");
        if let Err(e) = store.save(persisted) {
            tracing::warn!(error = %e, "failed to persist best score");
        }
    }

    Some(ScoreResult {
        reaction_time_ms,
        points_awarded,
        new_best,
    })
}
