use std::time::{Duration, Instant};

use reflex::difficulty::{profile_for, Difficulty, GameMode};
use reflex::game::Game;
use reflex::ports::RecordingPresentation;
use reflex::scheduler::StimulusScheduler;
use reflex::scorer::points_for;
use reflex::session::Phase;
use reflex::settings::MemoryStore;
use reflex::stimulus::{Playfield, Stimulus};

type TestGame = Game<RecordingPresentation, MemoryStore>;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn game(seed: u64, t0: Instant) -> TestGame {
    Game::with_scheduler(
        RecordingPresentation::new(),
        MemoryStore::new(),
        StimulusScheduler::seeded(seed, Playfield::default()),
        t0,
    )
}

/// Polls forward until a stimulus is on screen
fn until_presented(g: &mut TestGame, from: Instant) -> (Stimulus, Instant) {
    let mut now = from;
    for _ in 0..1000 {
        now += ms(10);
        g.poll(now);
        if let Some(s) = g.presented().copied() {
            return (s, g.session().stimulus_shown_at.unwrap());
        }
    }
    panic!("no stimulus presented");
}

#[test]
fn medium_click_after_200ms_scores_1100() {
    let t0 = Instant::now();
    let mut g = game(1, t0);
    g.new_game(GameMode::Color, Difficulty::Medium, t0);

    let (stim, shown) = until_presented(&mut g, t0);
    let r = g
        .click(stim.position.x, stim.position.y, shown + ms(200))
        .expect("scored");
    assert_eq!(r.reaction_time_ms, 200.0);
    assert_eq!(r.points_awarded, 1100);
    assert_eq!(g.session().current_score, 1100);
}

#[test]
fn medium_click_after_3s_scores_nothing() {
    let t0 = Instant::now();
    let mut g = game(2, t0);
    g.new_game(GameMode::Color, Difficulty::Medium, t0);

    let (stim, shown) = until_presented(&mut g, t0);
    let r = g
        .click(stim.position.x, stim.position.y, shown + ms(3000))
        .expect("a hit is still resolved");
    assert_eq!(r.points_awarded, 0);
    assert!(!r.new_best);
    assert_eq!(g.session().current_score, 0);
    assert_eq!(g.session().phase, Phase::Resolved);
    assert_eq!(g.store().saves(), 0);
}

#[test]
fn clicks_without_stimulus_change_nothing() {
    let t0 = Instant::now();
    let mut g = game(3, t0);

    // Idle, before any game
    let before = g.session().clone();
    assert_eq!(g.click(300.0, 200.0, t0), None);
    assert_eq!(g.session(), &before);

    // Preparing, then Waiting
    g.new_game(GameMode::Shape, Difficulty::Easy, t0);
    let before = g.session().clone();
    assert_eq!(g.click(300.0, 200.0, t0 + ms(500)), None);
    assert_eq!(g.session(), &before);

    g.poll(t0 + ms(2000));
    assert_eq!(g.session().phase, Phase::Waiting);
    let before = g.session().clone();
    assert_eq!(g.click(300.0, 200.0, t0 + ms(2100)), None);
    assert_eq!(g.session(), &before);
    assert_eq!(g.presentation().last_result(), None);
}

#[test]
fn new_game_invalidates_presented_stimulus() {
    let t0 = Instant::now();
    let mut g = game(4, t0);
    g.new_game(GameMode::Color, Difficulty::Hard, t0);
    let (old, shown) = until_presented(&mut g, t0);

    g.new_game(GameMode::Color, Difficulty::Hard, shown + ms(50));
    assert_eq!(g.presented(), None);
    assert_eq!(g.click_stimulus(old.id, shown + ms(60)), None);

    let (fresh, fresh_shown) = until_presented(&mut g, shown + ms(50));
    assert_ne!(fresh.id, old.id);
    // the old id stays dead even while a new stimulus is up
    assert_eq!(g.click_stimulus(old.id, fresh_shown + ms(10)), None);
    assert_eq!(g.session().current_score, 0);

    assert!(g.click_stimulus(fresh.id, fresh_shown + ms(10)).is_some());
    assert_eq!(g.session().current_score, 1495);
}

#[test]
fn rapid_new_game_and_stop_never_doubles_timers() {
    let t0 = Instant::now();
    let mut g = game(5, t0);
    let mut now = t0;

    // a scripted mix of commands at uneven intervals
    let script: [(u64, char); 16] = [
        (0, 'n'),
        (10, 's'),
        (0, 's'),
        (5, 'n'),
        (0, 'n'),
        (2500, 'p'),
        (0, 'n'),
        (1999, 'p'),
        (1, 'p'),
        (300, 's'),
        (0, 'c'),
        (0, 'c'),
        (4000, 'p'),
        (0, 'n'),
        (3000, 'p'),
        (0, 's'),
    ];
    for (wait, op) in script {
        now += ms(wait);
        match op {
            'n' => g.new_game(GameMode::Sound, Difficulty::Hard, now),
            's' => g.stop(),
            'c' => {
                g.continue_game(now);
            }
            _ => {
                g.poll(now);
            }
        }
        assert!(g.session().invariants_hold(), "after {op} at {wait}");
        assert!(g.timers().pending() <= 1, "after {op} at {wait}");
    }

    assert!(!g.session().active);
    assert_eq!(g.timers().pending(), 0);
    g.poll(now + Duration::from_secs(30));
    assert_eq!(g.presented(), None);
}

#[test]
fn stop_twice_equals_stop_once() {
    let t0 = Instant::now();
    let mut g = game(6, t0);
    g.new_game(GameMode::Color, Difficulty::Medium, t0);
    until_presented(&mut g, t0);

    g.stop();
    let once = g.session().clone();
    let pending = g.timers().pending();
    g.stop();
    assert_eq!(g.session(), &once);
    assert_eq!(g.timers().pending(), pending);
}

#[test]
fn best_score_tracks_running_maximum() {
    let t0 = Instant::now();
    let mut g = game(7, t0);
    let mut now = t0;
    let mut observed_max = 0;

    // two games: the second scores less, so best must hold the first total
    for (round_ms, rounds) in [(100u64, 3), (1500, 2)] {
        g.new_game(GameMode::Shape, Difficulty::Medium, now);
        for _ in 0..rounds {
            let (stim, shown) = until_presented(&mut g, now);
            let before = g.session().best_score;
            g.click(stim.position.x, stim.position.y, shown + ms(round_ms))
                .expect("hit");
            now = shown + ms(round_ms);

            observed_max = observed_max.max(g.session().current_score);
            assert!(g.session().best_score >= before);
            assert_eq!(g.session().best_score, observed_max);
        }
    }

    assert_eq!(g.session().best_score, 3 * 1150);
    assert_eq!(g.session().current_score, 2 * 450);
    assert_eq!(g.store().stored().unwrap().best_score, 3 * 1150);
}

#[test]
fn points_never_increase_with_slower_clicks() {
    for d in Difficulty::ALL {
        let base = profile_for(d).base_points;
        assert_eq!(points_for(base, 0.0), base);
        assert_eq!(points_for(base, 2.0 * base as f64), 0);
        let mut last = u64::MAX;
        for rt in (0..=3 * base).step_by(7) {
            let p = points_for(base, rt as f64);
            assert!(p <= last);
            last = p;
        }
    }
}
