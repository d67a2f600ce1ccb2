use std::time::{Duration, Instant};

use reflex::difficulty::{Difficulty, GameMode};
use reflex::game::Game;
use reflex::ports::RecordingPresentation;
use reflex::scheduler::StimulusScheduler;
use reflex::settings::{FileSettingsStore, Settings, SettingsStore};
use reflex::stimulus::Playfield;

#[test]
fn settings_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSettingsStore::with_path(dir.path().join("nested").join("settings.json"));

    let saved = Settings {
        best_score: 500,
        game_mode: GameMode::Shape,
        difficulty: Difficulty::Hard,
    };
    store.save(&saved).unwrap();
    assert_eq!(store.load(), saved);
}

#[test]
fn best_score_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let t0 = Instant::now();

    {
        let mut g = Game::with_scheduler(
            RecordingPresentation::new(),
            FileSettingsStore::with_path(&path),
            StimulusScheduler::seeded(8, Playfield::default()),
            t0,
        );
        g.change_settings(GameMode::Sound, Difficulty::Easy);
        g.new_game(GameMode::Sound, Difficulty::Easy, t0);

        let mut now = t0;
        while g.presented().is_none() {
            now += Duration::from_millis(10);
            g.poll(now);
        }
        let stim = *g.presented().unwrap();
        let shown = g.session().stimulus_shown_at.unwrap();
        g.click(stim.position.x, stim.position.y, shown + Duration::from_millis(250))
            .expect("hit");
        assert_eq!(g.session().best_score, 875);
        assert_eq!(g.presentation().alerts(), 1);
    }

    let g = Game::new(
        RecordingPresentation::new(),
        FileSettingsStore::with_path(&path),
        Instant::now(),
    );
    assert_eq!(g.session().best_score, 875);
    assert_eq!(g.session().current_score, 0);
    assert_eq!(
        *g.settings(),
        Settings {
            best_score: 875,
            game_mode: GameMode::Sound,
            difficulty: Difficulty::Easy,
        }
    );
}

#[test]
fn corrupt_file_starts_fresh_and_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut g = Game::new(
        RecordingPresentation::new(),
        FileSettingsStore::with_path(&path),
        Instant::now(),
    );
    assert_eq!(*g.settings(), Settings::default());

    g.change_settings(GameMode::Shape, Difficulty::Medium);
    let reloaded = FileSettingsStore::with_path(&path).load();
    assert_eq!(reloaded.game_mode, GameMode::Shape);
    assert_eq!(reloaded.best_score, 0);
}
