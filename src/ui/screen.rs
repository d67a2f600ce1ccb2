use ratatui::Frame;

use crate::{
    ui::{render_game, render_instructions, render_menu, render_settings},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_menu(app, f);
    }
}

/// Mode and difficulty picker
pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_settings(app, f);
    }
}

pub struct InstructionsScreen;

impl Screen for InstructionsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_instructions(app, f);
    }
}

/// Score header, playfield and key hints
pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_game(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Settings => Box::new(SettingsScreen),
        AppState::Instructions => Box::new(InstructionsScreen),
        AppState::Playing => Box::new(GameScreen),
    }
}
