pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use reflex::{
    app_dirs::AppDirs,
    difficulty::{Difficulty, GameMode},
    game::Game,
    runtime::{CrosstermEventSource, FixedTicker, ReflexEvent, Runner},
    scheduler::StimulusScheduler,
    settings::{FileSettingsStore, SettingsStore},
    stimulus::Playfield,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::ui::{field::to_logical, scene::Scene, screen::current_screen};

const TICK_RATE_MS: u64 = 50;
const NOTICE_SECS: u64 = 3;

/// reaction-time trainer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Click the stimulus as soon as it appears. Faster reactions score more points; harder difficulties bring stimuli sooner and pay more."
)]
pub struct Cli {
    /// stimulus mode to select (persisted)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// difficulty to select (persisted)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// settings file to use instead of the platform config dir
    #[clap(long)]
    settings: Option<PathBuf>,

    /// seed for stimulus placement and timing
    #[clap(long)]
    seed: Option<u64>,

    /// write logs to this file (filter with RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn store(&self) -> Box<dyn SettingsStore> {
        match &self.settings {
            Some(path) => Box::new(FileSettingsStore::with_path(path)),
            None => Box::new(FileSettingsStore::new()),
        }
    }

    fn scheduler(&self) -> StimulusScheduler {
        match self.seed {
            Some(seed) => StimulusScheduler::seeded(seed, Playfield::default()),
            None => StimulusScheduler::new(Playfield::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Menu,
    Settings,
    Instructions,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuItem {
    Continue,
    NewGame,
    Settings,
    Instructions,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::Continue,
        MenuItem::NewGame,
        MenuItem::Settings,
        MenuItem::Instructions,
        MenuItem::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Continue => "Continue",
            MenuItem::NewGame => "New game",
            MenuItem::Settings => "Game mode",
            MenuItem::Instructions => "Instructions",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Unsaved choices on the settings screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsDraft {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// 0 = mode row, 1 = difficulty row
    pub row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub game: Game<Scene, Box<dyn SettingsStore>>,
    pub state: AppState,
    pub selected: usize,
    pub draft: SettingsDraft,
    /// where the playfield was last drawn, for mapping mouse clicks
    pub field_area: Rect,
    pub notice: Option<(String, Instant)>,
}

impl App {
    pub fn new(game: Game<Scene, Box<dyn SettingsStore>>) -> Self {
        let settings = *game.settings();
        let mut app = Self {
            game,
            state: AppState::Menu,
            selected: 0,
            draft: SettingsDraft {
                mode: settings.game_mode,
                difficulty: settings.difficulty,
                row: 0,
            },
            field_area: Rect::default(),
            notice: None,
        };
        app.selected = app.first_enabled();
        app
    }

    pub fn is_enabled(&self, item: MenuItem) -> bool {
        item != MenuItem::Continue || self.game.can_continue()
    }

    fn first_enabled(&self) -> usize {
        MenuItem::ALL
            .iter()
            .position(|i| self.is_enabled(*i))
            .unwrap_or(0)
    }

    pub fn selected_item(&self) -> MenuItem {
        MenuItem::ALL[self.selected.min(MenuItem::ALL.len() - 1)]
    }

    fn move_selection(&mut self, forward: bool) {
        let n = MenuItem::ALL.len();
        let mut idx = self.selected;
        for _ in 0..n {
            idx = if forward { (idx + 1) % n } else { (idx + n - 1) % n };
            if self.is_enabled(MenuItem::ALL[idx]) {
                self.selected = idx;
                return;
            }
        }
    }

    pub fn notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < Duration::from_secs(NOTICE_SECS))
            .map(|(text, _)| text.as_str())
    }

    fn back_to_menu(&mut self) {
        self.game.stop();
        self.state = AppState::Menu;
        self.selected = self.first_enabled();
    }

    fn activate(&mut self, item: MenuItem, now: Instant) -> Flow {
        if !self.is_enabled(item) {
            return Flow::Continue;
        }
        match item {
            MenuItem::Continue => {
                if self.game.continue_game(now) {
                    self.state = AppState::Playing;
                }
            }
            MenuItem::NewGame => {
                let settings = *self.game.settings();
                self.game
                    .new_game(settings.game_mode, settings.difficulty, now);
                self.state = AppState::Playing;
            }
            MenuItem::Settings => {
                let settings = *self.game.settings();
                self.draft = SettingsDraft {
                    mode: settings.game_mode,
                    difficulty: settings.difficulty,
                    row: 0,
                };
                self.state = AppState::Settings;
            }
            MenuItem::Instructions => {
                self.state = AppState::Instructions;
            }
            MenuItem::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Menu => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.move_selection(true),
                KeyCode::Enter | KeyCode::Char(' ') => return self.activate(self.selected_item(), now),
                KeyCode::Char('c') => return self.activate(MenuItem::Continue, now),
                KeyCode::Char('n') => return self.activate(MenuItem::NewGame, now),
                KeyCode::Char('s') => return self.activate(MenuItem::Settings, now),
                KeyCode::Char('i') => return self.activate(MenuItem::Instructions, now),
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                _ => {}
            },
            AppState::Settings => match key.code {
                KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                    self.draft.row = 1 - self.draft.row.min(1);
                }
                KeyCode::Left => {
                    if self.draft.row == 0 {
                        self.draft.mode = self.draft.mode.prev();
                    } else {
                        self.draft.difficulty = self.draft.difficulty.prev();
                    }
                }
                KeyCode::Right => {
                    if self.draft.row == 0 {
                        self.draft.mode = self.draft.mode.next();
                    } else {
                        self.draft.difficulty = self.draft.difficulty.next();
                    }
                }
                KeyCode::Enter => {
                    self.game
                        .change_settings(self.draft.mode, self.draft.difficulty);
                    self.notice = Some((
                        format!(
                            "Settings saved. Mode: {}, difficulty: {}",
                            self.draft.mode.label(),
                            self.draft.difficulty.label()
                        ),
                        now,
                    ));
                    self.state = AppState::Menu;
                }
                KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::Menu,
                _ => {}
            },
            AppState::Instructions => self.state = AppState::Menu,
            AppState::Playing => match key.code {
                KeyCode::Esc | KeyCode::Char('m') | KeyCode::Char('q') => self.back_to_menu(),
                _ => {}
            },
        }
        Flow::Continue
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.state != AppState::Playing {
            return;
        }
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some((x, y)) = to_logical(self.field_area, self.game.playfield(), mouse.column, mouse.row)
        else {
            return;
        };
        self.game.click(x, y, now);
    }
}

/// Directory and file name to log to. Nothing is written unless a file was asked
/// for or RUST_LOG is set.
fn log_target(path: Option<PathBuf>, env_filter_set: bool) -> Option<(PathBuf, PathBuf)> {
    match path {
        Some(p) => {
            let dir = p
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .map(|d| d.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            let file = p.file_name()?.to_os_string();
            Some((dir, PathBuf::from(file)))
        }
        None if env_filter_set => Some((AppDirs::log_dir()?, PathBuf::from("reflex.log"))),
        None => None,
    }
}

fn init_logging(path: Option<PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().ok();
    let (dir, file) = log_target(path, filter.is_some())?;
    std::fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter.unwrap_or_else(|| EnvFilter::new("off")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _guard = init_logging(cli.log_file.clone());

    let mut game = Game::with_scheduler(Scene::new(), cli.store(), cli.scheduler(), Instant::now());
    if cli.mode.is_some() || cli.difficulty.is_some() {
        let current = *game.settings();
        game.change_settings(
            cli.mode.unwrap_or(current.game_mode),
            cli.difficulty.unwrap_or(current.difficulty),
        );
    }
    let mut app = App::new(game);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step(app.game.next_deadline()) {
            ReflexEvent::Tick | ReflexEvent::Resize => {}
            ReflexEvent::Key(key) => {
                if app.on_key(key, Instant::now()) == Flow::Quit {
                    break;
                }
            }
            ReflexEvent::Mouse(mouse) => app.on_mouse(mouse, Instant::now()),
        }

        let now = Instant::now();
        app.game.poll(now);
        app.game.presentation_mut().prune(now);
        if app.game.presentation_mut().take_bell() {
            let mut out = io::stdout();
            out.write_all(b"\x07")?;
            out.flush()?;
        }
    }

    app.game.stop();
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}
