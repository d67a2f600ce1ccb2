pub mod field;
pub mod scene;
pub mod screen;

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use reflex::difficulty::{profile_for, Difficulty, GameMode};

use crate::{ui::field::Field, App, MenuItem};

const HORIZONTAL_MARGIN: u16 = 2;

const INSTRUCTIONS: &str = "Click the stimulus as soon as it appears on the playfield.\n\
\n\
Color: a coloured square appears.\n\
Shape: a circle appears.\n\
Sound: a beep sounds together with a triangle.\n\
\n\
The faster you click, the more points you earn. Each difficulty\n\
has its own delay before a stimulus and its own base points.\n\
Clicking empty space does nothing.\n\
\n\
Esc or m returns to the menu and pauses the game.";

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM)
}

/// Splits `area` into a centred box of at most `height` rows
fn centered_rows(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN.min(area.width / 4))
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area)[1]
}

fn notice_line(app: &App, now: Instant) -> Line<'static> {
    match app.notice(now) {
        Some(text) => Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )),
        None => Line::from(""),
    }
}

pub fn render_menu(app: &mut App, f: &mut Frame) {
    let settings = *app.game.settings();
    let mut lines = vec![
        Line::from(Span::styled("R E F L E X", bold().fg(Color::Magenta))),
        Line::from(""),
        Line::from(format!("Best score: {}", settings.best_score)),
        Line::from(Span::styled(
            format!(
                "{} mode, {} difficulty",
                settings.game_mode.label(),
                settings.difficulty.label()
            ),
            dim(),
        )),
        Line::from(""),
    ];

    let selected = app.selected_item();
    for item in MenuItem::ALL {
        let line = if !app.is_enabled(item) {
            Line::from(Span::styled(format!("  {}  ", item.label()), dim()))
        } else if item == selected {
            Line::from(Span::styled(
                format!("> {} <", item.label()),
                bold().fg(Color::Green),
            ))
        } else {
            Line::from(format!("  {}  ", item.label()))
        };
        lines.push(line);
    }

    lines.push(Line::from(""));
    lines.push(notice_line(app, Instant::now()));

    let height = lines.len() as u16;
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered_rows(f.area(), height),
    );
}

fn choice_line<T: PartialEq + Copy>(
    label: &str,
    all: &[T],
    current: T,
    name: impl Fn(T) -> &'static str,
    focused: bool,
) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{label:<12}"),
        if focused { bold() } else { Style::default() },
    )];
    for option in all {
        let style = if *option == current {
            bold().fg(Color::Green).add_modifier(Modifier::REVERSED)
        } else {
            dim()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", name(*option)), style));
    }
    Line::from(spans)
}

pub fn render_settings(app: &mut App, f: &mut Frame) {
    let draft = app.draft;
    let profile = profile_for(draft.difficulty);

    let lines = vec![
        Line::from(Span::styled("Game mode", bold().fg(Color::Magenta))),
        Line::from(""),
        choice_line(
            "Mode",
            &GameMode::ALL,
            draft.mode,
            |m| m.label(),
            draft.row == 0,
        ),
        Line::from(Span::styled(draft.mode.description(), dim())),
        Line::from(""),
        choice_line(
            "Difficulty",
            &Difficulty::ALL,
            draft.difficulty,
            |d| d.label(),
            draft.row == 1,
        ),
        Line::from(Span::styled(
            format!(
                "{} Delay {}-{} ms, base {} points.",
                draft.difficulty.description(),
                profile.delay_range.0,
                profile.delay_range.1,
                profile.base_points
            ),
            dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "up/down: row  left/right: choose  enter: save  esc: cancel",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    let height = lines.len() as u16;
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        centered_rows(f.area(), height),
    );
}

pub fn render_instructions(_app: &mut App, f: &mut Frame) {
    let mut lines = vec![
        Line::from(Span::styled("Instructions", bold().fg(Color::Magenta))),
        Line::from(""),
    ];
    lines.extend(INSTRUCTIONS.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "press any key to return",
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    let height = lines.len() as u16;
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        centered_rows(f.area(), height),
    );
}

pub fn render_game(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let session = app.game.session();
    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(format!("Best: {}", session.best_score), bold())),
        header[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            format!("Score: {}", session.current_score),
            bold().fg(Color::Green),
        ))
        .alignment(Alignment::Right),
        header[1],
    );

    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        format!(" {} / {} ", session.mode.label(), session.difficulty.label()),
        dim(),
    ));
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);

    app.field_area = inner;
    f.render_widget(
        Field {
            scene: app.game.presentation(),
            playfield: app.game.playfield(),
            now: Instant::now(),
        },
        inner,
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            "click the stimulus  esc/m: menu",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[2],
    );
}
