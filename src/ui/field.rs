use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use reflex::difficulty::GameMode;
use reflex::ports::Effect;
use reflex::stimulus::{Playfield, Stimulus};

use super::scene::{Playing, Scene, View};

const SECONDARY: Color = Color::Rgb(233, 69, 96);
const HIGHLIGHT: Color = Color::Rgb(255, 215, 0);

/// Logical coordinates of the centre of terminal cell (col, row), or None if the
/// cell lies outside `area`
pub fn to_logical(area: Rect, playfield: Playfield, col: u16, row: u16) -> Option<(f64, f64)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
        return None;
    }
    let x = (f64::from(col - area.x) + 0.5) * playfield.width / f64::from(area.width);
    let y = (f64::from(row - area.y) + 0.5) * playfield.height / f64::from(area.height);
    Some((x, y))
}

fn fill_color(kind: GameMode) -> Color {
    match kind {
        GameMode::Color => SECONDARY,
        GameMode::Shape => HIGHLIGHT,
        GameMode::Sound => SECONDARY,
    }
}

/// Draws the scene into the playfield area
pub struct Field<'a> {
    pub scene: &'a Scene,
    pub playfield: Playfield,
    pub now: Instant,
}

impl Widget for Field<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let effects = self.scene.effects_at(self.now);

        match self.scene.view() {
            View::Blank => {}
            View::Message(text) => {
                let lines: Vec<Line> = text.lines().map(Line::from).collect();
                centered(Paragraph::new(lines), area, buf, text.lines().count() as u16);
            }
            View::Stimulus(stimulus) => {
                let drawn = self.scene.drawn(stimulus, self.now);
                paint(&drawn, area, self.playfield, buf);
            }
            View::Result {
                reaction_time_ms,
                points,
            } => {
                let zooming = effects
                    .iter()
                    .any(|p| matches!(p.effect, Effect::TextZoom { .. }) && p.progress < 0.5);
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if zooming {
                    style = style.add_modifier(Modifier::DIM);
                }
                let lines = vec![
                    Line::from(Span::styled(
                        format!("Reaction time: {reaction_time_ms:.0} ms"),
                        style,
                    )),
                    Line::from(Span::styled(format!("Points: +{points}"), style)),
                ];
                centered(Paragraph::new(lines), area, buf, 2);
            }
        }

        for playing in &effects {
            if let Effect::RingFade { .. } = playing.effect {
                paint_rings(playing, area, self.playfield, buf);
            }
        }
    }
}

fn centered(paragraph: Paragraph, area: Rect, buf: &mut Buffer, lines: u16) {
    let height = lines.min(area.height);
    let y = area.y + (area.height - height) / 2;
    paragraph
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(Rect::new(area.x, y, area.width, height), buf);
}

/// Rasterises the stimulus by sampling its hit region at each cell centre
fn paint(stimulus: &Stimulus, area: Rect, playfield: Playfield, buf: &mut Buffer) {
    let color = fill_color(stimulus.kind);
    for row in area.y..area.y + area.height {
        for col in area.x..area.x + area.width {
            if let Some((x, y)) = to_logical(area, playfield, col, row) {
                if stimulus.contains(x, y) {
                    buf[(col, row)].set_char('█').set_fg(color);
                }
            }
        }
    }
}

fn paint_rings(playing: &Playing, area: Rect, playfield: Playfield, buf: &mut Buffer) {
    let Effect::RingFade {
        x: cx,
        y: cy,
        rings,
        max_radius,
        ..
    } = playing.effect
    else {
        return;
    };
    let cell_w = playfield.width / f64::from(area.width.max(1));
    let cell_h = playfield.height / f64::from(area.height.max(1));
    let band = cell_w.max(cell_h) / 2.0;

    for i in 0..rings {
        let radius =
            max_radius * (1.0 - f64::from(i) / f64::from(rings)) * (1.0 + playing.progress);
        for row in area.y..area.y + area.height {
            for col in area.x..area.x + area.width {
                if let Some((x, y)) = to_logical(area, playfield, col, row) {
                    let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
                    if (d - radius).abs() <= band {
                        buf[(col, row)].set_char('·').set_fg(HIGHLIGHT);
                    }
                }
            }
        }
    }
}
