use std::fmt;

use crate::difficulty::GameMode;

/// Identifies one presentation of a stimulus. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StimulusId(pub(crate) u64);

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Logical playfield coordinates; y grows downwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Logical size of the area stimuli are placed in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
}

impl Playfield {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
        }
    }
}

/// A clickable target. Its geometry depends on `kind`:
/// Color is a square, Shape a circle and Sound an upward triangle,
/// each `size` wide and centred on `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stimulus {
    pub id: StimulusId,
    pub kind: GameMode,
    pub position: Position,
    pub size: f64,
}

impl Stimulus {
    pub fn half_size(&self) -> f64 {
        self.size / 2.0
    }

    /// Shape-accurate hit test against the drawn outline
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let h = self.half_size();
        let dx = x - self.position.x;
        let dy = y - self.position.y;

        match self.kind {
            GameMode::Color => dx.abs() <= h && dy.abs() <= h,
            GameMode::Shape => dx * dx + dy * dy <= h * h,
            GameMode::Sound => {
                let [a, b, c] = self.triangle();
                point_in_triangle((x, y), a, b, c)
            }
        }
    }

    /// Vertices of the Sound triangle: apex, bottom left, bottom right
    pub fn triangle(&self) -> [(f64, f64); 3] {
        let h = self.half_size();
        let Position { x, y } = self.position;
        [(x, y - h), (x - h, y + h), (x + h, y + h)]
    }
}

fn cross(o: (f64, f64), a: (f64, f64), p: (f64, f64)) -> f64 {
    (a.0 - o.0) * (p.1 - o.1) - (a.1 - o.1) * (p.0 - o.0)
}

fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}
