use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a stimulus is presented to the player
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// a coloured square
    #[default]
    Color,
    /// a circle
    Shape,
    /// a triangle accompanied by an audible alert
    Sound,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Color, GameMode::Shape, GameMode::Sound];

    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Color => "Color",
            GameMode::Shape => "Shape",
            GameMode::Sound => "Sound",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Color => "react to a coloured square",
            GameMode::Shape => "react to a circle",
            GameMode::Sound => "react to a beep and a triangle",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Difficulty::Easy => "more time between stimuli",
            Difficulty::Medium => "standard pace",
            Difficulty::Hard => "stimuli come quickly",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}

/// Delay window and point ceiling for one difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    /// inclusive bounds, milliseconds
    pub delay_range: (u64, u64),
    pub base_points: u64,
}

const EASY: DifficultyProfile = DifficultyProfile {
    delay_range: (1500, 3000),
    base_points: 1000,
};

const MEDIUM: DifficultyProfile = DifficultyProfile {
    delay_range: (1000, 2000),
    base_points: 1200,
};

const HARD: DifficultyProfile = DifficultyProfile {
    delay_range: (500, 1500),
    base_points: 1500,
};

pub fn profile_for(difficulty: Difficulty) -> DifficultyProfile {
    match difficulty {
        Difficulty::Easy => EASY,
        Difficulty::Medium => MEDIUM,
        Difficulty::Hard => HARD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_table() {
        assert_eq!(profile_for(Difficulty::Easy).delay_range, (1500, 3000));
        assert_eq!(profile_for(Difficulty::Easy).base_points, 1000);
        assert_eq!(profile_for(Difficulty::Medium).delay_range, (1000, 2000));
        assert_eq!(profile_for(Difficulty::Medium).base_points, 1200);
        assert_eq!(profile_for(Difficulty::Hard).delay_range, (500, 1500));
        assert_eq!(profile_for(Difficulty::Hard).base_points, 1500);
    }

    #[test]
    fn test_profile_delay_bounds_are_ordered() {
        for d in Difficulty::ALL {
            let p = profile_for(d);
            assert!(p.delay_range.0 <= p.delay_range.1);
        }
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(GameMode::Color.to_string(), "color");
        assert_eq!(GameMode::Sound.to_string(), "sound");
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!(
            serde_json::to_string(&Difficulty::Medium).unwrap(),
            "\"medium\""
        );
        assert_eq!(
            serde_json::from_str::<GameMode>("\"shape\"").unwrap(),
            GameMode::Shape
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(GameMode::default(), GameMode::Color);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn test_cycling_wraps() {
        assert_eq!(GameMode::Sound.next(), GameMode::Color);
        assert_eq!(GameMode::Color.prev(), GameMode::Sound);
        assert_eq!(Difficulty::Easy.next(), Difficulty::Medium);
        assert_eq!(Difficulty::Easy.prev(), Difficulty::Hard);
    }
}
