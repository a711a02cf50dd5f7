use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DEFAULT_SPLIT;

/// One of the two texts of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Side selection as written in settings or on the command line.
/// `Random` never survives past [`SideChoice::resolve`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SideChoice {
    #[default]
    #[serde(alias = "RANDOM")]
    Random,
    #[serde(alias = "LEFT")]
    Left,
    #[serde(alias = "RIGHT")]
    Right,
}

impl SideChoice {
    pub fn opposite(self) -> Self {
        match self {
            SideChoice::Random => SideChoice::Random,
            SideChoice::Left => SideChoice::Right,
            SideChoice::Right => SideChoice::Left,
        }
    }

    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Side {
        match self {
            SideChoice::Left => Side::Left,
            SideChoice::Right => Side::Right,
            SideChoice::Random => {
                if rng.gen_bool(0.5) {
                    Side::Left
                } else {
                    Side::Right
                }
            }
        }
    }
}

/// A single deck entry: a prompt/answer pair plus the side the user has to
/// produce and the 1-based line number it was read from (0 when unknown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LineRecord", into = "LineRecord")]
pub struct Line {
    pub left: String,
    pub right: String,
    pub answer_side: Side,
    pub index: usize,
}

impl Line {
    pub fn new(left: impl Into<String>, right: impl Into<String>, answer_side: Side, index: usize) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            answer_side,
            index,
        }
    }

    pub fn with_choice<R: Rng + ?Sized>(
        left: impl Into<String>,
        right: impl Into<String>,
        choice: SideChoice,
        index: usize,
        rng: &mut R,
    ) -> Self {
        Self::new(left, right, choice.resolve(rng), index)
    }

    /// Re-resolve the answer side, e.g. when a session applies its own
    /// side policy to entries parsed elsewhere.
    pub fn assign_side<R: Rng + ?Sized>(&mut self, choice: SideChoice, rng: &mut R) {
        self.answer_side = choice.resolve(rng);
    }

    pub fn prompt_side(&self) -> Side {
        self.answer_side.opposite()
    }

    pub fn text(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn answer_text(&self) -> &str {
        self.text(self.answer_side)
    }

    pub fn prompt_text(&self) -> &str {
        self.text(self.prompt_side())
    }

    /// Render one side, optionally with the separator on its inner edge
    /// (`left<split>` or `<split>right`) so the pair reads naturally.
    pub fn side_text(&self, side: Side, split: Option<&str>) -> String {
        match (side, split) {
            (Side::Left, Some(split)) => format!("{}{}", self.left, split),
            (Side::Right, Some(split)) => format!("{}{}", split, self.right),
            (side, None) => self.text(side).to_string(),
        }
    }

    pub fn joined(&self, split: &str) -> String {
        format!("{}{}{}", self.left, split, self.right)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined(DEFAULT_SPLIT))
    }
}

/// On-disk shape of a [`Line`]. `showUserSide` is derived from the answer
/// side when writing and ignored when reading.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineRecord {
    left: String,
    right: String,
    #[serde(default)]
    index: usize,
    correct_answer_side: Side,
    #[serde(default)]
    show_user_side: Option<Side>,
}

impl From<LineRecord> for Line {
    fn from(r: LineRecord) -> Self {
        Line::new(r.left, r.right, r.correct_answer_side, r.index)
    }
}

impl From<Line> for LineRecord {
    fn from(line: Line) -> Self {
        let show_user_side = Some(line.prompt_side());
        LineRecord {
            left: line.left,
            right: line.right,
            index: line.index,
            correct_answer_side: line.answer_side,
            show_user_side,
        }
    }
}
