//! The two sides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;
use std::str::FromStr;

use crate::ParseError;

/// A side. Serializes as `"white"` / `"black"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// White first, which is also the order of play.
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Table index: 0 for white, 1 for black.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank step of a pawn push.
    pub const fn pawn_direction(self) -> i8 {
        1 - 2 * (self as i8)
    }

    /// Rank index the side's pieces start on.
    pub const fn back_rank(self) -> u8 {
        7 * self as u8
    }

    /// Rank index where the side's pawns promote: the opponent's back rank.
    pub const fn promotion_rank(self) -> u8 {
        self.opposite().back_rank()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        self.opposite()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(ParseError::InvalidColor(s.to_string())),
        }
    }
}
