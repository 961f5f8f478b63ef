//! Move requests as submitted by players.

use crate::{Color, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The side of the board a king castles toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastlingSide {
    /// Toward the h-file (O-O).
    Kingside,
    /// Toward the a-file (O-O-O).
    Queenside,
}

impl CastlingSide {
    /// Both sides, kingside first.
    pub const ALL: [CastlingSide; 2] = [CastlingSide::Kingside, CastlingSide::Queenside];

    /// File index the king lands on after castling.
    #[inline]
    pub const fn king_target_file(self) -> u8 {
        match self {
            CastlingSide::Kingside => 6,
            CastlingSide::Queenside => 2,
        }
    }

    /// File index the rook lands on after castling.
    #[inline]
    pub const fn rook_target_file(self) -> u8 {
        match self {
            CastlingSide::Kingside => 5,
            CastlingSide::Queenside => 3,
        }
    }
}

impl fmt::Display for CastlingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastlingSide::Kingside => f.write_str("kingside"),
            CastlingSide::Queenside => f.write_str("queenside"),
        }
    }
}

/// A move as requested by a player.
///
/// A request carries no special-move flags: whether it is a castle, an en
/// passant capture or a promotion is decided by the rules engine from the
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_choice: Option<PieceKind>,
}

impl MoveRequest {
    /// Creates a request without a promotion choice.
    pub const fn new(from: Square, to: Square, color: Color) -> Self {
        MoveRequest {
            from,
            to,
            color,
            promotion_choice: None,
        }
    }

    /// Returns the request with the given promotion choice.
    pub const fn promoting_to(mut self, kind: PieceKind) -> Self {
        self.promotion_choice = Some(kind);
        self
    }

    /// Parses coordinate notation ("e2e4", "e7e8q") for the given color.
    pub fn from_coords(s: &str, color: Color) -> Option<Self> {
        if s.len() < 4 || s.len() > 5 || !s.is_ascii() {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion_choice = match s.get(4..) {
            Some("") | None => None,
            Some(letter) => Some(letter.parse().ok()?),
        };
        Some(MoveRequest {
            from,
            to,
            color,
            promotion_choice,
        })
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion_choice {
            write!(f, "{}", kind.to_char(Color::Black))?;
        }
        Ok(())
    }
}
