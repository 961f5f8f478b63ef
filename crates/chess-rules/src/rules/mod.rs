//! Rule set abstraction for chess variants.
//!
//! This module provides the [`RuleSet`] trait which abstracts over the
//! supported variants. The session is rule-agnostic: it delegates layout,
//! move validation, piece creation and game-end detection to the active
//! rule set. Variants reuse the [`Classic`] algorithm by calling into it
//! explicitly and then apply only what differs.

mod bomb;
mod chess960;
mod classic;
mod horde;
mod kirby;

pub use bomb::Bomb;
pub use chess960::{validate_layout, Chess960, LayoutError};
pub use classic::{is_insufficient_material, Classic};
pub(crate) use classic::promote;
pub use horde::Horde;
pub use kirby::Kirby;

use chess_core::{CastlingSide, Color, MoveRequest, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::moves::{castling_plan, possible_moves, requested_castling};
use crate::{Board, Piece, PieceId};

/// Why a move was rejected by the rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    NoPiece(Square),

    #[error("the piece on {square} belongs to {owner}")]
    WrongColor { square: Square, owner: Color },

    #[error("{kind} on {from} cannot move to {to}")]
    Unreachable {
        kind: PieceKind,
        from: Square,
        to: Square,
    },

    #[error("move would leave the {0} king in check")]
    LeavesKingInCheck(Color),

    #[error("cannot castle {side}: {reason}")]
    CastlingUnavailable {
        side: CastlingSide,
        reason: &'static str,
    },

    #[error("a pawn cannot promote to {0}")]
    InvalidPromotion(PieceKind),
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
    /// Horde: one side has no pieces left.
    HordeWin,
    /// Bomb: a king was destroyed by an explosion.
    KingExploded,
}

impl TerminalReason {
    /// Returns true for reasons that end the game without a winner.
    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            TerminalReason::Stalemate
                | TerminalReason::InsufficientMaterial
                | TerminalReason::FiftyMoveRule
                | TerminalReason::ThreefoldRepetition
        )
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminalReason::Checkmate => "checkmate",
            TerminalReason::Stalemate => "stalemate",
            TerminalReason::InsufficientMaterial => "insufficient material",
            TerminalReason::FiftyMoveRule => "fifty-move rule",
            TerminalReason::ThreefoldRepetition => "threefold repetition",
            TerminalReason::HordeWin => "horde eliminated",
            TerminalReason::KingExploded => "king exploded",
        };
        f.write_str(s)
    }
}

/// The result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOver {
    pub status: TerminalReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Color>,
}

impl GameOver {
    /// A decisive result.
    pub const fn win(status: TerminalReason, winner: Color) -> Self {
        GameOver {
            status,
            winner: Some(winner),
        }
    }

    /// A result without a winner.
    pub const fn draw(status: TerminalReason) -> Self {
        GameOver {
            status,
            winner: None,
        }
    }
}

impl fmt::Display for GameOver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(winner) => write!(f, "{} wins by {}", winner, self.status),
            None => write!(f, "no winner ({})", self.status),
        }
    }
}

/// En passant details of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnPassantInfo {
    /// The move captured a pawn en passant.
    pub capture: bool,
    /// The target square created by a two-square advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Square>,
}

/// Structured details about an accepted move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_passant: Option<EnPassantInfo>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub promotion_pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_position: Option<Square>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castling: Option<CastlingSide>,
    /// Kirby: the kind the capturing piece turned into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed: Option<PieceKind>,
    /// Bomb: pieces removed by the explosion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exploded: Vec<PieceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over: Option<GameOver>,
}

/// A validated move: the board after it plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub info: MoveInfo,
    /// The piece taken off the board by the move itself.
    pub captured: Option<Piece>,
    /// Pawn moves and captures reset the half-move clock.
    pub irreversible: bool,
}

/// Trait for implementing chess variants.
///
/// Implementors provide the four variant capabilities; legal move listing is
/// derived from [`validate_move`](RuleSet::validate_move), so it always
/// reflects the variant's own legality rules.
pub trait RuleSet {
    /// Which variant this is.
    fn variant(&self) -> Variant;

    /// Returns the starting board for this variant.
    fn initial_board(&self) -> Board;

    /// Validates `request` against `board`, returning the resulting board.
    ///
    /// `board` is never modified; on error nothing has changed.
    fn validate_move(&self, board: &Board, request: &MoveRequest) -> Result<MoveOutcome, MoveError>;

    /// Creates a new, unplaced piece with a fresh id from `board`.
    fn create_piece(&self, board: &mut Board, kind: PieceKind, color: Color) -> Piece;

    /// Returns how the game ended if `to_move` cannot continue, judged from
    /// the board alone. History-based draws are the session's concern.
    fn check_game_over(&self, board: &Board, to_move: Color) -> Option<GameOver>;

    /// Lists every legal move for `color`. Promotions are listed once per
    /// promotion choice and each castle once, under its canonical target.
    fn legal_moves(&self, board: &Board, color: Color) -> Vec<MoveRequest> {
        let mut legal = Vec::new();
        for (from, piece) in board.pieces_of(color) {
            for to in possible_moves(board, from) {
                if is_alternate_castle_form(board, piece, from, to) {
                    continue;
                }
                let request = MoveRequest::new(from, to, color);
                if reaches_last_rank(piece, to) {
                    for kind in PieceKind::PROMOTIONS {
                        let promotion = request.promoting_to(kind);
                        if self.validate_move(board, &promotion).is_ok() {
                            legal.push(promotion);
                        }
                    }
                } else if self.validate_move(board, &request).is_ok() {
                    legal.push(request);
                }
            }
        }
        legal
    }

    /// Returns true if `color` has at least one legal move.
    fn has_legal_move(&self, board: &Board, color: Color) -> bool {
        board.pieces_of(color).any(|(from, _)| {
            possible_moves(board, from).into_iter().any(|to| {
                let request = MoveRequest::new(from, to, color);
                self.validate_move(board, &request).is_ok()
            })
        })
    }
}

fn is_alternate_castle_form(board: &Board, piece: &Piece, from: Square, to: Square) -> bool {
    if piece.kind != PieceKind::King {
        return false;
    }
    requested_castling(board, piece.color, from, to)
        .and_then(|side| castling_plan(board, piece.color, side).ok())
        .map_or(false, |plan| plan.canonical_target() != to)
}

fn reaches_last_rank(piece: &Piece, to: Square) -> bool {
    piece.kind == PieceKind::Pawn && to.rank().index() == piece.color.promotion_rank()
}

/// The supported variants, as named in configuration and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Classic,
    Chess960,
    Horde,
    Kirby,
    Bomb,
}

impl Variant {
    /// All variants.
    pub const ALL: [Variant; 5] = [
        Variant::Classic,
        Variant::Chess960,
        Variant::Horde,
        Variant::Kirby,
        Variant::Bomb,
    ];

    /// Builds the rule set for this variant. `seed` fixes the Chess960
    /// layout; without one a random layout is drawn.
    pub fn rules(self, seed: Option<u64>) -> Rules {
        match self {
            Variant::Classic => Rules::Classic(Classic),
            Variant::Chess960 => Rules::Chess960(match seed {
                Some(seed) => Chess960::from_seed(seed),
                None => Chess960::random(),
            }),
            Variant::Horde => Rules::Horde(Horde),
            Variant::Kirby => Rules::Kirby(Kirby),
            Variant::Bomb => Rules::Bomb(Bomb),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Variant::Classic => "classic",
            Variant::Chess960 => "chess960",
            Variant::Horde => "horde",
            Variant::Kirby => "kirby",
            Variant::Bomb => "bomb",
        };
        f.write_str(s)
    }
}

/// A rule set chosen at session creation, dispatching to one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rules {
    Classic(Classic),
    Chess960(Chess960),
    Horde(Horde),
    Kirby(Kirby),
    Bomb(Bomb),
}

impl Default for Rules {
    fn default() -> Self {
        Rules::Classic(Classic)
    }
}

impl Rules {
    fn inner(&self) -> &dyn RuleSet {
        match self {
            Rules::Classic(r) => r,
            Rules::Chess960(r) => r,
            Rules::Horde(r) => r,
            Rules::Kirby(r) => r,
            Rules::Bomb(r) => r,
        }
    }
}

impl RuleSet for Rules {
    fn variant(&self) -> Variant {
        self.inner().variant()
    }

    fn initial_board(&self) -> Board {
        self.inner().initial_board()
    }

    fn validate_move(&self, board: &Board, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
        self.inner().validate_move(board, request)
    }

    fn create_piece(&self, board: &mut Board, kind: PieceKind, color: Color) -> Piece {
        self.inner().create_piece(board, kind, color)
    }

    fn check_game_over(&self, board: &Board, to_move: Color) -> Option<GameOver> {
        self.inner().check_game_over(board, to_move)
    }

    fn legal_moves(&self, board: &Board, color: Color) -> Vec<MoveRequest> {
        self.inner().legal_moves(board, color)
    }

    fn has_legal_move(&self, board: &Board, color: Color) -> bool {
        self.inner().has_legal_move(board, color)
    }
}

macro_rules! impl_from_variant {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Rules {
                fn from(rules: $ty) -> Self {
                    Rules::$ty(rules)
                }
            }
        )*
    };
}

impl_from_variant!(Classic, Chess960, Horde, Kirby, Bomb);
