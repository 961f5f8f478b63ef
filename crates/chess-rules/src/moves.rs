//! Pseudo-legal move generation.
//!
//! Every function here is a pure function of a board snapshot: it reports
//! where a piece could go by its movement pattern and the occupancy of the
//! board, without asking whether the mover's king is left in check. Legality
//! is decided afterwards by the rule set on a cloned board.

use chess_core::{CastlingSide, Color, PieceKind, Square};

use crate::attacks::{is_attacked, is_in_check};
use crate::{Board, Piece};

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
pub(crate) const KING_OFFSETS: [(i8, i8); 8] = QUEEN_DIRECTIONS;

/// Where king and rook start and end when castling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingPlan {
    pub side: CastlingSide,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

impl CastlingPlan {
    /// Squares a player may name as the king's destination to request
    /// this castle: the rook's square, and the king's landing square when
    /// the king travels at least two files.
    pub fn request_targets(&self) -> impl Iterator<Item = Square> {
        let landing = self.landing_is_request().then_some(self.king_to);
        std::iter::once(self.rook_from).chain(landing)
    }

    /// The one target listed among legal moves: the landing square when it
    /// requests the castle, otherwise the rook's square.
    pub fn canonical_target(&self) -> Square {
        if self.landing_is_request() {
            self.king_to
        } else {
            self.rook_from
        }
    }

    fn landing_is_request(&self) -> bool {
        let distance = self.king_to.file().index() as i8 - self.king_from.file().index() as i8;
        distance.abs() >= 2
    }
}

/// Returns the pseudo-legal destinations of the piece on `from`,
/// including castling targets for an unmoved king.
pub fn possible_moves(board: &Board, from: Square) -> Vec<Square> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    let mut targets = Vec::with_capacity(16);
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color, &mut targets),
        PieceKind::King => {
            leap(board, from, piece.color, &KING_OFFSETS, &mut targets);
            for side in CastlingSide::ALL {
                if let Ok(plan) = castling_plan(board, piece.color, side) {
                    for sq in plan.request_targets() {
                        if !targets.contains(&sq) {
                            targets.push(sq);
                        }
                    }
                }
            }
        }
        _ => attack_targets(board, from, piece, &mut targets),
    }
    targets
}

/// Squares reachable by a knight or slider, which are also the squares it
/// attacks. Pawns and kings are handled separately.
pub(crate) fn attack_targets(board: &Board, from: Square, piece: &Piece, out: &mut Vec<Square>) {
    match piece.kind {
        PieceKind::Knight => leap(board, from, piece.color, &KNIGHT_OFFSETS, out),
        PieceKind::Bishop => slide(board, from, piece.color, &BISHOP_DIRECTIONS, out),
        PieceKind::Rook => slide(board, from, piece.color, &ROOK_DIRECTIONS, out),
        PieceKind::Queen => slide(board, from, piece.color, &QUEEN_DIRECTIONS, out),
        PieceKind::King => leap(board, from, piece.color, &KING_OFFSETS, out),
        PieceKind::Pawn => {
            for file_delta in [-1, 1] {
                if let Some(sq) = from.offset(file_delta, piece.color.pawn_direction()) {
                    out.push(sq);
                }
            }
        }
    }
}

fn slide(board: &Board, from: Square, color: Color, directions: &[(i8, i8)], out: &mut Vec<Square>) {
    for &(df, dr) in directions {
        let mut current = from.offset(df, dr);
        while let Some(sq) = current {
            match board.piece_at(sq) {
                None => out.push(sq),
                Some(p) => {
                    if p.color != color {
                        out.push(sq);
                    }
                    break;
                }
            }
            current = sq.offset(df, dr);
        }
    }
}

fn leap(board: &Board, from: Square, color: Color, offsets: &[(i8, i8)], out: &mut Vec<Square>) {
    for &(df, dr) in offsets {
        if let Some(sq) = from.offset(df, dr) {
            if board.piece_at(sq).map_or(true, |p| p.color != color) {
                out.push(sq);
            }
        }
    }
}

fn pawn_moves(board: &Board, from: Square, color: Color, out: &mut Vec<Square>) {
    let dir = color.pawn_direction();
    let unmoved = board.piece_at(from).map_or(false, |p| !p.has_moved);

    if let Some(one) = from.offset(0, dir) {
        if board.piece_at(one).is_none() {
            out.push(one);
            if unmoved {
                if let Some(two) = one.offset(0, dir) {
                    if board.piece_at(two).is_none() {
                        out.push(two);
                    }
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        let Some(sq) = from.offset(file_delta, dir) else {
            continue;
        };
        match board.piece_at(sq) {
            Some(p) if p.color != color => out.push(sq),
            None if board.en_passant() == Some(sq) => out.push(sq),
            _ => {}
        }
    }
}

/// Works out how `color` would castle toward `side`, or why it cannot.
///
/// The rule is the generalized one that covers both the standard and the
/// Chess960 starting positions: the king lands on the g- or c-file and the
/// rook next to it on the f- or d-file; every square spanned by either
/// piece's journey must be empty apart from the two castling pieces; the
/// king may not be in check nor cross or land on an attacked square.
pub fn castling_plan(
    board: &Board,
    color: Color,
    side: CastlingSide,
) -> Result<CastlingPlan, &'static str> {
    if !board.castling_rights().has(color, side) {
        return Err("castling right has been lost");
    }
    let king_from = board.king_square(color).ok_or("there is no king")?;
    let rook_from = board
        .castling_rook(color, side)
        .ok_or("king or rook has already moved")?;
    let back = color.back_rank();
    let (Some(king_to), Some(rook_to)) = (
        Square::from_coords(side.king_target_file(), back),
        Square::from_coords(side.rook_target_file(), back),
    ) else {
        return Err("castling squares are off the board");
    };

    let files = [king_from, king_to, rook_from, rook_to].map(|sq| sq.file().index());
    let (low, high) = (
        files.iter().copied().min().unwrap_or(0),
        files.iter().copied().max().unwrap_or(7),
    );
    for file in low..=high {
        let Some(sq) = Square::from_coords(file, back) else {
            continue;
        };
        if sq != king_from && sq != rook_from && board.piece_at(sq).is_some() {
            return Err("path between king and rook is blocked");
        }
    }

    if is_in_check(board, color) {
        return Err("king is in check");
    }

    // The castling rook may stand on the king's path in Chess960; it is
    // lifted so it cannot shield a square it is about to leave.
    let mut lifted = board.clone();
    lifted.remove(rook_from);
    let step: i8 = if king_to > king_from { 1 } else { -1 };
    let mut sq = king_from;
    while sq != king_to {
        sq = match sq.offset(step, 0) {
            Some(next) => next,
            None => break,
        };
        if is_attacked(&lifted, sq, color.opposite()) {
            return Err("king would pass through an attacked square");
        }
    }

    Ok(CastlingPlan {
        side,
        king_from,
        king_to,
        rook_from,
        rook_to,
    })
}

/// Returns the castling side a king move from `from` to `to` asks for,
/// if it is phrased as a castle at all.
pub fn requested_castling(board: &Board, color: Color, from: Square, to: Square) -> Option<CastlingSide> {
    if from.rank().index() != color.back_rank() || to.rank() != from.rank() {
        return None;
    }
    for side in CastlingSide::ALL {
        if board.castling_rook(color, side) == Some(to) {
            return Some(side);
        }
    }
    let distance = (to.file().index() as i8 - from.file().index() as i8).abs();
    if distance < 2 {
        return None;
    }
    CastlingSide::ALL
        .into_iter()
        .find(|side| side.king_target_file() == to.file().index())
}
