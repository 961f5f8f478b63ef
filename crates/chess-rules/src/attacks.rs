//! Attack and check detection.
//!
//! Kings are resolved by adjacency and pawns by their diagonal capture
//! offsets; every other piece attacks exactly the squares it could move to.
//! Nothing here consults castling, so attack resolution never re-enters
//! itself and always finishes after one pass over the attacking pieces.

use chess_core::{Color, PieceKind, Square};

use crate::moves::{attack_targets, KING_OFFSETS};
use crate::Board;

/// Returns true if any piece of `by_color` attacks `square`.
pub fn is_attacked(board: &Board, square: Square, by_color: Color) -> bool {
    let mut targets = Vec::with_capacity(32);
    for (from, piece) in board.pieces_of(by_color) {
        let hit = match piece.kind {
            PieceKind::King => KING_OFFSETS
                .iter()
                .any(|&(df, dr)| from.offset(df, dr) == Some(square)),
            PieceKind::Pawn => [-1, 1]
                .iter()
                .any(|&df| from.offset(df, by_color.pawn_direction()) == Some(square)),
            _ => {
                targets.clear();
                attack_targets(board, from, piece, &mut targets);
                targets.contains(&square)
            }
        };
        if hit {
            return true;
        }
    }
    false
}

/// Returns true if the king of the given color is attacked.
///
/// A side without a king (the Horde, or a king lost to an explosion) is
/// never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_square(color)
        .map_or(false, |king| is_attacked(board, king, color.opposite()))
}
