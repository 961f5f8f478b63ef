//! Kirby chess: a capturing piece turns into what it captured.

use chess_core::{Color, MoveRequest, PieceKind};

use super::classic::{classic_outcome, new_piece, validate_with};
use super::{GameOver, MoveError, MoveOutcome, RuleSet, Variant};
use crate::{Board, Piece};

/// Kirby rules.
///
/// After a capture the capturer is replaced by a fresh piece of the captured
/// kind and its own color. Kings never transform, in either role. A
/// transformation settles a pending promotion, since the pawn is gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kirby;

impl RuleSet for Kirby {
    fn variant(&self) -> Variant {
        Variant::Kirby
    }

    fn initial_board(&self) -> Board {
        Board::standard()
    }

    fn validate_move(&self, board: &Board, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
        let mut outcome = validate_with(self, board, request)?;
        let Some(captured) = outcome.captured else {
            return Ok(outcome);
        };
        let Some(capturer) = outcome.board.piece_at(request.to).copied() else {
            return Ok(outcome);
        };
        if capturer.kind == PieceKind::King || captured.kind == PieceKind::King {
            return Ok(outcome);
        }

        let mut transformed = self.create_piece(&mut outcome.board, captured.kind, capturer.color);
        transformed.has_moved = true;
        outcome.board.place(request.to, transformed);

        outcome.info.transformed = Some(captured.kind);
        outcome.info.promotion_pending = false;
        outcome.info.promotion_position = None;
        Ok(outcome)
    }

    fn create_piece(&self, board: &mut Board, kind: PieceKind, color: Color) -> Piece {
        new_piece(board, kind, color)
    }

    fn check_game_over(&self, board: &Board, to_move: Color) -> Option<GameOver> {
        classic_outcome(self, board, to_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Square;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn kings() -> Board {
        let mut board = Board::empty();
        board.spawn(Square::E1, PieceKind::King, Color::White);
        board.spawn(Square::E8, PieceKind::King, Color::Black);
        board
    }

    #[test]
    fn rook_takes_bishop_becomes_bishop() {
        let mut board = kings();
        board.spawn(sq("a1"), PieceKind::Rook, Color::White);
        let bishop = board.spawn(sq("a6"), PieceKind::Bishop, Color::Black);
        let rook_id = board.piece_at(sq("a1")).unwrap().id;

        let outcome = Kirby
            .validate_move(&board, &MoveRequest::new(sq("a1"), sq("a6"), Color::White))
            .unwrap();
        let piece = outcome.board.piece_at(sq("a6")).unwrap();
        assert_eq!(piece.kind, PieceKind::Bishop);
        assert_eq!(piece.color, Color::White);
        assert!(piece.id != rook_id && piece.id != bishop);
        assert_eq!(outcome.info.captured, Some(bishop));
        assert_eq!(outcome.info.transformed, Some(PieceKind::Bishop));
    }

    #[test]
    fn quiet_moves_do_not_transform() {
        let outcome = Kirby
            .validate_move(&Board::standard(), &MoveRequest::new(sq("g1"), sq("f3"), Color::White))
            .unwrap();
        assert_eq!(outcome.board.piece_at(sq("f3")).unwrap().kind, PieceKind::Knight);
        assert_eq!(outcome.info.transformed, None);
    }

    #[test]
    fn capturing_king_keeps_identity() {
        let mut board = kings();
        board.spawn(sq("d2"), PieceKind::Knight, Color::Black);
        let king_id = board.piece_at(Square::E1).unwrap().id;
        let outcome = Kirby
            .validate_move(&board, &MoveRequest::new(Square::E1, sq("d2"), Color::White))
            .unwrap();
        let king = outcome.board.piece_at(sq("d2")).unwrap();
        assert_eq!(king.kind, PieceKind::King);
        assert_eq!(king.id, king_id);
        assert_eq!(outcome.info.transformed, None);
    }

    #[test]
    fn transformation_settles_promotion() {
        let mut board = kings();
        board.spawn(sq("b7"), PieceKind::Pawn, Color::White);
        board.spawn(sq("a8"), PieceKind::Rook, Color::Black);
        let outcome = Kirby
            .validate_move(&board, &MoveRequest::new(sq("b7"), sq("a8"), Color::White))
            .unwrap();
        assert!(!outcome.info.promotion_pending);
        assert_eq!(outcome.info.promotion_position, None);
        assert_eq!(outcome.board.piece_at(sq("a8")).unwrap().kind, PieceKind::Rook);
        assert_eq!(outcome.board.piece_at(sq("a8")).unwrap().color, Color::White);
    }

    #[test]
    fn illegal_capture_is_still_rejected() {
        let mut board = kings();
        board.spawn(sq("e2"), PieceKind::Rook, Color::White);
        board.spawn(sq("e7"), PieceKind::Queen, Color::Black);
        board.spawn(sq("a2"), PieceKind::Pawn, Color::Black);
        assert_eq!(
            Kirby.validate_move(&board, &MoveRequest::new(sq("e2"), sq("a2"), Color::White)),
            Err(MoveError::LeavesKingInCheck(Color::White))
        );
    }
}
