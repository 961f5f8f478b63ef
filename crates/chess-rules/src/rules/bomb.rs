//! Bomb chess: captures explode.

use chess_core::{Color, MoveRequest, PieceKind, Square};

use super::classic::{apply_unchecked, classic_outcome, new_piece, promote};
use super::{GameOver, MoveError, MoveOutcome, RuleSet, TerminalReason, Variant};
use crate::attacks::is_in_check;
use crate::moves::KING_OFFSETS;
use crate::{Board, Piece};

/// Bomb rules.
///
/// Every capture removes all non-pawn pieces of either color on the eight
/// squares around the destination. The capturing piece survives. Losing a
/// king this way ends the game at once; a pawn that promotes with such a
/// capture and names no piece becomes a queen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bomb;

impl Bomb {
    fn explode(board: &mut Board, center: Square) -> Vec<crate::PieceId> {
        let mut destroyed = Vec::new();
        for &(df, dr) in &KING_OFFSETS {
            let Some(sq) = center.offset(df, dr) else {
                continue;
            };
            if board.piece_at(sq).map_or(false, |p| p.kind != PieceKind::Pawn) {
                if let Some(piece) = board.remove(sq) {
                    destroyed.push(piece.id);
                }
            }
        }
        destroyed.sort();
        destroyed
    }
}

impl RuleSet for Bomb {
    fn variant(&self) -> Variant {
        Variant::Bomb
    }

    fn initial_board(&self) -> Board {
        Board::standard()
    }

    /// King safety is judged after the blast: a move that destroys the enemy
    /// king is legal even if it would otherwise expose the mover's king.
    fn validate_move(&self, board: &Board, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
        let mut outcome = apply_unchecked(self, board, request)?;
        if outcome.captured.is_some() {
            outcome.info.exploded = Self::explode(&mut outcome.board, request.to);
            outcome.board.revoke_stale_castling();
        }

        let enemy_king_survives = outcome.board.king_square(request.color.opposite()).is_some();
        if enemy_king_survives && is_in_check(&outcome.board, request.color) {
            return Err(MoveError::LeavesKingInCheck(request.color));
        }

        // A lost king ends the game on this move, so nothing is left pending.
        let king_lost = !enemy_king_survives || outcome.board.king_square(request.color).is_none();
        if king_lost && outcome.info.promotion_pending {
            promote(self, &mut outcome.board, request.to, PieceKind::Queen, request.color)?;
            outcome.info.promotion_pending = false;
            outcome.info.promotion_position = None;
        }
        Ok(outcome)
    }

    fn create_piece(&self, board: &mut Board, kind: PieceKind, color: Color) -> Piece {
        new_piece(board, kind, color)
    }

    fn check_game_over(&self, board: &Board, to_move: Color) -> Option<GameOver> {
        match (board.king_square(Color::White), board.king_square(Color::Black)) {
            (Some(_), Some(_)) => classic_outcome(self, board, to_move),
            (Some(_), None) => Some(GameOver::win(TerminalReason::KingExploded, Color::White)),
            (None, Some(_)) => Some(GameOver::win(TerminalReason::KingExploded, Color::Black)),
            (None, None) => Some(GameOver::draw(TerminalReason::KingExploded)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn mv(from: &str, to: &str, color: Color) -> MoveRequest {
        MoveRequest::new(sq(from), sq(to), color)
    }

    #[test]
    fn explosion_spares_pawns_and_the_capturer() {
        let mut board = Board::empty();
        board.spawn(sq("a1"), PieceKind::King, Color::White);
        board.spawn(sq("h8"), PieceKind::King, Color::Black);
        board.spawn(sq("d1"), PieceKind::Rook, Color::White);
        let target = board.spawn(sq("d5"), PieceKind::Knight, Color::Black);
        let pawn = board.spawn(sq("e5"), PieceKind::Pawn, Color::Black);
        let bishop = board.spawn(sq("c6"), PieceKind::Bishop, Color::Black);
        let own = board.spawn(sq("e4"), PieceKind::Knight, Color::White);

        let outcome = Bomb.validate_move(&board, &mv("d1", "d5", Color::White)).unwrap();
        assert_eq!(outcome.info.captured, Some(target));
        assert_eq!(outcome.info.exploded, {
            let mut ids = vec![bishop, own];
            ids.sort();
            ids
        });
        assert_eq!(outcome.board.piece_at(sq("d5")).unwrap().kind, PieceKind::Rook);
        assert_eq!(outcome.board.piece_at(sq("e5")).unwrap().id, pawn);
        assert!(outcome.board.piece_at(sq("c6")).is_none());
        assert!(outcome.board.piece_at(sq("e4")).is_none());
    }

    #[test]
    fn quiet_move_does_not_explode() {
        let outcome = Bomb
            .validate_move(&Board::standard(), &mv("b1", "c3", Color::White))
            .unwrap();
        assert!(outcome.info.exploded.is_empty());
    }

    #[test]
    fn blast_next_to_king_ends_the_game() {
        let mut board = Board::empty();
        board.spawn(sq("e1"), PieceKind::King, Color::White);
        board.spawn(sq("e8"), PieceKind::King, Color::Black);
        board.spawn(sq("d1"), PieceKind::Queen, Color::White);
        board.spawn(sq("d7"), PieceKind::Pawn, Color::Black);

        let outcome = Bomb.validate_move(&board, &mv("d1", "d7", Color::White)).unwrap();
        assert_eq!(outcome.board.king_square(Color::Black), None);
        assert_eq!(
            Bomb.check_game_over(&outcome.board, Color::Black),
            Some(GameOver::win(TerminalReason::KingExploded, Color::White))
        );
    }

    #[test]
    fn king_blast_promotion_does_not_wait_for_a_choice() {
        let mut board = Board::empty();
        board.spawn(sq("e1"), PieceKind::King, Color::White);
        board.spawn(sq("b8"), PieceKind::King, Color::Black);
        board.spawn(sq("b7"), PieceKind::Pawn, Color::White);
        board.spawn(sq("a8"), PieceKind::Rook, Color::Black);

        let outcome = Bomb.validate_move(&board, &mv("b7", "a8", Color::White)).unwrap();
        assert!(!outcome.info.promotion_pending);
        assert_eq!(outcome.board.king_square(Color::Black), None);
        let piece = outcome.board.piece_at(sq("a8")).unwrap();
        assert_eq!((piece.kind, piece.color), (PieceKind::Queen, Color::White));

        let chosen = Bomb
            .validate_move(&board, &mv("b7", "a8", Color::White).promoting_to(PieceKind::Knight))
            .unwrap();
        assert_eq!(chosen.board.piece_at(sq("a8")).unwrap().kind, PieceKind::Knight);
    }

    #[test]
    fn promotion_without_king_blast_still_waits() {
        let mut board = Board::empty();
        board.spawn(sq("e1"), PieceKind::King, Color::White);
        board.spawn(sq("h8"), PieceKind::King, Color::Black);
        board.spawn(sq("b7"), PieceKind::Pawn, Color::White);
        board.spawn(sq("a8"), PieceKind::Rook, Color::Black);

        let outcome = Bomb.validate_move(&board, &mv("b7", "a8", Color::White)).unwrap();
        assert!(outcome.info.promotion_pending);
        assert_eq!(outcome.board.piece_at(sq("a8")).unwrap().kind, PieceKind::Pawn);
    }

    #[test]
    fn both_kings_lost_has_no_winner() {
        let mut board = Board::empty();
        board.spawn(sq("d4"), PieceKind::King, Color::White);
        board.spawn(sq("f4"), PieceKind::King, Color::Black);
        board.spawn(sq("e1"), PieceKind::Rook, Color::White);
        board.spawn(sq("e4"), PieceKind::Pawn, Color::Black);

        let outcome = Bomb.validate_move(&board, &mv("e1", "e4", Color::White)).unwrap();
        assert_eq!(
            Bomb.check_game_over(&outcome.board, Color::Black),
            Some(GameOver::draw(TerminalReason::KingExploded))
        );
    }

    #[test]
    fn blast_removing_the_pinner_makes_the_capture_legal() {
        let mut board = Board::empty();
        board.spawn(sq("a1"), PieceKind::King, Color::White);
        board.spawn(sq("h8"), PieceKind::King, Color::Black);
        board.spawn(sq("e5"), PieceKind::Rook, Color::White);
        board.spawn(sq("f6"), PieceKind::Bishop, Color::Black);
        board.spawn(sq("e6"), PieceKind::Pawn, Color::Black);

        let request = mv("e5", "e6", Color::White);
        assert_eq!(
            crate::rules::Classic.validate_move(&board, &request),
            Err(MoveError::LeavesKingInCheck(Color::White))
        );
        let outcome = Bomb.validate_move(&board, &request).unwrap();
        assert!(outcome.board.piece_at(sq("f6")).is_none());
    }

    #[test]
    fn blast_exposing_own_king_is_illegal() {
        let mut board = Board::empty();
        board.spawn(sq("e1"), PieceKind::King, Color::White);
        board.spawn(sq("h8"), PieceKind::King, Color::Black);
        board.spawn(sq("e2"), PieceKind::Bishop, Color::White);
        board.spawn(sq("c1"), PieceKind::Knight, Color::White);
        board.spawn(sq("e8"), PieceKind::Rook, Color::Black);
        board.spawn(sq("d3"), PieceKind::Pawn, Color::Black);

        let request = mv("c1", "d3", Color::White);
        assert!(crate::rules::Classic.validate_move(&board, &request).is_ok());
        assert_eq!(
            Bomb.validate_move(&board, &request),
            Err(MoveError::LeavesKingInCheck(Color::White))
        );
    }

    #[test]
    fn explosion_revokes_castling() {
        let mut board = Board::empty();
        board.spawn(sq("e1"), PieceKind::King, Color::White);
        board.spawn(sq("e8"), PieceKind::King, Color::Black);
        board.spawn(sq("h8"), PieceKind::Rook, Color::Black);
        board.spawn(sq("g7"), PieceKind::Pawn, Color::Black);
        board.spawn(sq("b2"), PieceKind::Bishop, Color::White);
        board.set_castling_rights(crate::CastlingRights::ALL);
        board.revoke_stale_castling();
        assert!(board
            .castling_rights()
            .has(Color::Black, chess_core::CastlingSide::Kingside));

        let outcome = Bomb.validate_move(&board, &mv("b2", "g7", Color::White)).unwrap();
        assert!(outcome.board.piece_at(sq("h8")).is_none());
        assert!(outcome.board.castling_rights().is_empty());
    }
}
