//! Horde chess.
//!
//! White is a horde of 36 pawns without a king; black has the standard
//! army. A side loses once it has no pieces left.

use chess_core::{Color, MoveRequest, PieceKind, Square};

use super::classic::{new_piece, standard_outcome, validate_with};
use super::{GameOver, MoveError, MoveOutcome, RuleSet, TerminalReason, Variant};
use crate::{Board, CastlingRights, Piece};

/// Files of the four extra horde pawns on the fifth rank.
const FIFTH_RANK_FILES: [u8; 4] = [1, 2, 5, 6];

/// Horde rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Horde;

impl RuleSet for Horde {
    fn variant(&self) -> Variant {
        Variant::Horde
    }

    fn initial_board(&self) -> Board {
        let mut board = Board::empty();

        for (file, &kind) in Board::STANDARD_BACK_RANK.iter().enumerate() {
            if let Some(sq) = Square::from_coords(file as u8, 7) {
                board.spawn(sq, kind, Color::Black);
            }
            if let Some(sq) = Square::from_coords(file as u8, 6) {
                board.spawn(sq, PieceKind::Pawn, Color::Black);
            }
        }

        let horde = (0..4u8)
            .flat_map(|rank| (0..8u8).map(move |file| (file, rank)))
            .chain(FIFTH_RANK_FILES.iter().map(|&file| (file, 4)));
        for (file, rank) in horde {
            let Some(sq) = Square::from_coords(file, rank) else {
                continue;
            };
            board.spawn(sq, PieceKind::Pawn, Color::White);
            // Only pawns on the first two ranks keep the double step.
            if rank >= 2 {
                if let Some(pawn) = board.piece_at_mut(sq) {
                    pawn.has_moved = true;
                }
            }
        }

        board.set_castling_rights(CastlingRights::ALL);
        board.revoke_stale_castling();
        board
    }

    fn validate_move(&self, board: &Board, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
        validate_with(self, board, request)
    }

    fn create_piece(&self, board: &mut Board, kind: PieceKind, color: Color) -> Piece {
        new_piece(board, kind, color)
    }

    /// Elimination first, then checkmate and stalemate. Material draws do
    /// not apply: the horde can always still promote.
    fn check_game_over(&self, board: &Board, to_move: Color) -> Option<GameOver> {
        if let Some(&eliminated) = Color::ALL.iter().find(|&&c| board.count(c) == 0) {
            return Some(GameOver::win(TerminalReason::HordeWin, eliminated.opposite()));
        }
        standard_outcome(self, board, to_move)
    }
}
