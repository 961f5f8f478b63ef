//! Chess960 (Fischer random chess).
//!
//! Only the starting position differs from standard chess. Castling already
//! follows the generalized rule in [`crate::moves::castling_plan`], so the
//! standard validation applies unchanged.

use chess_core::{Color, MoveRequest, PieceKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::classic::{classic_outcome, new_piece, validate_with};
use super::{GameOver, MoveError, MoveOutcome, RuleSet, Variant};
use crate::{Board, Piece};

/// Reasons a back rank layout is not a valid Chess960 start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout must name 8 pieces, got {0}")]
    WrongLength(usize),

    #[error("invalid piece letter '{0}' in layout")]
    InvalidPiece(char),

    #[error("layout must hold one king, one queen, two rooks, two bishops and two knights")]
    WrongPieceCounts,

    #[error("bishops must stand on opposite-colored squares")]
    BishopsSameColor,

    #[error("king must stand between the rooks")]
    KingNotBetweenRooks,
}

/// Chess960 rules with a back rank fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chess960 {
    back_rank: [PieceKind; 8],
}

impl Default for Chess960 {
    fn default() -> Self {
        Chess960 {
            back_rank: Board::STANDARD_BACK_RANK,
        }
    }
}

impl Chess960 {
    /// Draws a layout from a seeded generator. The same seed always yields
    /// the same layout.
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// Draws a layout from the thread-local generator.
    pub fn random() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Draws a layout from `rng`.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut slots: [Option<PieceKind>; 8] = [None; 8];

        // a1 is dark, so even files are dark squares on the first rank.
        slots[rng.gen_range(0..4usize) * 2] = Some(PieceKind::Bishop);
        slots[rng.gen_range(0..4usize) * 2 + 1] = Some(PieceKind::Bishop);

        for kind in [PieceKind::Queen, PieceKind::Knight, PieceKind::Knight] {
            let free: Vec<usize> = (0..8).filter(|&i| slots[i].is_none()).collect();
            let pick = free[rng.gen_range(0..free.len())];
            slots[pick] = Some(kind);
        }

        // The three remaining squares take rook, king, rook in file order.
        let mut rest = [PieceKind::Rook, PieceKind::King, PieceKind::Rook].into_iter();
        for slot in slots.iter_mut().filter(|s| s.is_none()) {
            *slot = rest.next();
        }

        let back_rank = slots.map(|s| s.unwrap_or(PieceKind::Rook));
        Chess960 { back_rank }
    }

    /// Uses an explicit layout such as `"RNBQKBNR"`, validating it.
    pub fn from_layout(layout: &str) -> Result<Self, LayoutError> {
        let letters: Vec<char> = layout.trim().chars().collect();
        if letters.len() != 8 {
            return Err(LayoutError::WrongLength(letters.len()));
        }
        let mut back_rank = [PieceKind::Pawn; 8];
        for (slot, &c) in back_rank.iter_mut().zip(&letters) {
            *slot = c
                .to_string()
                .parse::<PieceKind>()
                .map_err(|_| LayoutError::InvalidPiece(c))?;
        }
        validate_layout(&back_rank)?;
        Ok(Chess960 { back_rank })
    }

    /// The white back rank from the a-file to the h-file.
    pub fn layout(&self) -> [PieceKind; 8] {
        self.back_rank
    }

    /// The layout as uppercase piece letters, accepted by [`Self::from_layout`].
    pub fn layout_string(&self) -> String {
        self.back_rank.iter().map(|k| k.to_char(Color::White)).collect()
    }
}

/// Checks the Chess960 constraints on a back rank.
pub fn validate_layout(back_rank: &[PieceKind; 8]) -> Result<(), LayoutError> {
    let count = |kind: PieceKind| back_rank.iter().filter(|&&k| k == kind).count();
    let counts_ok = count(PieceKind::King) == 1
        && count(PieceKind::Queen) == 1
        && count(PieceKind::Rook) == 2
        && count(PieceKind::Bishop) == 2
        && count(PieceKind::Knight) == 2;
    if !counts_ok {
        return Err(LayoutError::WrongPieceCounts);
    }

    let files_of = |kind: PieceKind| {
        back_rank
            .iter()
            .enumerate()
            .filter(move |(_, k)| **k == kind)
            .map(|(i, _)| i)
    };
    let bishops: Vec<usize> = files_of(PieceKind::Bishop).collect();
    if bishops[0] % 2 == bishops[1] % 2 {
        return Err(LayoutError::BishopsSameColor);
    }
    let rooks: Vec<usize> = files_of(PieceKind::Rook).collect();
    let king = files_of(PieceKind::King).next().unwrap_or(0);
    if !(rooks[0] < king && king < rooks[1]) {
        return Err(LayoutError::KingNotBetweenRooks);
    }
    Ok(())
}

impl RuleSet for Chess960 {
    fn variant(&self) -> Variant {
        Variant::Chess960
    }

    fn initial_board(&self) -> Board {
        Board::with_back_rank(&self.back_rank)
    }

    fn validate_move(&self, board: &Board, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
        validate_with(self, board, request)
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
    use crate::CastlingRights;
    use chess_core::{CastlingSide, Square};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn seeded_layouts_are_valid(seed in any::<u64>()) {
            let rules = Chess960::from_seed(seed);
            prop_assert_eq!(validate_layout(&rules.layout()), Ok(()));
            prop_assert_eq!(Chess960::from_seed(seed), rules);
        }

        #[test]
        fn black_mirrors_white(seed in any::<u64>()) {
            let board = Chess960::from_seed(seed).initial_board();
            for file in 0..8u8 {
                let white = board.piece_at(Square::from_coords(file, 0).unwrap()).unwrap();
                let black = board.piece_at(Square::from_coords(file, 7).unwrap()).unwrap();
                prop_assert_eq!(white.kind, black.kind);
                prop_assert_eq!(white.color, Color::White);
                prop_assert_eq!(black.color, Color::Black);
            }
            prop_assert_eq!(board.castling_rights(), CastlingRights::ALL);
        }
    }

    #[test]
    fn layout_string_round_trip() {
        let rules = Chess960::from_layout("bbqnnrkr").unwrap();
        assert_eq!(rules.layout_string(), "BBQNNRKR");
        assert_eq!(Chess960::from_layout(&rules.layout_string()), Ok(rules));
    }

    #[test]
    fn invalid_layouts() {
        assert_eq!(Chess960::from_layout("RNBQK"), Err(LayoutError::WrongLength(5)));
        assert_eq!(Chess960::from_layout("RNBQKBNX"), Err(LayoutError::InvalidPiece('X')));
        assert_eq!(Chess960::from_layout("RNBQQBNR"), Err(LayoutError::WrongPieceCounts));
        assert_eq!(Chess960::from_layout("RBNBKQNR"), Err(LayoutError::BishopsSameColor));
        assert_eq!(Chess960::from_layout("KRBQRBNN"), Err(LayoutError::KingNotBetweenRooks));
    }

    #[test]
    fn castling_onto_adjacent_rook() {
        // King f1, kingside rook g1: the king already nearly stands on g1,
        // so only "king takes rook" can ask for this castle.
        let rules = Chess960::from_layout("RNBBQKRN").unwrap();
        let board = rules.initial_board();
        let request = MoveRequest::new(Square::F1, Square::G1, Color::White);
        let outcome = rules.validate_move(&board, &request).unwrap();
        assert_eq!(outcome.info.castling, Some(CastlingSide::Kingside));
        assert_eq!(outcome.board.piece_at(Square::G1).unwrap().kind, PieceKind::King);
        assert_eq!(outcome.board.piece_at(Square::F1).unwrap().kind, PieceKind::Rook);
    }

    #[test]
    fn castling_where_king_does_not_move() {
        // King on g1 with the rook on h1 keeps its square; the rook hops to f1.
        let rules = Chess960::from_layout("RNBQNBKR").unwrap();
        let mut board = rules.initial_board();
        board.remove(Square::F1);
        let request = MoveRequest::new(Square::G1, Square::H1, Color::White);
        let outcome = rules.validate_move(&board, &request).unwrap();
        assert_eq!(outcome.board.piece_at(Square::G1).unwrap().kind, PieceKind::King);
        assert_eq!(outcome.board.piece_at(Square::F1).unwrap().kind, PieceKind::Rook);
        assert!(outcome.board.piece_at(Square::H1).is_none());
    }

    #[test]
    fn twenty_moves_or_more_at_start() {
        let rules = Chess960::from_seed(3);
        let board = rules.initial_board();
        // Every pawn has two pushes; knights add more.
        assert!(rules.legal_moves(&board, Color::White).len() >= 16);
        assert_eq!(rules.check_game_over(&board, Color::White), None);
    }
}
