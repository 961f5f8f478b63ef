//! Position fingerprints for repetition detection.
//!
//! A fingerprint is a Zobrist hash: random keys associated with
//! - each piece kind and color on each square (6 × 2 × 64 values),
//! - the side to move,
//! - each castling right (4 values),
//! - the en passant file (8 values),
//! XORed together. Two positions with the same placement, castling rights,
//! en passant state and side to move always share a fingerprint.

use chess_core::{CastlingSide, Color, PieceKind, Square};
use serde::{Deserialize, Serialize};

use crate::Board;

/// Canonical hash of a position, as stored in the position history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u64);

/// Zobrist hash keys.
///
/// Generated at compile time from a fixed seed, so fingerprints are stable
/// across runs and processes.
struct ZobristKeys {
    pieces: [[[u64; 64]; 2]; 6],
    black_to_move: u64,
    castling: [u64; 4],
    en_passant: [u64; 8],
}

impl ZobristKeys {
    const fn new() -> Self {
        // xorshift64
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E3779B97F4A7C15u64;
        let mut pieces = [[[0u64; 64]; 2]; 6];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut piece = 0;
        while piece < 6 {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[piece][color][square] = state;
                    square += 1;
                }
                color += 1;
            }
            piece += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 4 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    const fn piece_key(&self, kind: PieceKind, color: Color, square: Square) -> u64 {
        self.pieces[kind.index()][color.index()][square.index() as usize]
    }
}

static ZOBRIST: ZobristKeys = ZobristKeys::new();

/// Computes the fingerprint of `board` with `to_move` about to play.
pub fn fingerprint(board: &Board, to_move: Color) -> Fingerprint {
    let mut hash = 0u64;
    for (sq, piece) in board.pieces() {
        hash ^= ZOBRIST.piece_key(piece.kind, piece.color, sq);
    }
    if to_move == Color::Black {
        hash ^= ZOBRIST.black_to_move;
    }
    let rights = board.castling_rights();
    for (i, (color, side)) in [
        (Color::White, CastlingSide::Kingside),
        (Color::White, CastlingSide::Queenside),
        (Color::Black, CastlingSide::Kingside),
        (Color::Black, CastlingSide::Queenside),
    ]
    .into_iter()
    .enumerate()
    {
        if rights.has(color, side) {
            hash ^= ZOBRIST.castling[i];
        }
    }
    if let Some(ep) = board.en_passant() {
        hash ^= ZOBRIST.en_passant[ep.file().index() as usize];
    }
    Fingerprint(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zobrist_keys_are_unique() {
        let key1 = ZOBRIST.piece_key(PieceKind::Pawn, Color::White, Square::A1);
        let key2 = ZOBRIST.piece_key(PieceKind::Pawn, Color::White, Square::B1);
        let key3 = ZOBRIST.piece_key(PieceKind::Pawn, Color::Black, Square::A1);
        let key4 = ZOBRIST.piece_key(PieceKind::Knight, Color::White, Square::A1);

        assert_ne!(key1, key2);
        assert_ne!(key1, key3);
        assert_ne!(key1, key4);
        assert_ne!(ZOBRIST.black_to_move, 0);
    }

    #[test]
    fn same_position_same_fingerprint() {
        let a = Board::standard();
        let b = Board::standard();
        assert_eq!(fingerprint(&a, Color::White), fingerprint(&b, Color::White));
    }

    #[test]
    fn side_to_move_changes_fingerprint() {
        let board = Board::standard();
        assert_ne!(
            fingerprint(&board, Color::White),
            fingerprint(&board, Color::Black)
        );
    }

    #[test]
    fn castling_and_en_passant_change_fingerprint() {
        let board = Board::standard();
        let base = fingerprint(&board, Color::White);

        let mut no_castle = board.clone();
        no_castle.set_castling_rights(crate::CastlingRights::NONE);
        assert_ne!(fingerprint(&no_castle, Color::White), base);

        let mut ep = board.clone();
        ep.set_en_passant(Square::from_algebraic("e3"));
        assert_ne!(fingerprint(&ep, Color::White), base);
    }

    #[test]
    fn piece_ids_do_not_matter() {
        let mut a = Board::empty();
        a.spawn(Square::E1, PieceKind::King, Color::White);
        let mut b = Board::empty();
        b.allocate_id();
        b.spawn(Square::E1, PieceKind::King, Color::White);
        assert_eq!(fingerprint(&a, Color::White), fingerprint(&b, Color::White));
    }
}
