//! Chess rules engine with pluggable variants.
//!
//! This crate provides:
//! - [`Board`] - Piece placement with castling rights and en passant state
//! - [`RuleSet`] - Trait for implementing chess variants, with [`Classic`],
//!   [`Chess960`], [`Horde`], [`Kirby`] and [`Bomb`]
//! - [`Game`] - A session with turn order, promotion handling, history and
//!   draw detection
//! - [`BoardSnapshot`] - The serializable form of a board
//! - [`SessionConfig`] - TOML session configuration
//!
//! # Architecture
//!
//! A board is a plain value holding 64 optional pieces. Move validation
//! clones it, plays the move on the clone and hands the clone back only if
//! the move is legal, so rejected moves never leave a trace.
//!
//! # Example
//!
//! ```
//! use chess_rules::{Color, Game, MoveRequest, Square};
//!
//! let mut game = Game::new();
//! let e2 = Square::from_algebraic("e2").unwrap();
//! let e4 = Square::from_algebraic("e4").unwrap();
//! game.make_move(MoveRequest::new(e2, e4, Color::White)).unwrap();
//! assert_eq!(game.active_color(), Color::Black);
//! println!("Legal replies: {}", game.legal_moves().len());
//! ```

pub mod attacks;
mod board;
pub mod config;
mod game;
pub mod moves;
pub mod rules;
pub mod snapshot;
mod zobrist;

pub use attacks::{is_attacked, is_in_check};
pub use board::{Board, CastlingRights, Piece, PieceId};
pub use config::{ConfigError, DrawRules, SessionConfig};
pub use game::{Game, GameError, GameStatus, MoveRecord, MoveResult};
pub use moves::{castling_plan, possible_moves, CastlingPlan};
pub use rules::{
    is_insufficient_material, Bomb, Chess960, Classic, EnPassantInfo, GameOver, Horde, Kirby,
    LayoutError, MoveError, MoveInfo, MoveOutcome, RuleSet, Rules, TerminalReason, Variant,
};
pub use snapshot::{board_to_snapshot, snapshot_to_board, BoardSnapshot, PieceSnapshot, SnapshotError};
pub use zobrist::{fingerprint, Fingerprint};

pub use chess_core::{CastlingSide, Color, File, MoveRequest, PieceKind, Rank, Square};
