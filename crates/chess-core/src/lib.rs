//! Core types for chess.
//!
//! This crate provides the fundamental types shared by the rules engine and
//! its collaborators:
//! - [`Color`] and [`PieceKind`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`MoveRequest`] and [`CastlingSide`] for the move boundary
//! - [`ParseError`] for textual square and piece names

mod color;
mod error;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use error::ParseError;
pub use mov::{CastlingSide, MoveRequest};
pub use piece::PieceKind;
pub use square::{File, Rank, Square};
