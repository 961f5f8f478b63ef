//! Parsing errors for textual chess identifiers.

use thiserror::Error;

/// Errors that can occur when parsing squares and piece names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid square: '{0}'")]
    InvalidSquare(String),

    #[error("invalid piece kind: '{0}'")]
    InvalidPieceKind(String),

    #[error("invalid color: '{0}'")]
    InvalidColor(String),
}
