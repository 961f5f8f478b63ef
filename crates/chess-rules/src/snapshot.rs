//! Plain attribute-map form of a board, for transport and persistence.
//!
//! A snapshot maps every square name to `null` or a piece record. Castling
//! rights travel on the king record and the en passant target is implied by
//! the single vulnerable pawn. An optional `nextPieceId` entry carries the
//! id allocator, so ids of removed pieces stay retired after a restore.

use chess_core::{CastlingSide, Color, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::{Board, CastlingRights, Piece, PieceId};

/// Errors that can occur when loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid square key: {0}")]
    InvalidSquare(String),

    #[error("piece stored under {key} claims position {position}")]
    PositionMismatch { key: Square, position: Square },

    #[error("more than one {0} king")]
    DuplicateKing(Color),

    #[error("piece id {0} appears more than once")]
    DuplicateId(PieceId),

    #[error("piece id {0} is out of range")]
    IdOutOfRange(PieceId),

    #[error("invalid en passant flag on {0}")]
    InvalidEnPassant(Square),

    #[error("failed to parse snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Castling flags stored on a king record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingFlags {
    pub kingside: bool,
    pub queenside: bool,
}

/// One piece in a [`BoardSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceSnapshot {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub color: Color,
    pub position: Square,
    pub piece_id: PieceId,
    pub has_moved: bool,
    /// Present on pawns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_passant_vulnerable: Option<bool>,
    /// Present on kings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castling_rights: Option<CastlingFlags>,
}

/// Square name to optional piece, plus the id allocator position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(flatten)]
    pub squares: BTreeMap<String, Option<PieceSnapshot>>,
    /// Absent in snapshots written by older clients; ids then continue after
    /// the highest one on the board.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_piece_id: Option<PieceId>,
}

impl From<BTreeMap<String, Option<PieceSnapshot>>> for BoardSnapshot {
    fn from(squares: BTreeMap<String, Option<PieceSnapshot>>) -> Self {
        BoardSnapshot {
            squares,
            next_piece_id: None,
        }
    }
}

impl BoardSnapshot {
    /// Returns the record stored for `square`, if any.
    pub fn get(&self, square: Square) -> Option<&PieceSnapshot> {
        self.squares.get(&square.to_algebraic()).and_then(Option::as_ref)
    }

    /// Serializes to a JSON string.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses and validates a JSON snapshot.
    pub fn board_from_json(json: &str) -> Result<Board, SnapshotError> {
        let snapshot: BoardSnapshot = serde_json::from_str(json)?;
        snapshot_to_board(&snapshot)
    }
}

/// Converts a board into its snapshot form. Every square gets an entry.
pub fn board_to_snapshot(board: &Board) -> BoardSnapshot {
    let rights = board.castling_rights();
    let map = Square::all()
        .map(|sq| {
            let record = board.piece_at(sq).map(|piece| PieceSnapshot {
                kind: piece.kind,
                color: piece.color,
                position: sq,
                piece_id: piece.id,
                has_moved: piece.has_moved,
                en_passant_vulnerable: (piece.kind == PieceKind::Pawn)
                    .then_some(piece.en_passant_vulnerable),
                castling_rights: (piece.kind == PieceKind::King).then(|| CastlingFlags {
                    kingside: rights.has(piece.color, CastlingSide::Kingside),
                    queenside: rights.has(piece.color, CastlingSide::Queenside),
                }),
            });
            (sq.to_algebraic(), record)
        })
        .collect();
    BoardSnapshot {
        squares: map,
        next_piece_id: Some(board.next_piece_id()),
    }
}

/// Rebuilds a board from a snapshot, validating it on the way.
///
/// Missing squares are empty. Castling rights that the placement cannot
/// support are dropped. Ids continue from `nextPieceId` or from the highest
/// id present, whichever is later.
pub fn snapshot_to_board(snapshot: &BoardSnapshot) -> Result<Board, SnapshotError> {
    let mut board = Board::empty();
    let mut rights = CastlingRights::NONE;
    let mut ids = HashSet::new();
    let mut kings = [false; 2];
    let mut vulnerable: Option<Square> = None;

    for (key, record) in &snapshot.squares {
        let square = Square::from_algebraic(key).ok_or_else(|| SnapshotError::InvalidSquare(key.clone()))?;
        let Some(record) = record else {
            continue;
        };
        if record.position != square {
            return Err(SnapshotError::PositionMismatch {
                key: square,
                position: record.position,
            });
        }
        if record.piece_id == PieceId::MAX {
            return Err(SnapshotError::IdOutOfRange(record.piece_id));
        }
        if !ids.insert(record.piece_id) {
            return Err(SnapshotError::DuplicateId(record.piece_id));
        }

        if record.kind == PieceKind::King {
            let seen = &mut kings[record.color.index()];
            if *seen {
                return Err(SnapshotError::DuplicateKing(record.color));
            }
            *seen = true;
            if let Some(flags) = record.castling_rights {
                rights.set(record.color, CastlingSide::Kingside, flags.kingside);
                rights.set(record.color, CastlingSide::Queenside, flags.queenside);
            }
        }

        let en_passant_vulnerable = record.en_passant_vulnerable.unwrap_or(false);
        if en_passant_vulnerable {
            if record.kind != PieceKind::Pawn || vulnerable.is_some() {
                return Err(SnapshotError::InvalidEnPassant(square));
            }
            vulnerable = Some(square);
        }

        board.place(
            square,
            Piece {
                kind: record.kind,
                color: record.color,
                id: record.piece_id,
                has_moved: record.has_moved,
                en_passant_vulnerable,
            },
        );
    }

    if let Some(pawn_sq) = vulnerable {
        let color = board.piece_at(pawn_sq).map(|p| p.color);
        let target = color.and_then(|c| pawn_sq.offset(0, -c.pawn_direction()));
        if target.is_none() {
            return Err(SnapshotError::InvalidEnPassant(pawn_sq));
        }
        board.set_en_passant(target);
    }

    if let Some(next) = snapshot.next_piece_id {
        board.reserve_ids(next);
    }
    board.set_castling_rights(rights);
    board.revoke_stale_castling();
    Ok(board)
}
