//! Board representation.
//!
//! A [`Board`] is a plain value: an arena of 64 optional [`Piece`]s plus the
//! castling rights and en passant target that belong to the placement.
//! Move validation clones the board, mutates the clone and only hands it
//! back on success, so a rejected move can never leave a partial mutation
//! behind.

use chess_core::{CastlingSide, Color, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a piece for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl PieceId {
    /// Largest representable id. The allocator stops here, so it is never
    /// accepted from outside.
    pub const MAX: PieceId = PieceId(u32::MAX);
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A piece standing on the board.
///
/// The square is not stored on the piece: the board slot holding it is its
/// position, so a piece cannot be aliased from two squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub id: PieceId,
    pub has_moved: bool,
    /// Set on a pawn for the single ply after its two-square advance.
    pub en_passant_vulnerable: bool,
}

impl Piece {
    /// Creates an unmoved piece.
    pub const fn new(kind: PieceKind, color: Color, id: PieceId) -> Self {
        Piece {
            kind,
            color,
            id,
            has_moved: false,
            en_passant_vulnerable: false,
        }
    }

    /// Returns the letter for this piece (uppercase for white).
    pub const fn to_char(&self) -> char {
        self.kind.to_char(self.color)
    }
}

/// Castling rights, per color and side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights([[bool; 2]; 2]);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights([[false; 2]; 2]);
    pub const ALL: CastlingRights = CastlingRights([[true; 2]; 2]);

    const fn side_index(side: CastlingSide) -> usize {
        match side {
            CastlingSide::Kingside => 0,
            CastlingSide::Queenside => 1,
        }
    }

    /// Returns true if `color` may still castle toward `side`.
    #[inline]
    pub const fn has(self, color: Color, side: CastlingSide) -> bool {
        self.0[color.index()][Self::side_index(side)]
    }

    /// Grants or revokes a single right.
    #[inline]
    pub fn set(&mut self, color: Color, side: CastlingSide, allowed: bool) {
        self.0[color.index()][Self::side_index(side)] = allowed;
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0[color.index()] = [false; 2];
    }

    /// Returns true if no right is left for either color.
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for color in Color::ALL {
            for side in CastlingSide::ALL {
                if self.has(color, side) {
                    let c = match side {
                        CastlingSide::Kingside => 'k',
                        CastlingSide::Queenside => 'q',
                    };
                    let c = match color {
                        Color::White => c.to_ascii_uppercase(),
                        Color::Black => c,
                    };
                    write!(f, "{}", c)?;
                }
            }
        }
        Ok(())
    }
}

/// The piece placement of a game plus the state tied to it.
#[derive(Debug, Clone)]
pub struct Board {
    squares: [Option<Piece>; 64],
    castling: CastlingRights,
    en_passant: Option<Square>,
    /// Next id handed out by [`Board::allocate_id`]; never decreases.
    next_id: u32,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.squares == other.squares
            && self.castling == other.castling
            && self.en_passant == other.en_passant
    }
}

impl Eq for Board {}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Back rank of the standard starting position.
    pub const STANDARD_BACK_RANK: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// Creates an empty board with no castling rights.
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
            castling: CastlingRights::NONE,
            en_passant: None,
            next_id: 0,
        }
    }

    /// Creates the standard starting position.
    pub fn standard() -> Self {
        Self::with_back_rank(&Self::STANDARD_BACK_RANK)
    }

    /// Creates a starting position from a white back rank, mirrored for black,
    /// with full pawn rows and every castling right that the layout supports.
    pub fn with_back_rank(back_rank: &[PieceKind; 8]) -> Self {
        let mut board = Board::empty();
        for color in Color::ALL {
            let back = color.back_rank();
            let pawns = (back as i8 + color.pawn_direction()) as u8;
            for (file, &kind) in back_rank.iter().enumerate() {
                if let Some(sq) = Square::from_coords(file as u8, back) {
                    board.spawn(sq, kind, color);
                }
            }
            for file in 0..8 {
                if let Some(sq) = Square::from_coords(file, pawns) {
                    board.spawn(sq, PieceKind::Pawn, color);
                }
            }
        }
        board.castling = CastlingRights::ALL;
        board.revoke_stale_castling();
        board
    }

    /// Returns the piece on the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index() as usize].as_ref()
    }

    /// Returns a mutable reference to the piece on the given square.
    #[inline]
    pub fn piece_at_mut(&mut self, sq: Square) -> Option<&mut Piece> {
        self.squares[sq.index() as usize].as_mut()
    }

    /// Puts a piece on a square, returning whatever stood there.
    #[inline]
    pub fn place(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        self.next_id = self.next_id.max(piece.id.0.saturating_add(1));
        self.squares[sq.index() as usize].replace(piece)
    }

    /// Takes the piece off a square.
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index() as usize].take()
    }

    /// Hands out a fresh piece id. Ids are never reused, including ids of
    /// pieces that have since left the board.
    pub fn allocate_id(&mut self) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// The id the next [`Board::allocate_id`] call will return.
    pub fn next_piece_id(&self) -> PieceId {
        PieceId(self.next_id)
    }

    /// Moves the allocator forward to at least `next`. Never moves it back.
    pub fn reserve_ids(&mut self, next: PieceId) {
        self.next_id = self.next_id.max(next.0);
    }

    /// Creates an unmoved piece with a fresh id and places it.
    pub fn spawn(&mut self, sq: Square, kind: PieceKind, color: Color) -> PieceId {
        let id = self.allocate_id();
        self.place(sq, Piece::new(kind, color, id));
        id
    }

    /// Iterates over all occupied squares from a1 to h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Iterates over the pieces of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    /// Number of pieces of the given color.
    pub fn count(&self, color: Color) -> usize {
        self.pieces_of(color).count()
    }

    /// Returns the square of the given color's king.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Returns the castling rights.
    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// Replaces the castling rights.
    #[inline]
    pub fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.castling = rights;
    }

    /// Returns the en passant target square.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Sets the en passant target square.
    #[inline]
    pub fn set_en_passant(&mut self, sq: Option<Square>) {
        self.en_passant = sq;
    }

    /// Clears the en passant target and every pawn's vulnerability flag.
    pub fn clear_en_passant(&mut self) {
        self.en_passant = None;
        for piece in self.squares.iter_mut().flatten() {
            piece.en_passant_vulnerable = false;
        }
    }

    /// Finds the unmoved rook `color` would castle with toward `side`:
    /// the nearest one on the back rank beyond the unmoved king.
    pub fn castling_rook(&self, color: Color, side: CastlingSide) -> Option<Square> {
        let king_sq = self.king_square(color)?;
        let king = self.piece_at(king_sq)?;
        if king.has_moved || king_sq.rank().index() != color.back_rank() {
            return None;
        }
        let step = match side {
            CastlingSide::Kingside => 1,
            CastlingSide::Queenside => -1,
        };
        let mut sq = king_sq.offset(step, 0);
        while let Some(current) = sq {
            if let Some(p) = self.piece_at(current) {
                if p.color == color && p.kind == PieceKind::Rook && !p.has_moved {
                    return Some(current);
                }
            }
            sq = current.offset(step, 0);
        }
        None
    }

    /// Drops every castling right whose king or rook has moved or is gone.
    pub fn revoke_stale_castling(&mut self) {
        for color in Color::ALL {
            for side in CastlingSide::ALL {
                if self.castling.has(color, side) && self.castling_rook(color, side).is_none() {
                    self.castling.set(color, side, false);
                }
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let c = Square::from_coords(file, rank)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', Piece::to_char);
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "castling: {}", self.castling)?;
        if let Some(ep) = self.en_passant {
            write!(f, " en passant: {}", ep)?;
        }
        Ok(())
    }
}
