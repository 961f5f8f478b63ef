//! Board coordinates: files, ranks and the 64 squares.
//!
//! Squares are addressed a1 = 0 through h8 = 63, rank-major. Move
//! generation walks the board with [`Square::offset`], which refuses to
//! wrap around an edge.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// Declares one board axis: an eight-valued enum with its index and
/// character conversions.
macro_rules! board_axis {
    ($(#[$doc:meta])* $name:ident, $first_char:literal, [$($variant:ident),+]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: [$name; 8] = [$($name::$variant),+];

            pub const fn from_index(index: u8) -> Option<Self> {
                if index < 8 {
                    Some(Self::ALL[index as usize])
                } else {
                    None
                }
            }

            /// Accepts upper case as well. Anything outside the eight
            /// ASCII characters of the axis is rejected.
            pub const fn from_char(c: char) -> Option<Self> {
                let c = c.to_ascii_lowercase();
                if !c.is_ascii() || c < $first_char {
                    return None;
                }
                let offset = c as u32 - $first_char as u32;
                if offset >= 8 {
                    return None;
                }
                Some(Self::ALL[offset as usize])
            }

            pub const fn index(self) -> u8 {
                self as u8
            }

            pub const fn to_char(self) -> char {
                ($first_char as u8 + self as u8) as char
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_char())
            }
        }
    };
}

board_axis!(
    /// Board column, a through h.
    File, 'a', [A, B, C, D, E, F, G, H]
);

board_axis!(
    /// Board row, 1 through 8.
    Rank, '1', [R1, R2, R3, R4, R5, R6, R7, R8]
);

/// One of the 64 board squares. Serializes as its algebraic name ("e4").
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

macro_rules! named_squares {
    ($($name:ident = $index:literal),+ $(,)?) => {
        impl Square {
            $(pub const $name: Square = Square($index);)+
        }
    };
}

named_squares! {
    A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
    A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
}

impl Square {
    pub const fn new(file: File, rank: Rank) -> Self {
        Square(rank as u8 * 8 + file as u8)
    }

    /// Zero-based file and rank, `None` off the board.
    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        match (File::from_index(file), Rank::from_index(rank)) {
            (Some(file), Some(rank)) => Some(Square::new(file, rank)),
            _ => None,
        }
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses a two-character name such as "e4" or "E4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = File::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        match chars.next() {
            None => Some(Square::new(file, rank)),
            Some(_) => None,
        }
    }

    /// a1, b1, ..., h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn file(self) -> File {
        File::ALL[(self.0 & 7) as usize]
    }

    pub const fn rank(self) -> Rank {
        Rank::ALL[(self.0 >> 3) as usize]
    }

    /// The square `file_delta` files and `rank_delta` ranks away, if it
    /// is still on the board.
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = (self.0 & 7) as i8 + file_delta;
        let rank = (self.0 >> 3) as i8 + rank_delta;
        if file < 0 || rank < 0 {
            return None;
        }
        Square::from_coords(file as u8, rank as u8)
    }

    /// h1 is light, a1 is dark.
    pub const fn is_light(self) -> bool {
        ((self.0 & 7) + (self.0 >> 3)) & 1 == 1
    }

    pub fn to_algebraic(self) -> String {
        let mut name = String::with_capacity(2);
        name.push(self.file().to_char());
        name.push(self.rank().to_char());
        name
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({}{})", self.file(), self.rank())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| ParseError::InvalidSquare(s.to_string()))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
