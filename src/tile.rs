use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct tile kinds.
pub const TILE_KINDS: usize = 34;

/// Slot offsets of the four tile groups inside the 0..34 kind space.
pub const MANZU_OFFSET: usize = 0;
pub const PINZU_OFFSET: usize = 9;
pub const SOUZU_OFFSET: usize = 18;
pub const HONOR_OFFSET: usize = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Man, // Manzu
    Pin, // Pinzu
    Sou, // Souzu
}

impl Suit {
    /// Kind-space offset of this suit's slot 0.
    pub fn offset(&self) -> usize {
        match self {
            Suit::Man => MANZU_OFFSET,
            Suit::Pin => PINZU_OFFSET,
            Suit::Sou => SOUZU_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Honor {
    // Winds
    East,
    South,
    West,
    North,
    // Dragons
    White,
    Green,
    Red,
}

/// One of the 34 canonical tile kinds.
///
/// Red fives alias their black counterpart here; they are tracked as a
/// separate count on the hand for scoring consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tile {
    Suited { suit: Suit, value: u8 }, // value is 1..9
    Honor(Honor),
}

impl Tile {
    /// Create a suited tile (e.g., 5-man)
    pub fn suited(suit: Suit, value: u8) -> Self {
        Tile::Suited { suit, value }
    }

    /// Create an honor tile
    pub fn honor(honor: Honor) -> Self {
        Tile::Honor(honor)
    }

    /// Canonical kind index: manzu 0..8, pinzu 9..17, souzu 18..26,
    /// winds 27..30, dragons 31..33.
    pub fn index(&self) -> usize {
        match self {
            Tile::Suited { suit, value } => suit.offset() + (*value as usize - 1),
            Tile::Honor(honor) => {
                HONOR_OFFSET
                    + match honor {
                        Honor::East => 0,
                        Honor::South => 1,
                        Honor::West => 2,
                        Honor::North => 3,
                        Honor::White => 4,
                        Honor::Green => 5,
                        Honor::Red => 6,
                    }
            }
        }
    }

    /// Inverse of [`Tile::index`]. Returns `None` outside 0..34.
    pub fn from_index(index: usize) -> Option<Tile> {
        if index < HONOR_OFFSET {
            let suit = match index / 9 {
                0 => Suit::Man,
                1 => Suit::Pin,
                _ => Suit::Sou,
            };
            Some(Tile::suited(suit, (index % 9) as u8 + 1))
        } else if index < TILE_KINDS {
            let honor = match index - HONOR_OFFSET {
                0 => Honor::East,
                1 => Honor::South,
                2 => Honor::West,
                3 => Honor::North,
                4 => Honor::White,
                5 => Honor::Green,
                _ => Honor::Red,
            };
            Some(Tile::honor(honor))
        } else {
            None
        }
    }

    /// Is this a simple tile (2-8 of any suit)?
    pub fn is_simple(&self) -> bool {
        match self {
            Tile::Suited { value, .. } => *value >= 2 && *value <= 8,
            Tile::Honor(_) => false,
        }
    }

    /// Is this a terminal (1 or 9) or honor?
    pub fn is_terminal_or_honor(&self) -> bool {
        match self {
            Tile::Suited { value, .. } => *value == 1 || *value == 9,
            Tile::Honor(_) => true,
        }
    }

    /// Is this an honor tile?
    pub fn is_honor(&self) -> bool {
        matches!(self, Tile::Honor(_))
    }

    /// Is this a five of some suit (candidate for a red five)?
    pub fn is_five(&self) -> bool {
        matches!(self, Tile::Suited { value: 5, .. })
    }

    /// Get the suit if this is a suited tile
    pub fn suit(&self) -> Option<Suit> {
        match self {
            Tile::Suited { suit, .. } => Some(*suit),
            Tile::Honor(_) => None,
        }
    }

    /// Get the value if this is a suited tile
    pub fn value(&self) -> Option<u8> {
        match self {
            Tile::Suited { value, .. } => Some(*value),
            Tile::Honor(_) => None,
        }
    }
}

/// Kind indices of the red fives' black counterparts (5m, 5p, 5s).
pub const RED_FIVE_ALIASES: [usize; 3] = [4, 13, 22];

/// All 13 terminal and honor tiles (the kokushi kinds)
pub const KOKUSHI_TILES: [Tile; 13] = [
    Tile::Suited { suit: Suit::Man, value: 1 },
    Tile::Suited { suit: Suit::Man, value: 9 },
    Tile::Suited { suit: Suit::Pin, value: 1 },
    Tile::Suited { suit: Suit::Pin, value: 9 },
    Tile::Suited { suit: Suit::Sou, value: 1 },
    Tile::Suited { suit: Suit::Sou, value: 9 },
    Tile::Honor(Honor::East),
    Tile::Honor(Honor::South),
    Tile::Honor(Honor::West),
    Tile::Honor(Honor::North),
    Tile::Honor(Honor::White),
    Tile::Honor(Honor::Green),
    Tile::Honor(Honor::Red),
];

impl TryFrom<&str> for Tile {
    type Error = String;

    /// Parse a single tile in MPS notation: "5m", "3z", ...
    fn try_from(input: &str) -> Result<Self, Self::Error> {
        let chars: Vec<char> = input.chars().collect();
        if chars.len() != 2 {
            return Err(format!("invalid tile format: {}", input));
        }

        let val = chars[0]
            .to_digit(10)
            .ok_or_else(|| format!("invalid tile digit: {}", chars[0]))? as u8;

        match chars[1] {
            'm' | 'p' | 's' => {
                let suit = match chars[1] {
                    'm' => Suit::Man,
                    'p' => Suit::Pin,
                    _ => Suit::Sou,
                };
                // '0' is the red five
                let val = if val == 0 { 5 } else { val };
                if !(1..=9).contains(&val) {
                    return Err("suited tiles must be 1-9".to_string());
                }
                Ok(Tile::suited(suit, val))
            }
            'z' => {
                let honor = match val {
                    1 => Honor::East,
                    2 => Honor::South,
                    3 => Honor::West,
                    4 => Honor::North,
                    5 => Honor::White,
                    6 => Honor::Green,
                    7 => Honor::Red,
                    _ => return Err(format!("honor number out of range: {}", val)),
                };
                Ok(Tile::Honor(honor))
            }
            c => Err(format!("unknown suit: {}", c)),
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tile::Suited { suit, value } => {
                let s = match suit {
                    Suit::Man => 'm',
                    Suit::Pin => 'p',
                    Suit::Sou => 's',
                };
                write!(f, "{}{}", value, s)
            }
            Tile::Honor(h) => {
                let v = match h {
                    Honor::East => 1,
                    Honor::South => 2,
                    Honor::West => 3,
                    Honor::North => 4,
                    Honor::White => 5,
                    Honor::Green => 6,
                    Honor::Red => 7,
                };
                write!(f, "{}z", v)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        for idx in 0..TILE_KINDS {
            let tile = Tile::from_index(idx).unwrap();
            assert_eq!(tile.index(), idx, "index {} did not roundtrip", idx);
        }
        assert_eq!(Tile::from_index(TILE_KINDS), None);
    }

    #[test]
    fn specific_indices() {
        assert_eq!(Tile::suited(Suit::Man, 1).index(), 0);
        assert_eq!(Tile::suited(Suit::Man, 9).index(), 8);
        assert_eq!(Tile::suited(Suit::Pin, 1).index(), 9);
        assert_eq!(Tile::suited(Suit::Sou, 1).index(), 18);
        assert_eq!(Tile::honor(Honor::East).index(), 27);
        assert_eq!(Tile::honor(Honor::Red).index(), 33);
    }

    #[test]
    fn tile_properties() {
        assert!(Tile::suited(Suit::Pin, 5).is_simple());
        assert!(!Tile::suited(Suit::Pin, 1).is_simple());
        assert!(!Tile::honor(Honor::East).is_simple());

        assert!(Tile::suited(Suit::Sou, 1).is_terminal_or_honor());
        assert!(Tile::honor(Honor::White).is_terminal_or_honor());
        assert!(!Tile::suited(Suit::Man, 5).is_terminal_or_honor());
    }

    #[test]
    fn kokushi_tiles_are_the_orphan_kinds() {
        assert!(KOKUSHI_TILES.iter().all(|t| t.is_terminal_or_honor()));
        let indices: Vec<usize> = KOKUSHI_TILES.iter().map(|t| t.index()).collect();
        assert_eq!(indices, vec![0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33]);
    }

    #[test]
    fn parse_single_tiles() {
        assert_eq!(Tile::try_from("5m").unwrap(), Tile::suited(Suit::Man, 5));
        assert_eq!(Tile::try_from("0p").unwrap(), Tile::suited(Suit::Pin, 5));
        assert_eq!(Tile::try_from("7z").unwrap(), Tile::honor(Honor::Red));
        assert!(Tile::try_from("8z").is_err());
        assert!(Tile::try_from("5x").is_err());
    }

    #[test]
    fn display_roundtrip() {
        for idx in 0..TILE_KINDS {
            let tile = Tile::from_index(idx).unwrap();
            let s = tile.to_string();
            assert_eq!(Tile::try_from(s.as_str()).unwrap(), tile);
        }
    }
}
