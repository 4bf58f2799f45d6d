//! Hand-string parsing.
//!
//! Notation:
//! - Regular tiles: `123m456p789s1122z`
//! - Red fives: `0m`, `0p`, `0s` (counted as fives, tracked separately)
//! - Closed kan (ankan): `[1111m]`
//! - Open melds: `(111m)` pon, `(123m)` chi, `(1111m)` open kan

use thiserror::Error;

use crate::error::HandError;
use crate::hand::{Hand, Meld, MeldKind};
use crate::tile::{Honor, Suit, Tile};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("digits without a trailing suit letter")]
    DanglingDigits,
    #[error("unclosed meld group")]
    UnclosedGroup,
    #[error("honor number out of range: {0}")]
    BadHonor(u8),
    #[error("red fives cannot be honors")]
    RedHonor,
    #[error("meld group {0:?} is not a pon, chi or kan")]
    BadMeld(String),
}

/// Result of parsing a hand string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHand {
    /// Concealed tiles (meld tiles are not repeated here)
    pub tiles: Vec<Tile>,
    pub melds: Vec<Meld>,
    /// Number of red fives seen, melds included
    pub red_fives: u8,
}

impl ParsedHand {
    /// Validate and convert into a [`Hand`].
    pub fn into_hand(self) -> Result<Hand, HandError> {
        Ok(Hand::from_tiles(&self.tiles, self.melds)?.with_red_fives(self.red_fives))
    }
}

/// Parse a hand in MPS notation, meld groups included.
pub fn parse_hand(input: &str) -> Result<ParsedHand, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tiles = Vec::new();
    let mut melds = Vec::new();
    let mut red_fives = 0u8;
    // Digits waiting for their suit letter, with a red-five flag each
    let mut pending: Vec<(u8, bool)> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '(' | '[' => {
                if !pending.is_empty() {
                    return Err(ParseError::DanglingDigits);
                }
                let closed = chars[i] == '[';
                let close = if closed { ']' } else { ')' };
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&c| c == close)
                    .map(|p| start + p)
                    .ok_or(ParseError::UnclosedGroup)?;
                let group: String = chars[start..end].iter().collect();
                let (meld, reds) = parse_meld(&group, closed)?;
                melds.push(meld);
                red_fives += reds;
                i = end + 1;
                continue;
            }
            ')' | ']' => return Err(ParseError::UnexpectedChar(chars[i])),
            '1'..='9' => pending.push((chars[i] as u8 - b'0', false)),
            '0' => pending.push((5, true)),
            'm' | 'p' | 's' | 'z' => {
                flush_group(chars[i], &mut pending, &mut tiles, &mut red_fives)?;
            }
            c if c.is_whitespace() => {}
            c => return Err(ParseError::UnexpectedChar(c)),
        }
        i += 1;
    }

    if !pending.is_empty() {
        return Err(ParseError::DanglingDigits);
    }

    Ok(ParsedHand { tiles, melds, red_fives })
}

/// Parse a hand string and build the hand in one step.
pub fn parse_into_hand(input: &str) -> Result<Hand, String> {
    let parsed = parse_hand(input).map_err(|e| e.to_string())?;
    parsed.into_hand().map_err(|e| e.to_string())
}

fn flush_group(
    suit_char: char,
    pending: &mut Vec<(u8, bool)>,
    tiles: &mut Vec<Tile>,
    red_fives: &mut u8,
) -> Result<(), ParseError> {
    for &(value, red) in pending.iter() {
        let tile = match suit_char {
            'm' => Tile::suited(Suit::Man, value),
            'p' => Tile::suited(Suit::Pin, value),
            's' => Tile::suited(Suit::Sou, value),
            _ => {
                if red {
                    return Err(ParseError::RedHonor);
                }
                Tile::honor(honor_from_digit(value)?)
            }
        };
        if red {
            *red_fives += 1;
        }
        tiles.push(tile);
    }
    pending.clear();
    Ok(())
}

fn honor_from_digit(value: u8) -> Result<Honor, ParseError> {
    Ok(match value {
        1 => Honor::East,
        2 => Honor::South,
        3 => Honor::West,
        4 => Honor::North,
        5 => Honor::White,
        6 => Honor::Green,
        7 => Honor::Red,
        v => return Err(ParseError::BadHonor(v)),
    })
}

/// Parse the contents of one bracket group into a meld.
fn parse_meld(group: &str, closed: bool) -> Result<(Meld, u8), ParseError> {
    let mut tiles = Vec::new();
    let mut red_fives = 0u8;
    let mut pending: Vec<(u8, bool)> = Vec::new();

    for c in group.chars() {
        match c {
            '1'..='9' => pending.push((c as u8 - b'0', false)),
            '0' => pending.push((5, true)),
            'm' | 'p' | 's' | 'z' => flush_group(c, &mut pending, &mut tiles, &mut red_fives)?,
            c => return Err(ParseError::UnexpectedChar(c)),
        }
    }
    if !pending.is_empty() {
        return Err(ParseError::DanglingDigits);
    }

    let identical = tiles.windows(2).all(|w| w[0] == w[1]);
    let meld = match (tiles.len(), identical, closed) {
        (4, true, true) => Meld::ankan(tiles[0]),
        (4, true, false) => Meld::minkan(tiles[0], 3),
        (3, true, false) => Meld::pon(tiles[0], 3),
        (3, false, false) => {
            let mut sorted = tiles.clone();
            sorted.sort();
            let consecutive = sorted[0].suit().is_some()
                && sorted[0].suit() == sorted[2].suit()
                && sorted[1].index() == sorted[0].index() + 1
                && sorted[2].index() == sorted[1].index() + 1;
            if !consecutive {
                return Err(ParseError::BadMeld(group.to_string()));
            }
            Meld::chi(sorted[0])
        }
        _ => return Err(ParseError::BadMeld(group.to_string())),
    };

    Ok((meld, red_fives))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_hand() {
        let parsed = parse_hand("123m456p789s11z").unwrap();
        assert_eq!(parsed.tiles.len(), 11);
        assert_eq!(parsed.tiles[0], Tile::suited(Suit::Man, 1));
        assert_eq!(parsed.tiles[9], Tile::honor(Honor::East));
        assert!(parsed.melds.is_empty());
    }

    #[test]
    fn parse_invalid_honor() {
        assert_eq!(parse_hand("89z"), Err(ParseError::BadHonor(8)));
    }

    #[test]
    fn parse_trailing_numbers() {
        assert_eq!(parse_hand("123"), Err(ParseError::DanglingDigits));
    }

    #[test]
    fn parse_whitespace_allowed() {
        let parsed = parse_hand("123m 456p 789s 11z").unwrap();
        assert_eq!(parsed.tiles.len(), 11);
    }

    // ===== Red Five Tests =====

    #[test]
    fn parse_red_five() {
        let parsed = parse_hand("0m").unwrap();
        assert_eq!(parsed.tiles, vec![Tile::suited(Suit::Man, 5)]);
        assert_eq!(parsed.red_fives, 1);
    }

    #[test]
    fn parse_mixed_red_and_regular_fives() {
        let parsed = parse_hand("50m").unwrap();
        assert_eq!(parsed.tiles.len(), 2);
        assert!(parsed.tiles.iter().all(|&t| t == Tile::suited(Suit::Man, 5)));
        assert_eq!(parsed.red_fives, 1);
    }

    #[test]
    fn parse_red_honor_fails() {
        assert_eq!(parse_hand("0z"), Err(ParseError::RedHonor));
    }

    // ===== Meld Group Tests =====

    #[test]
    fn parse_closed_kan() {
        let parsed = parse_hand("[1111m]").unwrap();
        assert!(parsed.tiles.is_empty());
        assert_eq!(parsed.melds.len(), 1);
        assert_eq!(parsed.melds[0].kind, MeldKind::Ankan);
        assert!(!parsed.melds[0].is_open());
    }

    #[test]
    fn parse_open_kan() {
        let parsed = parse_hand("(5555z)").unwrap();
        assert_eq!(parsed.melds[0].kind, MeldKind::Minkan);
        assert_eq!(parsed.melds[0].tiles[0], Tile::honor(Honor::White));
    }

    #[test]
    fn parse_open_pon_and_chi() {
        let parsed = parse_hand("(111m)(342p)").unwrap();
        assert_eq!(parsed.melds.len(), 2);
        assert_eq!(parsed.melds[0].kind, MeldKind::Pon);
        assert_eq!(parsed.melds[1].kind, MeldKind::Chi);
        assert_eq!(parsed.melds[1].min_tile(), Tile::suited(Suit::Pin, 2));
    }

    #[test]
    fn parse_kan_with_red_five() {
        let parsed = parse_hand("[0555m]").unwrap();
        assert_eq!(parsed.red_fives, 1);
        assert_eq!(parsed.melds[0].kind, MeldKind::Ankan);
    }

    #[test]
    fn invalid_meld_groups() {
        assert!(matches!(parse_hand("(1234m)"), Err(ParseError::BadMeld(_))));
        assert!(matches!(parse_hand("(124m)"), Err(ParseError::BadMeld(_))));
        assert!(matches!(parse_hand("[111m]"), Err(ParseError::BadMeld(_))));
        assert!(matches!(parse_hand("(135z)"), Err(ParseError::BadMeld(_))));
        assert_eq!(parse_hand("(111m"), Err(ParseError::UnclosedGroup));
    }

    #[test]
    fn parse_hand_with_melds_into_hand() {
        let parsed = parse_hand("23678p234567s(222z)").unwrap();
        assert_eq!(parsed.tiles.len(), 11);
        assert_eq!(parsed.melds.len(), 1);
        let hand = parsed.into_hand().unwrap();
        assert_eq!(hand.concealed_total(), 11);
        assert_eq!(hand.melds().len(), 1);
    }

    #[test]
    fn into_hand_rejects_five_copies() {
        let parsed = parse_hand("11111m456p789s11z").unwrap();
        assert!(matches!(
            parsed.into_hand(),
            Err(HandError::TooManyCopies { kind: 0, .. })
        ));
    }
}
