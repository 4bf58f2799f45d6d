//! Display utilities for pretty-printing tiles and hands.

use crate::hand::Hand;
use crate::tile::{Honor, Suit, Tile};

/// Unicode mahjong character for a tile, with a trailing space for
/// better terminal rendering.
pub fn tile_to_unicode(tile: &Tile) -> String {
    match tile {
        Tile::Suited { suit, value } => {
            let base = match suit {
                Suit::Man => 0x1F007, // 🀇 = 1-man
                Suit::Pin => 0x1F019, // 🀙 = 1-pin
                Suit::Sou => 0x1F010, // 🀐 = 1-sou
            };
            let c = char::from_u32(base + (*value as u32) - 1).unwrap_or('?');
            format!("{c} ")
        }
        Tile::Honor(honor) => {
            let s = match honor {
                Honor::East => "🀀 ",
                Honor::South => "🀁 ",
                Honor::West => "🀂 ",
                Honor::North => "🀃 ",
                Honor::White => "🀆 ",
                Honor::Green => "🀅 ",
                Honor::Red => "🀄︎ ", // Includes variation selector + space
            };
            s.to_string()
        }
    }
}

/// Format a slice of tiles as Unicode characters
pub fn tiles_to_unicode(tiles: &[Tile]) -> String {
    tiles.iter().map(tile_to_unicode).collect()
}

/// Format a slice of tiles in MPS notation, grouped per suit
/// (e.g. `147m25p3z`).
pub fn tiles_to_mps(tiles: &[Tile]) -> String {
    let mut out = String::new();
    let mut pending = String::new();
    let mut current: Option<char> = None;

    for tile in tiles {
        let (group, digit) = match tile {
            Tile::Suited { suit, value } => {
                let c = match suit {
                    Suit::Man => 'm',
                    Suit::Pin => 'p',
                    Suit::Sou => 's',
                };
                (c, *value)
            }
            Tile::Honor(_) => ('z', (tile.index() - 26) as u8),
        };
        if current != Some(group) {
            if let Some(c) = current {
                out.push_str(&pending);
                out.push(c);
                pending.clear();
            }
            current = Some(group);
        }
        pending.push((b'0' + digit) as char);
    }
    if let Some(c) = current {
        out.push_str(&pending);
        out.push(c);
    }
    out
}

/// Render a hand's concealed tiles back to MPS notation.
pub fn hand_to_mps(hand: &Hand) -> String {
    let mut tiles = Vec::new();
    for (kind, &count) in hand.counts().iter().enumerate() {
        let tile = Tile::from_index(kind).expect("kind index in range");
        for _ in 0..count {
            tiles.push(tile);
        }
    }
    let mut out = tiles_to_mps(&tiles);
    for meld in hand.melds() {
        let open = meld.is_open();
        out.push(if open { '(' } else { '[' });
        out.push_str(&tiles_to_mps(&meld.tiles));
        out.push(if open { ')' } else { ']' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_hand;
    use crate::tile::TILE_KINDS;

    #[test]
    fn mps_groups_by_suit() {
        let tiles: Vec<Tile> = [0usize, 3, 8, 9, 13, 27, 33]
            .iter()
            .map(|&i| Tile::from_index(i).unwrap())
            .collect();
        assert_eq!(tiles_to_mps(&tiles), "149m15p17z");
    }

    #[test]
    fn hand_mps_roundtrip() {
        for input in ["123m456p789s11122z", "1112345678999m1p", "234m88p555666s(111z)"] {
            let hand = parse_hand(input).unwrap().into_hand().unwrap();
            let rendered = hand_to_mps(&hand);
            let back = parse_hand(&rendered).unwrap().into_hand().unwrap();
            assert_eq!(back.counts(), hand.counts());
            assert_eq!(back.melds().len(), hand.melds().len());
        }
    }

    #[test]
    fn unicode_covers_every_kind() {
        for kind in 0..TILE_KINDS {
            let tile = Tile::from_index(kind).unwrap();
            assert!(!tile_to_unicode(&tile).starts_with('?'));
        }
    }
}
