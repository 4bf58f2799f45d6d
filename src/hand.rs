//! Hand representation.
//!
//! A hand is a 34-slot count vector plus an ordered list of called melds.
//! Alongside the counts the hand maintains a bit-packed view of each tile
//! group (three bits per slot: 27 bits per numbered suit, 21 for honors),
//! used as the key space for the precomputed tables. The two views are
//! kept in lock-step; every mutation updates both.

use serde::{Deserialize, Serialize};

use crate::error::HandError;
use crate::tile::{HONOR_OFFSET, Suit, TILE_KINDS, Tile};

/// Kind of a called block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    /// Open triplet called from a discard
    Pon,
    /// Open sequence called from the player to the left
    Chi,
    /// Closed quad, concealed for scoring purposes
    Ankan,
    /// Open quad called from a discard
    Minkan,
    /// Quad formed by adding the fourth tile to an existing pon
    Kakan,
}

impl MeldKind {
    /// Whether this kind exposes the block for scoring
    pub fn is_open(&self) -> bool {
        !matches!(self, MeldKind::Ankan)
    }

    /// Whether this kind is a quad
    pub fn is_kan(&self) -> bool {
        matches!(self, MeldKind::Ankan | MeldKind::Minkan | MeldKind::Kakan)
    }
}

/// A called block, fixed for the rest of the deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    /// Constituent tiles in the order they were laid out
    pub tiles: Vec<Tile>,
    /// Index into `tiles` of the claimed tile (0 for an ankan)
    pub called: usize,
    /// Relative seat the tile came from: 1 = right, 2 = across, 3 = left,
    /// 0 for an ankan
    pub from: u8,
}

impl Meld {
    pub fn new(kind: MeldKind, tiles: Vec<Tile>, called: usize, from: u8) -> Self {
        Meld { kind, tiles, called, from }
    }

    /// An open triplet of `tile`
    pub fn pon(tile: Tile, from: u8) -> Self {
        Meld::new(MeldKind::Pon, vec![tile; 3], 0, from)
    }

    /// An open sequence starting at `first` (always called from the left)
    pub fn chi(first: Tile) -> Self {
        let tiles = match first {
            Tile::Suited { suit, value } if value <= 7 => vec![
                first,
                Tile::suited(suit, value + 1),
                Tile::suited(suit, value + 2),
            ],
            // Not a run start; hand validation rejects the meld
            _ => vec![first; 3],
        };
        Meld::new(MeldKind::Chi, tiles, 0, 3)
    }

    /// A closed quad of `tile`
    pub fn ankan(tile: Tile) -> Self {
        Meld::new(MeldKind::Ankan, vec![tile; 4], 0, 0)
    }

    /// An open quad of `tile`
    pub fn minkan(tile: Tile, from: u8) -> Self {
        Meld::new(MeldKind::Minkan, vec![tile; 4], 0, from)
    }

    /// Smallest constituent tile (the representative for block matching)
    pub fn min_tile(&self) -> Tile {
        *self.tiles.iter().min().expect("meld has tiles")
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_open()
    }

    /// Basic shape check: a pon/kan holds identical tiles, a chi holds
    /// three consecutive tiles of one suit.
    fn validate(&self) -> Result<(), HandError> {
        let ok = match self.kind {
            MeldKind::Pon => {
                self.tiles.len() == 3 && self.tiles.iter().all(|t| *t == self.tiles[0])
            }
            MeldKind::Ankan | MeldKind::Minkan | MeldKind::Kakan => {
                self.tiles.len() == 4 && self.tiles.iter().all(|t| *t == self.tiles[0])
            }
            MeldKind::Chi => {
                let mut idx: Vec<usize> = self.tiles.iter().map(|t| t.index()).collect();
                idx.sort_unstable();
                self.tiles.len() == 3
                    && self.tiles.iter().all(|t| !t.is_honor())
                    && self.tiles[0].suit() == self.tiles[1].suit()
                    && self.tiles[1].suit() == self.tiles[2].suit()
                    && idx[1] == idx[0] + 1
                    && idx[2] == idx[1] + 1
            }
        };
        if ok { Ok(()) } else { Err(HandError::MalformedMeld) }
    }
}

/// A concealed hand plus its called melds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    counts: [u8; TILE_KINDS],
    // Bit-packed mirrors of `counts`, three bits per slot
    manzu: u32,
    pinzu: u32,
    souzu: u32,
    honors: u32,
    melds: Vec<Meld>,
    red_fives: u8,
}

impl Hand {
    /// Build a hand from concealed tile counts and called melds.
    ///
    /// Enforces the hand invariants: per kind at most four copies counting
    /// meld tiles, at most four melds, and an effective total (each meld
    /// counting as three) within 1..=14.
    pub fn from_counts(counts: [u8; TILE_KINDS], melds: Vec<Meld>) -> Result<Self, HandError> {
        if melds.len() > 4 {
            return Err(HandError::TooManyMelds { melds: melds.len() });
        }
        for meld in &melds {
            meld.validate()?;
        }

        // Per-kind cap includes the tiles locked up in melds.
        let mut all = counts;
        for meld in &melds {
            for tile in &meld.tiles {
                all[tile.index()] = all[tile.index()].saturating_add(1);
            }
        }
        for (kind, &count) in all.iter().enumerate() {
            if count > 4 {
                return Err(HandError::TooManyCopies { kind: kind as u8, count });
            }
        }

        // A kan spends four tiles but still stands for one set of three.
        let total = counts.iter().sum::<u8>() + 3 * melds.len() as u8;
        if total == 0 || total > 14 {
            return Err(HandError::BadTileCount { total });
        }

        let mut hand = Hand {
            counts,
            manzu: 0,
            pinzu: 0,
            souzu: 0,
            honors: 0,
            melds,
            red_fives: 0,
        };
        hand.rebuild_packed();
        Ok(hand)
    }

    /// Build a hand from a list of concealed tiles and called melds.
    pub fn from_tiles(tiles: &[Tile], melds: Vec<Meld>) -> Result<Self, HandError> {
        let mut counts = [0u8; TILE_KINDS];
        for tile in tiles {
            let slot = &mut counts[tile.index()];
            *slot = slot.saturating_add(1);
            if *slot > 4 {
                return Err(HandError::TooManyCopies {
                    kind: tile.index() as u8,
                    count: *slot,
                });
            }
        }
        Hand::from_counts(counts, melds)
    }

    /// Record red fives held in the hand (scoring metadata only; the
    /// counts already include them as ordinary fives).
    pub fn with_red_fives(mut self, red_fives: u8) -> Self {
        self.red_fives = red_fives;
        self
    }

    pub fn counts(&self) -> &[u8; TILE_KINDS] {
        &self.counts
    }

    pub fn count(&self, tile: Tile) -> u8 {
        self.counts[tile.index()]
    }

    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }

    pub fn red_fives(&self) -> u8 {
        self.red_fives
    }

    /// Concealed tiles currently held
    pub fn concealed_total(&self) -> u8 {
        self.counts.iter().sum()
    }

    /// Add one concealed tile, keeping both views in step.
    pub fn add(&mut self, tile: Tile) -> Result<(), HandError> {
        let idx = tile.index();
        if self.counts[idx] >= 4 {
            return Err(HandError::TooManyCopies { kind: idx as u8, count: 5 });
        }
        let total = self.concealed_total() + 3 * self.melds.len() as u8;
        if total >= 14 {
            return Err(HandError::BadTileCount { total: total + 1 });
        }
        self.counts[idx] += 1;
        *self.packed_slot_mut(idx) += 1 << (3 * (idx % 9));
        Ok(())
    }

    /// Remove one concealed tile, keeping both views in step.
    pub fn remove(&mut self, tile: Tile) -> Result<(), HandError> {
        let idx = tile.index();
        if self.counts[idx] == 0 {
            return Err(HandError::WinTileNotInHand { tile: tile.to_string() });
        }
        self.counts[idx] -= 1;
        *self.packed_slot_mut(idx) -= 1 << (3 * (idx % 9));
        Ok(())
    }

    /// Bit-packed view of one numbered suit (27 bits, 3 per slot).
    pub fn packed_suit(&self, suit: Suit) -> u32 {
        match suit {
            Suit::Man => self.manzu,
            Suit::Pin => self.pinzu,
            Suit::Sou => self.souzu,
        }
    }

    /// Bit-packed view of the honor group (21 bits, 3 per slot).
    pub fn packed_honors(&self) -> u32 {
        self.honors
    }

    /// Count vector of one numbered suit.
    pub fn suit_counts(&self, suit: Suit) -> [u8; 9] {
        let mut out = [0u8; 9];
        out.copy_from_slice(&self.counts[suit.offset()..suit.offset() + 9]);
        out
    }

    /// Count vector of the honor group.
    pub fn honor_counts(&self) -> [u8; 7] {
        let mut out = [0u8; 7];
        out.copy_from_slice(&self.counts[HONOR_OFFSET..TILE_KINDS]);
        out
    }

    fn packed_slot_mut(&mut self, idx: usize) -> &mut u32 {
        match idx / 9 {
            0 => &mut self.manzu,
            1 => &mut self.pinzu,
            2 => &mut self.souzu,
            _ => &mut self.honors,
        }
    }

    fn rebuild_packed(&mut self) {
        self.manzu = pack(&self.counts[0..9]);
        self.pinzu = pack(&self.counts[9..18]);
        self.souzu = pack(&self.counts[18..27]);
        self.honors = pack(&self.counts[27..34]);
    }
}

fn pack(counts: &[u8]) -> u32 {
    counts
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, &c)| acc + ((c as u32) << (3 * i)))
}
