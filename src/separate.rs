//! Hand separation: every way a winning hand splits into blocks.
//!
//! Given a completed hand and the tile that finished it, enumerate each
//! decomposition into four sets plus one pair (called melds included) and
//! classify how the winning tile completed its block. Scoring consumers
//! iterate the result; the wait kind and per-block openness drive fu.

use serde::{Deserialize, Serialize};

use crate::error::HandError;
use crate::hand::{Hand, Meld, MeldKind};
use crate::patterns::{self, BlockKind, Pattern, PatternTables};
use crate::tile::{Suit, Tile};

/// The shape the hand was waiting in, per decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitKind {
    /// Two-sided sequence wait (e.g. 23 completing to 123 or 234)
    Ryanmen,
    /// Closed middle wait (e.g. 24 waiting on the 3)
    Kanchan,
    /// Edge wait (12 waiting on 3, or 89 waiting on 7)
    Penchan,
    /// Two pairs, either completing to a triplet
    Shanpon,
    /// Lone tile waiting to pair up
    Tanki,
}

/// One block of a complete decomposition, in absolute tile space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Smallest tile of the block
    pub first: Tile,
    /// Whether the block counts as open for scoring
    pub open: bool,
}

impl Block {
    fn from_meld(meld: &Meld) -> Block {
        let kind = match meld.kind {
            MeldKind::Pon => BlockKind::Koutsu,
            MeldKind::Chi => BlockKind::Shuntsu,
            MeldKind::Ankan | MeldKind::Minkan | MeldKind::Kakan => BlockKind::Kantsu,
        };
        Block { kind, first: meld.min_tile(), open: meld.is_open() }
    }

    fn is_set(&self) -> bool {
        !matches!(self.kind, BlockKind::Toitsu)
    }
}

/// One decomposition of the hand with its wait kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separation {
    /// Meld blocks first, then concealed blocks in suit order
    pub blocks: Vec<Block>,
    pub wait: WaitKind,
}

/// Separate against the process-wide pattern tables.
pub fn separate(hand: &Hand, win_tile: Tile, tsumo: bool) -> Result<Vec<Separation>, HandError> {
    separate_with(patterns::global(), hand, win_tile, tsumo)
}

/// Enumerate every way `hand` (winning tile included) splits into four
/// sets plus a pair, and classify the wait around `win_tile`.
///
/// On a ron the completed block is flagged open in its candidate; on a
/// tsumo it stays concealed. A hand with no four-sets-plus-pair split
/// returns the empty list.
pub fn separate_with(
    tables: &PatternTables,
    hand: &Hand,
    win_tile: Tile,
    tsumo: bool,
) -> Result<Vec<Separation>, HandError> {
    if hand.count(win_tile) == 0 {
        return Err(HandError::WinTileNotInHand { tile: win_tile.to_string() });
    }

    let melded: Vec<Block> = hand.melds().iter().map(Block::from_meld).collect();

    // Fixed depth order: manzu, pinzu, souzu, honors
    let groups: [(Vec<Pattern>, usize); 4] = [
        (tables.suit_patterns(hand.packed_suit(Suit::Man)), 0),
        (tables.suit_patterns(hand.packed_suit(Suit::Pin)), 9),
        (tables.suit_patterns(hand.packed_suit(Suit::Sou)), 18),
        (tables.honor_patterns(hand.packed_honors()), 27),
    ];
    // A suit whose tiles cannot form blocks sinks every candidate
    if groups.iter().any(|(patterns, _)| patterns.is_empty()) {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut blocks = melded.clone();
    assemble(&groups, 0, &mut blocks, melded.len(), win_tile, tsumo, &mut out);
    Ok(out)
}

fn assemble(
    groups: &[(Vec<Pattern>, usize); 4],
    depth: usize,
    blocks: &mut Vec<Block>,
    meld_count: usize,
    win_tile: Tile,
    tsumo: bool,
    out: &mut Vec<Separation>,
) {
    if depth == 4 {
        classify(blocks, meld_count, win_tile, tsumo, out);
        return;
    }

    let (patterns, offset) = &groups[depth];
    for pattern in patterns {
        for block in pattern {
            let first = Tile::from_index(offset + block.slot as usize)
                .expect("pattern slot in kind space");
            blocks.push(Block { kind: block.kind, first, open: false });
        }
        assemble(groups, depth + 1, blocks, meld_count, win_tile, tsumo, out);
        blocks.truncate(blocks.len() - pattern.len());
    }
}

/// Emit one candidate per concealed block the winning tile completes.
fn classify(
    blocks: &[Block],
    meld_count: usize,
    win_tile: Tile,
    tsumo: bool,
    out: &mut Vec<Separation>,
) {
    let sets = blocks.iter().filter(|b| b.is_set()).count();
    let pairs = blocks.len() - sets;
    if sets != 4 || pairs != 1 {
        return;
    }

    for (i, block) in blocks.iter().enumerate() {
        if i < meld_count {
            continue; // called blocks are fixed
        }
        let wait = match block.kind {
            BlockKind::Koutsu if block.first == win_tile => Some(WaitKind::Shanpon),
            BlockKind::Shuntsu => shuntsu_wait(block.first, win_tile),
            BlockKind::Toitsu if block.first == win_tile => Some(WaitKind::Tanki),
            _ => None,
        };
        if let Some(wait) = wait {
            let mut candidate = blocks.to_vec();
            if !tsumo {
                // Completed by ron: the block is treated as exposed
                candidate[i].open = true;
            }
            out.push(Separation { blocks: candidate, wait });
        }
    }
}

/// Wait kind if `win_tile` completes the shuntsu starting at `first`.
fn shuntsu_wait(first: Tile, win_tile: Tile) -> Option<WaitKind> {
    let value = first.value()?;
    let middle = Tile::from_index(first.index() + 1)?;
    let last = Tile::from_index(first.index() + 2)?;

    if middle == win_tile {
        Some(WaitKind::Kanchan)
    } else if last == win_tile && value == 1 {
        // 12 held, won on the 3
        Some(WaitKind::Penchan)
    } else if first == win_tile && value == 7 {
        // 89 held, won on the 7
        Some(WaitKind::Penchan)
    } else if first == win_tile || last == win_tile {
        Some(WaitKind::Ryanmen)
    } else {
        None
    }
}
