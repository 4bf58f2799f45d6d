//! Shanten and required-tile calculation.
//!
//! Shanten is the minimum number of tile exchanges needed to reach a
//! winning shape: -1 means the hand already wins, 0 is tenpai. The wait
//! set holds every tile kind whose draw lowers the shanten.
//!
//! The standard form is solved with the precomputed suit tables: the four
//! tile groups each contribute a ten-slot row (distances plus wait
//! bitmaps per role), and the rows are folded together with a convolution
//! over the number of completed sets consumed, m = 4 - melds in total,
//! with exactly one group supplying the head. Seven pairs and thirteen
//! orphans are closed-form counts over the raw tile counts.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::error::HandError;
use crate::hand::Hand;
use crate::tables::{self, ShantenTables, TableRow};
use crate::tile::{KOKUSHI_TILES, Suit, TILE_KINDS, Tile};

/// Bitmask of winning forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forms(u8);

impl Forms {
    /// Four sets and a pair
    pub const STANDARD: Forms = Forms(0b001);
    /// Seven distinct pairs (chiitoitsu)
    pub const SEVEN_PAIRS: Forms = Forms(0b010);
    /// Thirteen orphans (kokushi musou)
    pub const THIRTEEN_ORPHANS: Forms = Forms(0b100);
    /// All three forms
    pub const ALL: Forms = Forms(0b111);

    pub const fn empty() -> Forms {
        Forms(0)
    }

    pub fn contains(self, other: Forms) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Forms {
    type Output = Forms;
    fn bitor(self, rhs: Forms) -> Forms {
        Forms(self.0 | rhs.0)
    }
}

impl BitOrAssign for Forms {
    fn bitor_assign(&mut self, rhs: Forms) {
        self.0 |= rhs.0;
    }
}

/// Result of a shanten query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShantenResult {
    /// Every requested form attaining the reported shanten
    pub forms: Forms,
    /// -1 (winning) up to 8 for the standard form, 13 for orphans
    pub shanten: i8,
    /// Tile kinds whose draw lowers the shanten, ascending
    pub waits: Vec<Tile>,
}

/// Compute shanten and waits against the process-wide tables.
pub fn calc_shanten(hand: &Hand, requested: Forms) -> Result<ShantenResult, HandError> {
    calc_shanten_with(tables::global(), hand, requested)
}

/// Compute shanten and waits against an explicit table source.
///
/// Each requested form is evaluated independently; the best shanten wins
/// and ties union their wait sets and form tags. Seven pairs and thirteen
/// orphans are skipped when the hand has called melds.
pub fn calc_shanten_with(
    tables: &ShantenTables,
    hand: &Hand,
    requested: Forms,
) -> Result<ShantenResult, HandError> {
    let melded = !hand.melds().is_empty();
    let mut best: Option<(Forms, i8, u64)> = None;

    if requested.contains(Forms::STANDARD) {
        let (shanten, wait) = standard(tables, hand)?;
        fold(&mut best, Forms::STANDARD, shanten, wait);
    }
    if requested.contains(Forms::SEVEN_PAIRS) && !melded {
        let (shanten, wait) = seven_pairs(hand.counts());
        fold(&mut best, Forms::SEVEN_PAIRS, shanten, wait);
    }
    if requested.contains(Forms::THIRTEEN_ORPHANS) && !melded {
        let (shanten, wait) = thirteen_orphans(hand.counts());
        fold(&mut best, Forms::THIRTEEN_ORPHANS, shanten, wait);
    }

    let (forms, shanten, wait) = best.ok_or(HandError::NoEligibleForm)?;
    Ok(ShantenResult { forms, shanten, waits: wait_tiles(wait) })
}

/// The wait list alone (required-tile query).
pub fn required_tiles(hand: &Hand, requested: Forms) -> Result<Vec<Tile>, HandError> {
    Ok(calc_shanten(hand, requested)?.waits)
}

fn fold(best: &mut Option<(Forms, i8, u64)>, form: Forms, shanten: i8, wait: u64) {
    let replace = match best {
        None => true,
        Some((_, s, _)) => shanten < *s,
    };
    if replace {
        *best = Some((form, shanten, wait));
    } else if let Some((forms, s, w)) = best {
        if shanten == *s {
            *forms |= form;
            *w |= wait;
        }
    }
}

fn wait_tiles(wait: u64) -> Vec<Tile> {
    (0..TILE_KINDS)
        .filter(|i| wait & (1 << i) != 0)
        .map(|i| Tile::from_index(i).expect("kind index in range"))
        .collect()
}

/// One slot of the convolution accumulator: distance plus a growing wait
/// field (9 bits per merged suit, honors at the top).
#[derive(Debug, Clone, Copy)]
struct AccCell {
    dist: u8,
    wait: u64,
}

/// Standard-form shanten. Returns the raw 34-bit wait field.
fn standard(tables: &ShantenTables, hand: &Hand) -> Result<(i8, u64), HandError> {
    let manzu = tables.suit_row(&hand.suit_counts(Suit::Man))?;
    let pinzu = tables.suit_row(&hand.suit_counts(Suit::Pin))?;
    let souzu = tables.suit_row(&hand.suit_counts(Suit::Sou))?;
    let honors = tables.honor_row(&hand.honor_counts())?;

    let m = 4 - hand.melds().len();

    // Merging honors first and manzu last leaves the honor bitmap shifted
    // into bits 27.. and manzu in bits 0.., matching the kind space.
    let mut acc: [AccCell; 10] = std::array::from_fn(|r| AccCell {
        dist: honors[r].dist,
        wait: honors[r].wait as u64,
    });
    merge(&mut acc, &souzu, m);
    merge(&mut acc, &pinzu, m);
    merge(&mut acc, &manzu, m);

    let shanten = acc[5 + m].dist as i8 - 1;
    Ok((shanten, acc[5 + m].wait))
}

/// Fold one suit row into the accumulator.
///
/// Head-bearing targets split as head-side + headless-side; headless
/// targets split as headless + headless. Both walks descend so every
/// operand read is a value from before this merge.
fn merge(acc: &mut [AccCell; 10], row: &TableRow, m: usize) {
    for i in (5..=m + 5).rev() {
        let mut best = AccCell {
            dist: acc[i].dist + row[0].dist,
            wait: (acc[i].wait << 9) | row[0].wait as u64,
        };
        relax(&mut best, acc[0].dist + row[i].dist, (acc[0].wait << 9) | row[i].wait as u64);
        for j in 5..i {
            relax(
                &mut best,
                acc[j].dist + row[i - j].dist,
                (acc[j].wait << 9) | row[i - j].wait as u64,
            );
            relax(
                &mut best,
                acc[i - j].dist + row[j].dist,
                (acc[i - j].wait << 9) | row[j].wait as u64,
            );
        }
        acc[i] = best;
    }

    for i in (0..=m).rev() {
        let mut best = AccCell {
            dist: acc[i].dist + row[0].dist,
            wait: (acc[i].wait << 9) | row[0].wait as u64,
        };
        for j in 0..i {
            relax(
                &mut best,
                acc[j].dist + row[i - j].dist,
                (acc[j].wait << 9) | row[i - j].wait as u64,
            );
        }
        acc[i] = best;
    }
}

/// Keep the minimum distance; a tie unions the witnesses.
fn relax(best: &mut AccCell, dist: u8, wait: u64) {
    if dist == best.dist {
        best.wait |= wait;
    } else if dist < best.dist {
        *best = AccCell { dist, wait };
    }
}

/// Seven-pairs shanten over raw counts. Returns the 34-bit wait field.
fn seven_pairs(counts: &[u8; TILE_KINDS]) -> (i8, u64) {
    let mut pairs = 0i8;
    let mut kinds = 0i8;
    let mut absent = 0u64;
    let mut singles = 0u64;

    for (i, &count) in counts.iter().enumerate() {
        match count {
            0 => absent |= 1 << i,
            1 => {
                kinds += 1;
                singles |= 1 << i;
            }
            _ => {
                kinds += 1;
                pairs += 1;
            }
        }
    }

    let shanten = 6 - pairs + (7 - kinds).max(0);
    let wait = if kinds < 7 {
        // New kinds help as much as pairing up a singleton
        absent | singles
    } else if pairs == 7 {
        0
    } else {
        singles
    };

    (shanten, wait)
}

/// Thirteen-orphans shanten over raw counts. Returns the 34-bit wait field.
fn thirteen_orphans(counts: &[u8; TILE_KINDS]) -> (i8, u64) {
    let mut pairs = 0i8;
    let mut kinds = 0i8;
    let mut absent = 0u64;
    let mut singles = 0u64;

    for tile in KOKUSHI_TILES {
        let i = tile.index();
        match counts[i] {
            0 => absent |= 1 << i,
            1 => {
                kinds += 1;
                singles |= 1 << i;
            }
            _ => {
                kinds += 1;
                pairs += 1;
            }
        }
    }

    let shanten = 13 - kinds - i8::from(pairs > 0);
    // With a pair in place only missing orphans help
    let wait = if pairs > 0 { absent } else { absent | singles };

    (shanten, wait)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_hand;
    use std::sync::LazyLock;

    static TABLES: LazyLock<ShantenTables> = LazyLock::new(ShantenTables::computed);

    fn hand(s: &str) -> Hand {
        parse_hand(s).unwrap().into_hand().unwrap()
    }

    fn calc(s: &str) -> ShantenResult {
        calc_shanten_with(&TABLES, &hand(s), Forms::ALL).unwrap()
    }

    fn wait_indices(result: &ShantenResult) -> Vec<usize> {
        result.waits.iter().map(|t| t.index()).collect()
    }

    // ===== Complete Hand Tests =====

    #[test]
    fn complete_standard_hand() {
        let result = calc("123m456p789s11122z");
        assert_eq!(result.shanten, -1);
        assert!(result.forms.contains(Forms::STANDARD));
        assert!(result.waits.is_empty());
    }

    #[test]
    fn complete_seven_pairs() {
        // Pairs at kinds 0, 4, 9, 13, 18, 27, 31
        let result = calc("1155m1155p11s1155z");
        assert_eq!(result.shanten, -1);
        assert_eq!(result.forms, Forms::SEVEN_PAIRS);
        assert!(result.waits.is_empty());
    }

    #[test]
    fn complete_kokushi() {
        let result = calc("19m19p19s12345677z");
        assert_eq!(result.shanten, -1);
        assert_eq!(result.forms, Forms::THIRTEEN_ORPHANS);
        assert!(result.waits.is_empty());
    }

    // ===== Tenpai Tests =====

    #[test]
    fn tenpai_standard() {
        let result = calc("123m456p789s1112z");
        assert_eq!(result.shanten, 0);
        assert!(result.forms.contains(Forms::STANDARD));
        // Tanki on the lone south wind
        assert_eq!(wait_indices(&result), vec![28]);
    }

    #[test]
    fn kokushi_thirteen_sided_wait() {
        // One of each orphan, no pair: any of the thirteen completes
        let result = calc("19m19p19s1234567z");
        assert_eq!(result.shanten, 0);
        assert_eq!(result.forms, Forms::THIRTEEN_ORPHANS);
        assert_eq!(
            wait_indices(&result),
            vec![0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33]
        );
    }

    #[test]
    fn kokushi_worst_case_is_thirteen() {
        // No terminals or honors at all
        let result =
            calc_shanten_with(&TABLES, &hand("2345678m2345678p"), Forms::THIRTEEN_ORPHANS)
                .unwrap();
        assert_eq!(result.shanten, 13);
        assert_eq!(result.waits.len(), 13);
    }

    #[test]
    fn required_tile_query_returns_the_wait_list() {
        let waits = required_tiles(&hand("123m456p789s1112z"), Forms::ALL).unwrap();
        let indices: Vec<usize> = waits.iter().map(|t| t.index()).collect();
        assert_eq!(indices, vec![28]);
    }

    #[test]
    fn kokushi_with_pair_waits_on_missing_only() {
        // Pair of east, missing the red dragon
        let result = calc("19m19p19s1123456z");
        assert_eq!(result.shanten, 0);
        assert_eq!(wait_indices(&result), vec![33]);
    }

    // ===== Shanten Ladder =====

    #[test]
    fn one_away_with_block_surplus() {
        // 111m 2m 56789m 1122p: two sets at most, three partial blocks
        let result = calc("111256789m1122p");
        assert_eq!(result.shanten, 1);
        assert!(result.forms.contains(Forms::STANDARD));
        // 4m/7m extend the run; 1p/2p grow a pinzu block or the pair
        assert_eq!(wait_indices(&result), vec![3, 6, 9, 10]);
    }

    #[test]
    fn disconnected_hand_is_far() {
        let result = calc("1379m1379p1379s1z");
        assert!(result.shanten >= 4);
    }

    #[test]
    fn fourteen_tile_hand_after_draw() {
        let result = calc("1112345678999m1p");
        assert_eq!(result.shanten, 0);
        // The 1p sits as the pair-in-waiting next to a pure nine-gates shape
        assert!(wait_indices(&result).contains(&9));
    }

    // ===== Called Melds =====

    #[test]
    fn melds_shift_the_set_target() {
        // Two pons called; 1123567m left in hand
        let result =
            calc_shanten_with(&TABLES, &hand("1123567m(111z)(222z)"), Forms::ALL).unwrap();
        assert_eq!(result.shanten, 0);
        assert_eq!(result.forms, Forms::STANDARD);
        // Tanki on 1m or the 23m ryanmen: 1m / 4m
        assert_eq!(wait_indices(&result), vec![0, 3]);
    }

    #[test]
    fn melds_disqualify_pair_forms() {
        // Five honor pairs and a floater plus a pon: no chiitoitsu path
        let h = hand("11223344556z(777z)");
        let result = calc_shanten_with(&TABLES, &h, Forms::ALL).unwrap();
        assert_eq!(result.forms, Forms::STANDARD);

        let masked = calc_shanten_with(&TABLES, &h, Forms::SEVEN_PAIRS);
        assert_eq!(masked, Err(HandError::NoEligibleForm));
    }

    #[test]
    fn four_melds_tanki() {
        let result = calc_shanten_with(
            &TABLES,
            &hand("5m(111z)(222z)(333m)(456s)"),
            Forms::ALL,
        )
        .unwrap();
        assert_eq!(result.shanten, 0);
        assert_eq!(wait_indices(&result), vec![4]);
    }

    // ===== Form Dispatch =====

    #[test]
    fn chiitoitsu_tenpai() {
        // Six pairs and a floater: chiitoitsu tenpai, standard is further
        let result = calc("1122m3344p5566s7z");
        assert_eq!(result.shanten, 0);
        assert_eq!(result.forms, Forms::SEVEN_PAIRS);
        assert_eq!(wait_indices(&result), vec![33]);
    }

    #[test]
    fn tied_forms_union_their_waits() {
        // Six manzu pairs and a 7m: tenpai both as chiitoitsu (pair the
        // 7m) and as two iipeikou runs with a tanki
        let result = calc("1122334455667m");
        assert_eq!(result.shanten, 0);
        assert!(result.forms.contains(Forms::STANDARD));
        assert!(result.forms.contains(Forms::SEVEN_PAIRS));
        assert_eq!(wait_indices(&result), vec![0, 3, 6]);
    }

    #[test]
    fn form_mask_restricts_computation() {
        let h = hand("1122m3344p5566s7z");
        let standard_only = calc_shanten_with(&TABLES, &h, Forms::STANDARD).unwrap();
        assert_eq!(standard_only.forms, Forms::STANDARD);
        assert!(standard_only.shanten > 0);

        let empty = calc_shanten_with(&TABLES, &h, Forms::empty());
        assert_eq!(empty, Err(HandError::NoEligibleForm));
    }

    #[test]
    fn seven_pairs_counts_distinct_kinds_only() {
        // Four of a kind is still one pair toward chiitoitsu
        let result = calc_shanten_with(&TABLES, &hand("11112233445566m"), Forms::SEVEN_PAIRS)
            .unwrap();
        assert_eq!(result.shanten, 1);
    }

    // ===== Wait-Set Invariants =====

    fn assert_waits_exact(hand_str: &str) {
        let h = hand(hand_str);
        let base = calc_shanten_with(&TABLES, &h, Forms::ALL).unwrap();
        let wait_set: Vec<usize> = base.waits.iter().map(|t| t.index()).collect();

        for kind in 0..TILE_KINDS {
            let tile = Tile::from_index(kind).unwrap();
            if h.count(tile) >= 4 {
                continue;
            }
            let mut grown = h.clone();
            grown.add(tile).unwrap();
            let after = calc_shanten_with(&TABLES, &grown, Forms::ALL).unwrap();
            if wait_set.contains(&kind) {
                assert_eq!(
                    after.shanten,
                    base.shanten - 1,
                    "wait tile {} must lower shanten",
                    tile
                );
            } else {
                assert!(
                    after.shanten >= base.shanten,
                    "non-wait tile {} must not lower shanten",
                    tile
                );
            }
        }
    }

    #[test]
    fn waits_are_exactly_the_improving_tiles() {
        assert_waits_exact("111256789m1122p");
        assert_waits_exact("123m456p789s1112z");
        assert_waits_exact("19m19p19s1234567z");
        assert_waits_exact("1122m3344p5566s7z");
    }

    #[test]
    fn suit_reversal_preserves_shanten() {
        // Mirroring a suit maps shuntsu onto shuntsu
        let pairs = [
            ("111256789m1122p", "123458999m8899p"),
            ("123m456p789s1112z", "789m456p123s1112z"),
        ];
        for (a, b) in pairs {
            let ra = calc(a);
            let rb = calc(b);
            assert_eq!(ra.shanten, rb.shanten, "{} vs {}", a, b);
            assert_eq!(ra.waits.len(), rb.waits.len());
        }
    }

    // ===== Validation =====

    #[test]
    fn rejects_invalid_counts() {
        let parsed = parse_hand("11111m456p789s11z").unwrap();
        assert!(parsed.into_hand().is_err());
    }
}
