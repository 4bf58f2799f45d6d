//! Offline table generation.
//!
//! A winning sub-shape of one suit is any multiset of tiles formed by s
//! shuntsu, k koutsu and h heads with s + k <= 4 and h <= 1, with at most
//! four tiles per slot; honor suits admit no shuntsu. Sub-shapes are
//! grouped by role slot: a shape of n tiles has role n/3 when n is a
//! multiple of three (n/3 sets, no head) and n/3 + 5 otherwise (head
//! included).
//!
//! For a count vector p and sub-shape w, the distance is the number of
//! tiles still to draw, sum of max(w_i - p_i, 0). A table cell holds the
//! minimum over its role group plus the OR of the wait slots (w_i > p_i)
//! and discard slots (w_i < p_i) across every shape attaining it.
//!
//! Full generation enumerates every count vector (each slot 0..=4, total
//! at most 14) in parallel; each vector owns its output row, so the
//! workers never contend, and the rows are sorted by hash before the
//! sequential write.

use std::sync::LazyLock;

use rayon::prelude::*;

use crate::hash::{honor_hash, suit_hash};
use crate::tables::{TableCell, TableRow};

/// Winning sub-shapes of a numbered suit, grouped by role slot.
static SUIT_WIN_PATTERNS: LazyLock<[Vec<[u8; 9]>; 10]> =
    LazyLock::new(|| win_patterns(9, true));

/// Winning sub-shapes of the honor group (no shuntsu).
static HONOR_WIN_PATTERNS: LazyLock<[Vec<[u8; 9]>; 10]> =
    LazyLock::new(|| win_patterns(7, false));

fn win_patterns(slots: usize, with_shuntsu: bool) -> [Vec<[u8; 9]>; 10] {
    let mut groups: [Vec<[u8; 9]>; 10] = std::array::from_fn(|_| Vec::new());

    for num_shuntsu in 0..=4usize {
        if !with_shuntsu && num_shuntsu > 0 {
            continue;
        }
        for num_koutsu in 0..=(4 - num_shuntsu) {
            for num_head in 0..=1usize {
                for_each_cwr(slots - 2, num_shuntsu, &mut |shuntsu_pos| {
                    for_each_cwr(slots, num_koutsu, &mut |koutsu_pos| {
                        for_each_cwr(slots, num_head, &mut |head_pos| {
                            let mut pattern = [0u8; 9];
                            for &i in shuntsu_pos {
                                pattern[i] += 1;
                                pattern[i + 1] += 1;
                                pattern[i + 2] += 1;
                            }
                            for &i in koutsu_pos {
                                pattern[i] += 3;
                            }
                            for &i in head_pos {
                                pattern[i] += 2;
                            }
                            if pattern.iter().all(|&x| x <= 4) {
                                let tiles: usize =
                                    pattern.iter().map(|&x| x as usize).sum();
                                let role = tiles / 3 + if tiles % 3 != 0 { 5 } else { 0 };
                                groups[role].push(pattern);
                            }
                        });
                    });
                });
            }
        }
    }

    // Different (s, k) splits can assemble the same multiset
    for group in &mut groups {
        group.sort_unstable();
        group.dedup();
    }
    groups
}

/// Combinations with replacement of k positions out of 0..n.
fn for_each_cwr(n: usize, k: usize, f: &mut dyn FnMut(&[usize])) {
    fn rec(n: usize, k: usize, start: usize, buf: &mut Vec<usize>, f: &mut dyn FnMut(&[usize])) {
        if buf.len() == k {
            f(buf);
            return;
        }
        for i in start..n {
            buf.push(i);
            rec(n, k, i, buf, f);
            buf.pop();
        }
    }
    rec(n, k, 0, &mut Vec::with_capacity(k), f);
}

fn row_for(counts: &[u8; 9], groups: &[Vec<[u8; 9]>; 10]) -> TableRow {
    let mut row = [TableCell::default(); 10];
    for (role, patterns) in groups.iter().enumerate() {
        let mut best = TableCell { dist: u8::MAX, wait: 0, discard: 0 };
        for pattern in patterns {
            let mut dist = 0u8;
            for i in 0..9 {
                dist += pattern[i].saturating_sub(counts[i]);
            }
            if dist > best.dist {
                continue;
            }
            let mut wait = 0u16;
            let mut discard = 0u16;
            for i in 0..9 {
                if pattern[i] > counts[i] {
                    wait |= 1 << i;
                } else if pattern[i] < counts[i] {
                    discard |= 1 << i;
                }
            }
            if dist < best.dist {
                best = TableCell { dist, wait, discard };
            } else {
                best.wait |= wait;
                best.discard |= discard;
            }
        }
        row[role] = best;
    }
    row
}

/// Table row for one numbered-suit count vector.
pub fn suit_row(counts: &[u8; 9]) -> TableRow {
    row_for(counts, &SUIT_WIN_PATTERNS)
}

/// Table row for one honor count vector.
pub fn honor_row(counts: &[u8; 7]) -> TableRow {
    let mut padded = [0u8; 9];
    padded[..7].copy_from_slice(counts);
    row_for(&padded, &HONOR_WIN_PATTERNS)
}

/// Every count vector over `slots` slots with per-slot value 0..=4 and
/// total at most 14, padded into a 9-slot buffer.
pub fn for_each_holding(slots: usize, f: &mut dyn FnMut(&[u8; 9])) {
    fn rec(slots: usize, slot: usize, left: u8, buf: &mut [u8; 9], f: &mut dyn FnMut(&[u8; 9])) {
        if slot == slots {
            f(buf);
            return;
        }
        for c in 0..=left.min(4) {
            buf[slot] = c;
            rec(slots, slot + 1, left - c, buf, f);
        }
        buf[slot] = 0;
    }
    rec(slots, 0, 14, &mut [0u8; 9], f);
}

/// Generate the full numbered-suit table, sorted by hash.
pub fn generate_suits_table() -> Vec<(u32, TableRow)> {
    let mut holdings = Vec::new();
    for_each_holding(9, &mut |h| holdings.push(*h));

    let mut rows: Vec<(u32, TableRow)> = holdings
        .par_iter()
        .map(|h| (suit_hash(h), suit_row(h)))
        .collect();
    rows.sort_unstable_by_key(|&(hash, _)| hash);
    rows
}

/// Generate the full honor table, sorted by hash.
pub fn generate_honors_table() -> Vec<(u32, TableRow)> {
    let mut holdings = Vec::new();
    for_each_holding(7, &mut |h| holdings.push(*h));

    let mut rows: Vec<(u32, TableRow)> = holdings
        .par_iter()
        .map(|h| {
            let mut counts = [0u8; 7];
            counts.copy_from_slice(&h[..7]);
            (honor_hash(&counts), honor_row(&counts))
        })
        .collect();
    rows.sort_unstable_by_key(|&(hash, _)| hash);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_group_sizes() {
        // Role 0 holds only the empty shape; the head-only role holds one
        // shape per head position.
        assert_eq!(SUIT_WIN_PATTERNS[0], vec![[0u8; 9]]);
        assert_eq!(SUIT_WIN_PATTERNS[5].len(), 9);
        assert_eq!(HONOR_WIN_PATTERNS[5].len(), 7);
        // Honors admit no shuntsu: every shape is koutsu/head stacks
        for group in HONOR_WIN_PATTERNS.iter() {
            for pattern in group {
                assert!(pattern[7] == 0 && pattern[8] == 0);
                assert!(pattern.iter().all(|&c| matches!(c, 0 | 2 | 3)));
            }
        }
    }

    #[test]
    fn every_pattern_respects_slot_cap_and_role() {
        for (role, group) in SUIT_WIN_PATTERNS.iter().enumerate() {
            assert!(!group.is_empty());
            for pattern in group {
                assert!(pattern.iter().all(|&c| c <= 4));
                let tiles: usize = pattern.iter().map(|&c| c as usize).sum();
                assert_eq!(tiles / 3 + if tiles % 3 != 0 { 5 } else { 0 }, role);
            }
        }
    }

    #[test]
    fn empty_suit_distances() {
        let row = suit_row(&[0; 9]);
        // Nothing held: the distance to r sets (+head) is the tile count
        for r in 0..5 {
            assert_eq!(row[r].dist, 3 * r as u8);
            assert_eq!(row[r + 5].dist, 3 * r as u8 + 2);
            assert_eq!(row[r].discard, 0);
        }
        // Any slot can start any shape
        assert_eq!(row[5].wait, 0x1FF);
        assert_eq!(row[1].wait, 0x1FF);
    }

    #[test]
    fn complete_run_has_zero_distance() {
        // 123 456 789 is exactly three shuntsu
        let row = suit_row(&[1, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(row[3].dist, 0);
        assert_eq!(row[3].wait, 0);
        assert_eq!(row[3].discard, 0);
        // One more set cannot reuse the spent tiles
        assert!(row[4].dist > 0);
    }

    #[test]
    fn koutsu_plus_head_has_zero_distance() {
        let mut counts = [0u8; 7];
        counts[0] = 3;
        counts[4] = 2;
        let row = honor_row(&counts);
        assert_eq!(row[6].dist, 0);
        assert_eq!(row[6].wait, 0);
        // Without the head role, the pair slot overflows the shape
        assert_eq!(row[1].dist, 0);
        assert_eq!(row[1].discard, 1 << 4);
    }

    #[test]
    fn wait_bitmap_points_at_missing_tiles() {
        // 12 held: the cheapest single shuntsu needs a 3
        let row = suit_row(&[1, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(row[1].dist, 1);
        assert_eq!(row[1].wait, 1 << 2);
    }

    #[test]
    fn holdings_enumeration_matches_key_space() {
        let mut suits = 0u32;
        for_each_holding(9, &mut |_| suits += 1);
        assert_eq!(suits, crate::hash::SUIT_KEY_COUNT);

        let mut honors = 0u32;
        for_each_holding(7, &mut |_| honors += 1);
        assert_eq!(honors, 43_130);
    }
}
