//! Injective hashes over suit count vectors.
//!
//! These two functions are the only keys into the precomputed shanten
//! tables. Both are pure, total on their domain (per-slot count 0..=4,
//! total at most 14) and collision-free.
//!
//! The numbered-suit hash ranks a 9-slot vector inside the lexicographic
//! enumeration of its domain, using a precomputed completion-count table;
//! the result is dense over the 405,350 reachable multisets. The honor
//! hash is a plain base-5 fold over the 7 slots, most-significant first.

/// Upper bound on tiles of one suit in a hand.
const MAX_TILES: usize = 14;

/// Number of distinct 9-slot count vectors (and the size of the dense
/// numbered-suit key space).
pub const SUIT_KEY_COUNT: u32 = 405_350;

/// Exclusive upper bound of the honor key space (base-5, 7 digits).
pub const HONOR_KEY_BOUND: u32 = 78_125; // 5^7

/// completions[i][s]: number of valid ways to fill slots i.. given that
/// slots before i already sum to s.
const fn completion_table() -> [[u32; MAX_TILES + 1]; 10] {
    let mut f = [[0u32; MAX_TILES + 1]; 10];
    let mut s = 0;
    while s <= MAX_TILES {
        f[9][s] = 1;
        s += 1;
    }
    let mut i = 9;
    while i > 0 {
        i -= 1;
        let mut s = 0;
        while s <= MAX_TILES {
            let mut total = 0;
            let mut d = 0;
            while d <= 4 && s + d <= MAX_TILES {
                total += f[i + 1][s + d];
                d += 1;
            }
            f[i][s] = total;
            s += 1;
        }
    }
    f
}

const COMPLETIONS: [[u32; MAX_TILES + 1]; 10] = completion_table();

/// Hash a 9-slot numbered-suit count vector.
///
/// The counts must be a valid suit holding (each 0..=4, sum <= 14);
/// the result is then in 0..SUIT_KEY_COUNT.
pub fn suit_hash(counts: &[u8; 9]) -> u32 {
    let mut hash = 0u32;
    let mut sum = 0usize;
    for (i, &c) in counts.iter().enumerate() {
        debug_assert!(c <= 4);
        let mut d = 0usize;
        while d < c as usize {
            hash += COMPLETIONS[i + 1][sum + d];
            d += 1;
        }
        sum += c as usize;
    }
    debug_assert!(sum <= MAX_TILES);
    hash
}

/// Hash a 7-slot honor count vector.
pub fn honor_hash(counts: &[u8; 7]) -> u32 {
    counts.iter().fold(0u32, |acc, &c| {
        debug_assert!(c <= 4);
        acc * 5 + c as u32
    })
}
