//! Block decomposition pattern tables for the hand separator.
//!
//! For every suit holding that splits completely into shuntsu, koutsu and
//! toitsu, the table lists each split as a pattern of (slot, kind)
//! blocks, keyed by the bit-packed suit integer (three bits per slot).
//! On disk the tables are JSON: a list of records mapping a key to its
//! pattern strings, each string a run of `<slot-digit><kind-char>` pairs
//! with kind `s` (shuntsu), `k` (koutsu) or `t` (toitsu).
//!
//! Like the shanten tables, the production source is loaded from files
//! once and read lock-free; without installed files patterns are derived
//! on demand from the packed key.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::TableError;

pub const SUIT_PATTERNS_FILE: &str = "suit_patterns.json";
pub const HONOR_PATTERNS_FILE: &str = "honor_patterns.json";

/// Kind of a block inside a decomposition.
///
/// `Kantsu` never appears in the pattern tables; it enters decompositions
/// only through called melds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Shuntsu,
    Koutsu,
    Kantsu,
    Toitsu,
}

/// One block of a suit-local pattern: the kind plus the 0-based slot of
/// its smallest tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternBlock {
    pub kind: BlockKind,
    pub slot: u8,
}

/// A full decomposition of one suit holding.
pub type Pattern = Vec<PatternBlock>;

/// One JSON record of a pattern file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRecord {
    pub key: u32,
    pub pattern: Vec<String>,
}

/// Render a pattern as `<slot-digit><kind-char>` pairs.
pub fn encode_pattern(pattern: &Pattern) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    for block in pattern {
        out.push((b'0' + block.slot) as char);
        out.push(match block.kind {
            BlockKind::Koutsu => 'k',
            BlockKind::Shuntsu => 's',
            BlockKind::Toitsu => 't',
            BlockKind::Kantsu => unreachable!("kantsu never stored in pattern tables"),
        });
    }
    out
}

/// Parse a pattern string written by [`encode_pattern`].
pub fn decode_pattern(text: &str) -> Option<Pattern> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() % 2 != 0 {
        return None;
    }
    let mut pattern = Vec::with_capacity(chars.len() / 2);
    for pair in chars.chunks(2) {
        let slot = pair[0].to_digit(10)? as u8;
        if slot > 8 {
            return None;
        }
        let kind = match pair[1] {
            'k' => BlockKind::Koutsu,
            's' => BlockKind::Shuntsu,
            't' => BlockKind::Toitsu,
            _ => return None,
        };
        pattern.push(PatternBlock { kind, slot });
    }
    Some(pattern)
}

/// Expand a packed suit integer back into per-slot counts.
fn unpack_counts(packed: u32) -> [u8; 9] {
    std::array::from_fn(|i| ((packed >> (3 * i)) & 0b111) as u8)
}

/// All complete decompositions of a holding into blocks. Every tile must
/// be consumed; a holding with leftovers yields nothing.
fn decompose(packed: u32, slots: usize, allow_shuntsu: bool) -> Vec<Pattern> {
    let mut counts = unpack_counts(packed);
    if counts.iter().any(|&c| c > 4)
        || counts.iter().map(|&c| c as u32).sum::<u32>() > 14
        || counts[slots..].iter().any(|&c| c > 0)
    {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut current = Vec::new();
    walk(&mut counts, 0, slots, allow_shuntsu, &mut current, &mut out);

    // A 4-count slot can split the same way in two orders
    for pattern in &mut out {
        pattern.sort_by_key(|b| (b.slot, b.kind as u8));
    }
    out.sort();
    out.dedup();
    out
}

fn walk(
    counts: &mut [u8; 9],
    slot: usize,
    slots: usize,
    allow_shuntsu: bool,
    current: &mut Pattern,
    out: &mut Vec<Pattern>,
) {
    if slot == slots {
        out.push(current.clone());
        return;
    }
    if counts[slot] == 0 {
        walk(counts, slot + 1, slots, allow_shuntsu, current, out);
        return;
    }

    // Some block must start at the first occupied slot
    if counts[slot] >= 3 {
        counts[slot] -= 3;
        current.push(PatternBlock { kind: BlockKind::Koutsu, slot: slot as u8 });
        walk(counts, slot, slots, allow_shuntsu, current, out);
        current.pop();
        counts[slot] += 3;
    }
    if counts[slot] >= 2 {
        counts[slot] -= 2;
        current.push(PatternBlock { kind: BlockKind::Toitsu, slot: slot as u8 });
        walk(counts, slot, slots, allow_shuntsu, current, out);
        current.pop();
        counts[slot] += 2;
    }
    if allow_shuntsu && slot + 2 < slots && counts[slot + 1] > 0 && counts[slot + 2] > 0 {
        counts[slot] -= 1;
        counts[slot + 1] -= 1;
        counts[slot + 2] -= 1;
        current.push(PatternBlock { kind: BlockKind::Shuntsu, slot: slot as u8 });
        walk(counts, slot, slots, allow_shuntsu, current, out);
        current.pop();
        counts[slot] += 1;
        counts[slot + 1] += 1;
        counts[slot + 2] += 1;
    }
}

/// Ordering needed for dedup above.
impl PartialOrd for PatternBlock {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PatternBlock {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.slot, self.kind as u8).cmp(&(other.slot, other.kind as u8))
    }
}

enum Source {
    Loaded {
        suits: HashMap<u32, Vec<Pattern>>,
        honors: HashMap<u32, Vec<Pattern>>,
    },
    Computed {
        suits: Mutex<HashMap<u32, Vec<Pattern>>>,
        honors: Mutex<HashMap<u32, Vec<Pattern>>>,
    },
}

/// The pair of decomposition pattern tables serving a process.
pub struct PatternTables {
    source: Source,
}

impl PatternTables {
    /// Load `suit_patterns.json` and `honor_patterns.json` from a directory.
    pub fn from_dir(dir: &Path) -> Result<Self, TableError> {
        Ok(PatternTables {
            source: Source::Loaded {
                suits: read_patterns(&dir.join(SUIT_PATTERNS_FILE))?,
                honors: read_patterns(&dir.join(HONOR_PATTERNS_FILE))?,
            },
        })
    }

    /// A source that derives patterns from the packed key on demand.
    pub fn computed() -> Self {
        PatternTables {
            source: Source::Computed {
                suits: Mutex::new(HashMap::new()),
                honors: Mutex::new(HashMap::new()),
            },
        }
    }

    /// Decompositions of a packed numbered-suit holding.
    pub fn suit_patterns(&self, packed: u32) -> Vec<Pattern> {
        self.lookup(packed, true)
    }

    /// Decompositions of a packed honor holding.
    pub fn honor_patterns(&self, packed: u32) -> Vec<Pattern> {
        self.lookup(packed, false)
    }

    fn lookup(&self, packed: u32, suit: bool) -> Vec<Pattern> {
        if packed == 0 {
            // No tiles: exactly the empty decomposition
            return vec![Vec::new()];
        }
        match &self.source {
            Source::Loaded { suits, honors } => {
                let table = if suit { suits } else { honors };
                table.get(&packed).cloned().unwrap_or_default()
            }
            Source::Computed { suits, honors } => {
                let cache = if suit { suits } else { honors };
                cache
                    .lock()
                    .expect("pattern cache poisoned")
                    .entry(packed)
                    .or_insert_with(|| {
                        if suit {
                            decompose(packed, 9, true)
                        } else {
                            decompose(packed, 7, false)
                        }
                    })
                    .clone()
            }
        }
    }
}

/// Generate the numbered-suit pattern records (decomposable keys only).
pub fn generate_suit_patterns() -> Vec<PatternRecord> {
    generate_records(9, true)
}

/// Generate the honor pattern records.
pub fn generate_honor_patterns() -> Vec<PatternRecord> {
    generate_records(7, false)
}

fn generate_records(slots: usize, allow_shuntsu: bool) -> Vec<PatternRecord> {
    let mut records = Vec::new();
    crate::tablegen::for_each_holding(slots, &mut |holding| {
        let packed = holding
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &c)| acc + ((c as u32) << (3 * i)));
        let patterns = decompose(packed, slots, allow_shuntsu);
        if !patterns.is_empty() {
            records.push(PatternRecord {
                key: packed,
                pattern: patterns.iter().map(encode_pattern).collect(),
            });
        }
    });
    records.sort_by_key(|r| r.key);
    records
}

/// Write pattern records as a JSON document.
pub fn write_patterns(path: &Path, records: &[PatternRecord]) -> Result<(), TableError> {
    let file = File::create(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, records).map_err(|source| TableError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a pattern file back into a key-indexed map.
pub fn read_patterns(path: &Path) -> Result<HashMap<u32, Vec<Pattern>>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<PatternRecord> = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| TableError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut table = HashMap::with_capacity(records.len());
    for record in records {
        let mut patterns = Vec::with_capacity(record.pattern.len());
        for text in &record.pattern {
            let pattern = decode_pattern(text).ok_or_else(|| TableError::MalformedBlock {
                path: path.to_path_buf(),
                block: text.clone(),
            })?;
            patterns.push(pattern);
        }
        table.insert(record.key, patterns);
    }
    Ok(table)
}

static PATTERNS: OnceLock<PatternTables> = OnceLock::new();

/// Install file-backed pattern tables as the process-wide source.
pub fn init_from_dir(dir: &Path) -> Result<(), TableError> {
    let tables = PatternTables::from_dir(dir)?;
    PATTERNS
        .set(tables)
        .map_err(|_| TableError::AlreadyInitialized)
}

/// The process-wide pattern source, computing on demand if no files were
/// installed.
pub fn global() -> &'static PatternTables {
    PATTERNS.get_or_init(PatternTables::computed)
}
