//! Precomputed shanten tables.
//!
//! Each table maps the hash of a suit (or honor) count vector to ten
//! cells, one per role slot: r in 0..=4 is "r completed sets, no head",
//! r in 5..=9 is "r - 5 completed sets plus the head". A cell records the
//! minimum tile distance to any winning sub-shape with that role together
//! with two witness bitmaps over the suit's slots.
//!
//! On disk a cell is a packed 22-bit word inside a u32 (bits 0..3
//! distance, 4..12 wait bitmap, 13..21 discard bitmap); records are
//! `(u32 hash, u32[10])`, little-endian, sorted by hash. In memory the
//! cell is kept unpacked.
//!
//! The production source loads the two files once behind an idempotent
//! init guard and serves lock-free reads. When no files have been
//! installed the engine falls back to computing rows on demand with the
//! generator's own per-vector routine, memoized behind a small cache, so
//! the library works out of the box at reduced speed.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{HandError, TableError};
use crate::hash::{honor_hash, suit_hash};
use crate::tablegen;

#[cfg(not(feature = "compat-tables"))]
pub const SUITS_TABLE_FILE: &str = "suits_table.bin";
#[cfg(feature = "compat-tables")]
pub const SUITS_TABLE_FILE: &str = "suits_table_compat.bin";

#[cfg(not(feature = "compat-tables"))]
pub const HONORS_TABLE_FILE: &str = "honors_table.bin";
#[cfg(feature = "compat-tables")]
pub const HONORS_TABLE_FILE: &str = "honors_table_compat.bin";

/// One role slot of a table row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCell {
    /// Tiles that must be drawn to reach the nearest sub-shape (<= 14)
    pub dist: u8,
    /// Slots whose tile would realize that minimum (9 bits)
    pub wait: u16,
    /// Slots holding more tiles than the nearest sub-shape needs (9 bits)
    pub discard: u16,
}

impl TableCell {
    /// Wire format: distance in bits 0..3, wait in 4..12, discard in 13..21.
    pub fn pack(self) -> u32 {
        (self.dist as u32) | ((self.wait as u32) << 4) | ((self.discard as u32) << 13)
    }

    pub fn unpack(word: u32) -> Self {
        TableCell {
            dist: (word & 0xF) as u8,
            wait: ((word >> 4) & 0x1FF) as u16,
            discard: ((word >> 13) & 0x1FF) as u16,
        }
    }
}

/// The ten role slots stored per count vector.
pub type TableRow = [TableCell; 10];

/// Write a table as sequential `(u32 hash, u32[10])` records.
pub fn write_table(path: &Path, rows: &[(u32, TableRow)]) -> Result<(), TableError> {
    let io_err = |source: io::Error| TableError::Io { path: path.to_path_buf(), source };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    for &(hash, row) in rows {
        out.write_u32::<LittleEndian>(hash).map_err(io_err)?;
        for cell in row {
            out.write_u32::<LittleEndian>(cell.pack()).map_err(io_err)?;
        }
    }
    out.flush().map_err(io_err)
}

/// Read a table written by [`write_table`] into a hash-keyed map.
pub fn read_table(path: &Path) -> Result<HashMap<u32, TableRow>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut input = BufReader::new(file);
    let mut table = HashMap::new();
    let mut record = 0usize;
    loop {
        let hash = match input.read_u32::<LittleEndian>() {
            Ok(hash) => hash,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(source) => {
                return Err(TableError::Io { path: path.to_path_buf(), source });
            }
        };
        let mut row = [TableCell::default(); 10];
        for cell in &mut row {
            let word = input.read_u32::<LittleEndian>().map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    TableError::Truncated { path: path.to_path_buf(), record }
                } else {
                    TableError::Io { path: path.to_path_buf(), source: e }
                }
            })?;
            *cell = TableCell::unpack(word);
        }
        table.insert(hash, row);
        record += 1;
    }
    Ok(table)
}

#[derive(Debug)]
enum Source {
    Loaded {
        suits: HashMap<u32, TableRow>,
        honors: HashMap<u32, TableRow>,
    },
    Computed {
        suits: Mutex<HashMap<u32, TableRow>>,
        honors: Mutex<HashMap<u32, TableRow>>,
    },
}

/// The pair of shanten tables serving a process.
#[derive(Debug)]
pub struct ShantenTables {
    source: Source,
}

impl ShantenTables {
    /// Load `suits_table.bin` and `honors_table.bin` from a directory.
    pub fn from_dir(dir: &Path) -> Result<Self, TableError> {
        let suits = read_table(&dir.join(SUITS_TABLE_FILE))?;
        let honors = read_table(&dir.join(HONORS_TABLE_FILE))?;
        Ok(ShantenTables {
            source: Source::Loaded { suits, honors },
        })
    }

    /// A table source that computes rows on demand instead of reading
    /// files. Slower per fresh lookup; used when no tables are installed.
    pub fn computed() -> Self {
        ShantenTables {
            source: Source::Computed {
                suits: Mutex::new(HashMap::new()),
                honors: Mutex::new(HashMap::new()),
            },
        }
    }

    /// Row for a numbered-suit count vector.
    ///
    /// A vector outside the table's domain is unreachable from any valid
    /// hand and reports as such.
    pub fn suit_row(&self, counts: &[u8; 9]) -> Result<TableRow, HandError> {
        if !valid_vector(counts) {
            return Err(HandError::Unreachable);
        }
        let hash = suit_hash(counts);
        match &self.source {
            Source::Loaded { suits, .. } => suits.get(&hash).copied().ok_or(HandError::Unreachable),
            Source::Computed { suits, .. } => Ok(*suits
                .lock()
                .expect("table cache poisoned")
                .entry(hash)
                .or_insert_with(|| tablegen::suit_row(counts))),
        }
    }

    /// Row for an honor count vector.
    pub fn honor_row(&self, counts: &[u8; 7]) -> Result<TableRow, HandError> {
        if !valid_vector(counts) {
            return Err(HandError::Unreachable);
        }
        let hash = honor_hash(counts);
        match &self.source {
            Source::Loaded { honors, .. } => {
                honors.get(&hash).copied().ok_or(HandError::Unreachable)
            }
            Source::Computed { honors, .. } => Ok(*honors
                .lock()
                .expect("table cache poisoned")
                .entry(hash)
                .or_insert_with(|| tablegen::honor_row(counts))),
        }
    }
}

fn valid_vector(counts: &[u8]) -> bool {
    counts.iter().all(|&c| c <= 4) && counts.iter().map(|&c| c as u32).sum::<u32>() <= 14
}

static TABLES: OnceLock<ShantenTables> = OnceLock::new();

/// Install file-backed tables as the process-wide source. May be called
/// once, before any query; later calls fail with `AlreadyInitialized`.
pub fn init_from_dir(dir: &Path) -> Result<(), TableError> {
    let tables = ShantenTables::from_dir(dir)?;
    TABLES
        .set(tables)
        .map_err(|_| TableError::AlreadyInitialized)
}

/// The process-wide table source. Falls back to on-demand computation if
/// [`init_from_dir`] was never called.
pub fn global() -> &'static ShantenTables {
    TABLES.get_or_init(ShantenTables::computed)
}

/// Default on-disk location of the table files, next to the executable.
pub fn default_table_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
