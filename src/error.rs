//! Error types for the engine.
//!
//! Hand-shaped problems are caller-correctable and surface as [`HandError`]
//! on query entry. Table problems are fatal at initialization time; the
//! engine refuses to serve queries until they are fixed.

use std::path::PathBuf;

use thiserror::Error;

/// An invalid hand handed to a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandError {
    /// A tile kind appears more than four times, counting meld tiles.
    #[error("tile kind {kind} appears {count} times (max 4)")]
    TooManyCopies { kind: u8, count: u8 },

    /// The total tile count, counting each meld as three, is outside 1..=14.
    #[error("hand holds {total} effective tiles (expected 1..=14)")]
    BadTileCount { total: u8 },

    /// More than four called melds.
    #[error("hand declares {melds} called melds (max 4)")]
    TooManyMelds { melds: usize },

    /// A meld whose tiles do not form a pon, chi or kan.
    #[error("called meld is not a valid block")]
    MalformedMeld,

    /// The named winning tile is not present in the hand.
    #[error("winning tile {tile} is not in the hand")]
    WinTileNotInHand { tile: String },

    /// The hand hashes to a key outside the table; only unreachable
    /// (hence invalid) hands can do that.
    #[error("hand is not reachable under the table constraints")]
    Unreachable,

    /// Every requested form was masked out or ineligible for this hand.
    #[error("no requested winning form is eligible for this hand")]
    NoEligibleForm,
}

/// A problem with a precomputed table file.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file ended in the middle of a record.
    #[error("table file {} is truncated at record {record}", .path.display())]
    Truncated { path: PathBuf, record: usize },

    #[error("pattern file {} is not valid JSON", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("pattern file {} contains malformed block string {block:?}", .path.display())]
    MalformedBlock { path: PathBuf, block: String },

    /// `init_from_dir` was called after the global tables were already set.
    #[error("shanten tables were already initialized")]
    AlreadyInitialized,
}
