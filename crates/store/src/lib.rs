//! Persistence for tracked filers, processed filings and their extracted
//! trades.
//!
//! Implements the [`ptr_core::FilingSink`] port over SQLite.

pub mod schema;
pub mod sqlite;

pub use sqlite::{FilerCount, FilerStats, FilingRow, SqliteStore, StoreStats, StoredTrade};
