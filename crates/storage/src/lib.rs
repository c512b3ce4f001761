//! SQLite-backed progress store for schatzkarte.
//!
//! Persists everything mutable: per-module progress flags, the append-once
//! reward ledger, user stats, and recorded goals. The static module catalog
//! lives in `schatzkarte-core` and is never stored here.

mod error;
mod migrations;
mod sqlite;
pub mod traits;

pub use error::StorageError;
pub use sqlite::Storage;
pub use traits::ProgressStore;

pub type Result<T> = std::result::Result<T, StorageError>;
