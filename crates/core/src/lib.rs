//! Core types and progression logic for schatzkarte
//!
//! This crate contains domain types shared across all other crates plus the
//! pure derivation logic: weekly unlock resolution, status projection, and
//! level/streak computation. No I/O happens here.

mod catalog;
mod error;
mod level;
mod progress;
mod status;
mod unlock;

pub use catalog::*;
pub use error::*;
pub use level::*;
pub use progress::*;
pub use status::*;
pub use unlock::*;
