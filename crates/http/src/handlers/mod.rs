pub mod map;
pub mod progress;
pub mod rewards;
pub mod stats;
