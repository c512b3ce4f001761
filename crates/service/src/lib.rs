//! Business logic layer for schatzkarte.
//!
//! Three services sit between the HTTP surface and the progress store:
//! the map service (read path), the reward service (write path for the
//! ledger), and the progress service (flags, streaks, goals).

mod error;
mod map_service;
mod progress_service;
mod reward_service;

pub use error::ServiceError;
pub use map_service::{MapService, MapView, ModuleView, RewardView};
pub use progress_service::ProgressService;
pub use reward_service::{CollectOutcome, RewardService};

pub type Result<T> = std::result::Result<T, ServiceError>;
