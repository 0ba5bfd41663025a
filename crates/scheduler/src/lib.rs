//! The moderation loop: every tick, extract content from the host document,
//! decide on anything not already allowed, and apply the verdicts.

pub mod error;
pub mod events;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod seen_set;

pub use error::SchedulerError;
pub use events::ModerationEvent;
pub use model::{CycleReport, DecisionOutcome, SchedulerConfig};
pub use orchestrator::Scheduler;
pub use seen_set::SeenSet;
