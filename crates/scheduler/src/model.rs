use std::time::Duration;

use calmfeed_core_types::{ContentEntity, Verdict};

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Time between extraction cycles.
    pub interval: Duration,
    /// Upper bound on decisions being scored at once.
    pub max_in_flight: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1_000),
            max_in_flight: 8,
        }
    }
}

/// What a single cycle saw. Decisions dispatched here complete later.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub extracted: usize,
    pub skipped: usize,
    pub dispatched: usize,
}

/// A finished decision travelling back to the scheduler.
#[derive(Clone, Debug)]
pub struct DecisionOutcome {
    pub entity: ContentEntity,
    pub verdict: Verdict,
}
