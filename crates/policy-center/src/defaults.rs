use decision_engine::{ScorerFailurePolicy, DEFAULT_BLOCK_THRESHOLD};

use crate::model::{ActionPolicy, DecisionPolicy, PolicySnapshot, SchedulerPolicy};

pub fn default_snapshot() -> PolicySnapshot {
    PolicySnapshot {
        rev: 1,
        scheduler: SchedulerPolicy {
            interval_ms: 1_000,
            max_in_flight: 8,
        },
        decision: DecisionPolicy {
            block_threshold: DEFAULT_BLOCK_THRESHOLD,
            scorer_timeout_ms: 2_000,
            on_scorer_error: ScorerFailurePolicy::FailOpen,
        },
        actions: ActionPolicy {
            suppression_filter: "blur(2px)".into(),
        },
        provenance: Default::default(),
    }
}
