use std::collections::HashMap;
use std::time::Duration;

use decision_engine::{DecisionConfig, ScorerFailurePolicy};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PolicySnapshot {
    pub rev: u64,
    pub scheduler: SchedulerPolicy,
    pub decision: DecisionPolicy,
    pub actions: ActionPolicy,
    pub provenance: HashMap<String, PolicyProvenance>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct SchedulerPolicy {
    pub interval_ms: u64,
    pub max_in_flight: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DecisionPolicy {
    pub block_threshold: f64,
    pub scorer_timeout_ms: u64,
    pub on_scorer_error: ScorerFailurePolicy,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ActionPolicy {
    pub suppression_filter: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyProvenance {
    pub path: String,
    pub source: PolicySource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicySource {
    Builtin,
    File,
    Env,
    Cli,
}

/// Provenance-free view handed to the runtime.
#[derive(Clone, Debug)]
pub struct PolicyView {
    pub rev: u64,
    pub scheduler: SchedulerPolicy,
    pub decision: DecisionPolicy,
    pub actions: ActionPolicy,
}

impl From<PolicySnapshot> for PolicyView {
    fn from(snapshot: PolicySnapshot) -> Self {
        Self {
            rev: snapshot.rev,
            scheduler: snapshot.scheduler,
            decision: snapshot.decision,
            actions: snapshot.actions,
        }
    }
}

impl PolicyView {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.scheduler.interval_ms)
    }

    pub fn decision_config(&self) -> DecisionConfig {
        DecisionConfig {
            block_threshold: self.decision.block_threshold,
            scorer_timeout: Duration::from_millis(self.decision.scorer_timeout_ms),
            on_scorer_error: self.decision.on_scorer_error,
        }
    }
}

impl PolicySnapshot {
    pub fn set_provenance(&mut self, path: &str, source: PolicySource) {
        self.provenance.insert(
            path.to_string(),
            PolicyProvenance {
                path: path.to_string(),
                source,
            },
        );
    }

    pub fn source_of(&self, path: &str) -> Option<PolicySource> {
        self.provenance.get(path).map(|entry| entry.source)
    }
}
