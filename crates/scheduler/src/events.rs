use action_applier::ApplyOutcome;
use calmfeed_core_types::{Author, NodeId, Verdict};

/// Broadcast once per applied decision.
#[derive(Clone, Debug)]
pub struct ModerationEvent {
    pub node: NodeId,
    pub author: Author,
    pub verdict: Verdict,
    /// `None` when the applier failed (for example, the node was detached).
    pub applied: Option<ApplyOutcome>,
}

impl ModerationEvent {
    pub fn suppressed(&self) -> bool {
        matches!(
            self.applied,
            Some(ApplyOutcome::Suppressed | ApplyOutcome::AlreadySuppressed)
        )
    }
}
