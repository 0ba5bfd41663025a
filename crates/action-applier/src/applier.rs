use calmfeed_core_types::{ContentEntity, Verdict};
use dom_port::Document;

use crate::errors::ApplyError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Suppression was (re)applied to the node.
    Suppressed,
    /// The node already carried the suppression effect; nothing written.
    AlreadySuppressed,
    /// Allowed content; the node was not touched.
    Untouched,
}

/// Executes a verdict against a single node. Implementations must be
/// idempotent and must not touch any node other than `entity.node`.
pub trait ActionApplier: Send + Sync {
    fn apply(
        &self,
        document: &dyn Document,
        entity: &ContentEntity,
        verdict: &Verdict,
    ) -> Result<ApplyOutcome, ApplyError>;
}
