use calmfeed_core_types::NodeId;
use dom_port::DomError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplyError {
    /// The host re-rendered and the node is gone; nothing left to act on.
    #[error("node detached before action: {0}")]
    Detached(NodeId),
    #[error("document rejected mutation: {0}")]
    Dom(#[from] DomError),
}

impl ApplyError {
    /// Detached nodes are routine on a live page and not worth a warning.
    pub fn is_benign(&self) -> bool {
        matches!(self, ApplyError::Detached(_))
    }
}
