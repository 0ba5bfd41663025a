use calmfeed_core_types::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("node detached: {0}")]
    Detached(NodeId),
    #[error("not an element: {0}")]
    NotAnElement(NodeId),
}
