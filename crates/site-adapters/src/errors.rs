use dom_port::DomError;
use thiserror::Error;

/// Raised only while building adapters; extraction itself never fails.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("adapter pattern rejected: {0}")]
    Pattern(#[from] DomError),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
}
