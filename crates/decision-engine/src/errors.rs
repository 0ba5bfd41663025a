use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("scorer failed: {0}")]
    Failed(String),
    #[error("scorer timed out after {0:?}")]
    Timeout(Duration),
    #[error("scorer panicked: {0}")]
    Panicked(String),
    #[error("scorer returned a non-finite score: {0}")]
    NonFinite(f64),
    #[error("lexicon error: {0}")]
    Lexicon(String),
}

impl ScoreError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
