use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use calmfeed_core_types::{ContentEntity, Verdict, VerdictKind};

use crate::errors::ScoreError;
use crate::scorer::SentimentScorer;
use crate::tokenizer::WordTokenizer;

/// Scores at or below this value are blocked.
pub const DEFAULT_BLOCK_THRESHOLD: f64 = 0.1;

const DEFAULT_SCORER_TIMEOUT: Duration = Duration::from_secs(2);

/// What to do when the scorer errors out or times out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerFailurePolicy {
    #[default]
    FailOpen,
    FailClosed,
}

impl ScorerFailurePolicy {
    pub fn fallback(self) -> Verdict {
        match self {
            ScorerFailurePolicy::FailOpen => Verdict::fallback(VerdictKind::Allow),
            ScorerFailurePolicy::FailClosed => Verdict::fallback(VerdictKind::Block),
        }
    }
}

impl fmt::Display for ScorerFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerFailurePolicy::FailOpen => f.write_str("fail_open"),
            ScorerFailurePolicy::FailClosed => f.write_str("fail_closed"),
        }
    }
}

impl FromStr for ScorerFailurePolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_open" | "open" | "allow" => Ok(ScorerFailurePolicy::FailOpen),
            "fail_closed" | "closed" | "block" => Ok(ScorerFailurePolicy::FailClosed),
            other => Err(format!("unknown scorer failure policy: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DecisionConfig {
    pub block_threshold: f64,
    pub scorer_timeout: Duration,
    pub on_scorer_error: ScorerFailurePolicy,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            block_threshold: DEFAULT_BLOCK_THRESHOLD,
            scorer_timeout: DEFAULT_SCORER_TIMEOUT,
            on_scorer_error: ScorerFailurePolicy::default(),
        }
    }
}

pub struct DecisionEngine {
    scorer: Arc<dyn SentimentScorer>,
    tokenizer: WordTokenizer,
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self::with_config(scorer, DecisionConfig::default())
    }

    pub fn with_config(scorer: Arc<dyn SentimentScorer>, config: DecisionConfig) -> Self {
        Self {
            scorer,
            tokenizer: WordTokenizer::new(),
            config,
        }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Threshold mapping; inclusive on the block side.
    pub fn classify(&self, score: f64) -> Verdict {
        if score <= self.config.block_threshold {
            Verdict::block(score)
        } else {
            Verdict::allow(score)
        }
    }

    /// Tokenizes and scores `text`, bounded by the scorer timeout. A panic
    /// inside the scorer is reported as [`ScoreError::Panicked`].
    pub async fn score_text(&self, text: &str) -> Result<f64, ScoreError> {
        let tokens = self.tokenizer.tokenize(text);
        let timeout = self.config.scorer_timeout;
        let scoring = AssertUnwindSafe(self.scorer.score(&tokens)).catch_unwind();
        let score = match tokio::time::timeout(timeout, scoring).await {
            Err(_) => return Err(ScoreError::Timeout(timeout)),
            Ok(Err(payload)) => return Err(ScoreError::Panicked(panic_message(payload.as_ref()))),
            Ok(Ok(result)) => result?,
        };
        if !score.is_finite() {
            return Err(ScoreError::NonFinite(score));
        }
        Ok(score)
    }

    /// Never fails: scorer errors resolve through the failure policy.
    pub async fn decide(&self, entity: &ContentEntity) -> Verdict {
        match self.score_text(&entity.text).await {
            Ok(score) => {
                let verdict = self.classify(score);
                debug!(node = %entity.node, score, verdict = %verdict.kind, "scored content");
                verdict
            }
            Err(err) => {
                let verdict = self.config.on_scorer_error.fallback();
                warn!(
                    node = %entity.node,
                    user_name = %entity.author.user_name,
                    policy = %self.config.on_scorer_error,
                    "scorer failed: {err}"
                );
                verdict
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
