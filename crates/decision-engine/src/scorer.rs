use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ScoreError;
use crate::lexicon::Lexicon;

/// Sentiment collaborator. Higher is more positive; the practical range is
/// about -5..=5. Must be deterministic for identical input.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, tokens: &[String]) -> Result<f64, ScoreError>;
}

#[async_trait]
impl<S> SentimentScorer for Arc<S>
where
    S: SentimentScorer + ?Sized,
{
    async fn score(&self, tokens: &[String]) -> Result<f64, ScoreError> {
        (**self).score(tokens).await
    }
}

/// Average polarity over all tokens; unknown words count as zero. Tokens are
/// matched by stem through the [`Lexicon`].
#[derive(Clone, Debug)]
pub struct LexiconScorer {
    lexicon: Lexicon,
}

impl LexiconScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn score_tokens(&self, tokens: &[String]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }
        let total: f64 = tokens
            .iter()
            .filter_map(|token| self.lexicon.polarity(token))
            .sum();
        total / tokens.len() as f64
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    async fn score(&self, tokens: &[String]) -> Result<f64, ScoreError> {
        Ok(self.score_tokens(tokens))
    }
}
