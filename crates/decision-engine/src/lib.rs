//! Maps extracted content to an allow/block [`Verdict`] through a sentiment
//! scorer.
//!
//! [`Verdict`]: calmfeed_core_types::Verdict

pub mod engine;
pub mod errors;
pub mod lexicon;
pub mod scorer;
pub mod tokenizer;

pub use engine::{DecisionConfig, DecisionEngine, ScorerFailurePolicy, DEFAULT_BLOCK_THRESHOLD};
pub use errors::ScoreError;
pub use lexicon::Lexicon;
pub use scorer::{LexiconScorer, SentimentScorer};
pub use tokenizer::WordTokenizer;
