use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use calmfeed_policy_center::{PolicySnapshot, PolicyView};
use decision_engine::WordTokenizer;

use super::output::{render, OutputFormat};
use crate::app_context::build_engine;

#[derive(Args, Clone, Debug)]
pub struct ScoreArgs {
    /// Text to score
    pub text: String,

    /// YAML word → polarity table replacing the built-in lexicon
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ScoreReport {
    pub tokens: Vec<String>,
    pub score: f64,
    pub threshold: f64,
    pub verdict: String,
}

pub async fn cmd_score(args: ScoreArgs, policy: &PolicySnapshot, format: &OutputFormat) -> Result<()> {
    let view = PolicyView::from(policy.clone());
    let engine = build_engine(&view, args.lexicon.as_deref())?;
    let score = engine
        .score_text(&args.text)
        .await
        .context("Failed to score text")?;
    let report = ScoreReport {
        tokens: WordTokenizer::new().tokenize(&args.text),
        score,
        threshold: engine.config().block_threshold,
        verdict: engine.classify(score).kind.to_string(),
    };

    match render(format, &report)? {
        Some(rendered) => println!("{rendered}"),
        None => {
            println!("Tokens: {}", report.tokens.join(" "));
            println!("Score: {:.3} (block at or below {})", report.score, report.threshold);
            println!("Verdict: {}", report.verdict);
        }
    }
    Ok(())
}
