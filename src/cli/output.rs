use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use action_applier::ApplyOutcome;
use calmfeed_scheduler::ModerationEvent;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Serialized form of `value`, or `None` when the caller prints its own
/// human summary.
pub fn render<T: Serialize>(format: &OutputFormat, value: &T) -> Result<Option<String>> {
    match format {
        OutputFormat::Human => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
    }
}

/// One streamed record: a human line, a compact JSON line, or a YAML document
/// opened with `---`.
pub fn render_stream<T: Serialize>(
    format: &OutputFormat,
    value: &T,
    human: impl FnOnce() -> String,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human()),
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::Yaml => {
            let body = serde_yaml::to_string(value)?;
            Ok(format!("---\n{}", body.trim_end()))
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DecisionRow {
    pub cycle: usize,
    pub node: String,
    pub user_id: String,
    pub user_name: String,
    pub verdict: String,
    pub score: Option<f64>,
    pub applied: Option<&'static str>,
}

impl DecisionRow {
    pub fn from_event(cycle: usize, event: &ModerationEvent) -> Self {
        Self {
            cycle,
            node: event.node.to_string(),
            user_id: event.author.user_id.clone(),
            user_name: event.author.user_name.clone(),
            verdict: event.verdict.kind.to_string(),
            score: event.verdict.score,
            applied: event.applied.map(outcome_label),
        }
    }

    pub fn human_line(&self) -> String {
        let score = match self.score {
            Some(score) => format!("{score:.3}"),
            None => "fallback".to_string(),
        };
        format!(
            "[cycle {}] {} {} ({}) → {} ({}) {}",
            self.cycle,
            self.node,
            display_or_dash(&self.user_name),
            display_or_dash(&self.user_id),
            self.verdict,
            score,
            self.applied.unwrap_or("not applied")
        )
    }
}

fn outcome_label(outcome: ApplyOutcome) -> &'static str {
    match outcome {
        ApplyOutcome::Suppressed => "suppressed",
        ApplyOutcome::AlreadySuppressed => "already_suppressed",
        ApplyOutcome::Untouched => "untouched",
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
