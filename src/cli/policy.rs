use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use calmfeed_policy_center::PolicySnapshot;

use super::output::{render, OutputFormat};
use super::runtime::LoadedPolicy;

#[derive(Args, Clone, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PolicyCommand {
    /// Print the resolved policy
    Show,
}

pub async fn cmd_policy(args: PolicyArgs, loaded: &LoadedPolicy, format: &OutputFormat) -> Result<()> {
    match args.command {
        PolicyCommand::Show => {
            let snapshot = &loaded.snapshot;
            let payload = json!({
                "source_file": loaded.path.as_ref().map(|path| path.display().to_string()),
                "policy": snapshot,
            });
            match render(format, &payload)? {
                Some(rendered) => println!("{rendered}"),
                None => print_human(snapshot),
            }
        }
    }
    Ok(())
}

fn print_human(snapshot: &PolicySnapshot) {
    println!("Policy Revision: {}", snapshot.rev);
    println!();
    let rows = [
        (
            "scheduler.interval_ms",
            snapshot.scheduler.interval_ms.to_string(),
        ),
        (
            "scheduler.max_in_flight",
            snapshot.scheduler.max_in_flight.to_string(),
        ),
        (
            "decision.block_threshold",
            snapshot.decision.block_threshold.to_string(),
        ),
        (
            "decision.scorer_timeout_ms",
            snapshot.decision.scorer_timeout_ms.to_string(),
        ),
        (
            "decision.on_scorer_error",
            snapshot.decision.on_scorer_error.to_string(),
        ),
        (
            "actions.suppression_filter",
            snapshot.actions.suppression_filter.clone(),
        ),
    ];
    for (path, value) in rows {
        let source = snapshot
            .source_of(path)
            .map(|source| format!("{source:?}").to_ascii_lowercase())
            .unwrap_or_else(|| "unknown".into());
        println!("{path:<28} {value:<12} ({source})");
    }
}
