use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::warn;

use calmfeed_policy_center::{PolicySnapshot, PolicyView};
use calmfeed_scheduler::metrics::{self as scheduler_metrics, SchedulerMetricsSnapshot};
use calmfeed_scheduler::{CycleReport, ModerationEvent};
use tokio::sync::broadcast;

use super::output::{render, DecisionRow, OutputFormat};
use crate::app_context::ModerationContext;

#[derive(Args, Clone, Debug)]
pub struct ScanArgs {
    /// Saved page to moderate
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Host the page was served from; selects the site adapter
    #[arg(long, default_value = "www.facebook.com")]
    pub host: String,

    /// Number of cycles to run (each waits for its decisions)
    #[arg(long, default_value_t = 1)]
    pub cycles: usize,

    /// YAML word → polarity table replacing the built-in lexicon
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub host: String,
    pub cycles: Vec<CycleReport>,
    pub decisions: Vec<DecisionRow>,
    pub seen: usize,
    pub metrics: SchedulerMetricsSnapshot,
}

pub async fn cmd_scan(args: ScanArgs, policy: &PolicySnapshot, format: &OutputFormat) -> Result<()> {
    let summary = scan(&args, policy).await?;
    match render(format, &summary)? {
        Some(rendered) => println!("{rendered}"),
        None => print_human(&summary),
    }
    Ok(())
}

pub async fn scan(args: &ScanArgs, policy: &PolicySnapshot) -> Result<ScanSummary> {
    let mut context = ModerationContext::from_html_file(
        PolicyView::from(policy.clone()),
        &args.html,
        &args.host,
        args.lexicon.as_deref(),
    )
    .await?;
    let mut events = context.scheduler.subscribe();

    let mut cycles = Vec::new();
    let mut decisions = Vec::new();
    for cycle in 1..=args.cycles.max(1) {
        let report = context.scheduler.run_cycle();
        context.scheduler.settle().await;
        cycles.push(report);
        drain_events(&mut events, cycle, &mut decisions);
    }

    Ok(ScanSummary {
        host: args.host.clone(),
        cycles,
        decisions,
        seen: context.scheduler.seen().len(),
        metrics: scheduler_metrics::snapshot(),
    })
}

fn drain_events(
    events: &mut broadcast::Receiver<ModerationEvent>,
    cycle: usize,
    rows: &mut Vec<DecisionRow>,
) {
    loop {
        match events.try_recv() {
            Ok(event) => rows.push(DecisionRow::from_event(cycle, &event)),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "decision events dropped from summary");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

fn print_human(summary: &ScanSummary) {
    println!("Host: {}", summary.host);
    for (idx, cycle) in summary.cycles.iter().enumerate() {
        println!(
            "Cycle {} → extracted={} skipped={} dispatched={}",
            idx + 1,
            cycle.extracted,
            cycle.skipped,
            cycle.dispatched
        );
    }
    for row in &summary.decisions {
        println!("{}", row.human_line());
    }
    println!("Allowed and remembered: {}", summary.seen);
    let metrics = &summary.metrics;
    println!(
        "Scheduler Metrics → cycles={} dispatched={} allowed={} blocked={} scorer_failures={} apply_failures={}",
        metrics.cycles,
        metrics.dispatched,
        metrics.allowed,
        metrics.blocked,
        metrics.scorer_failures,
        metrics.apply_failures
    );
}
