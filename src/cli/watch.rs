use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use calmfeed_policy_center::{PolicySnapshot, PolicyView};
use calmfeed_scheduler::metrics as scheduler_metrics;

use super::output::{render_stream, DecisionRow, OutputFormat};
use crate::app_context::ModerationContext;

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    /// Saved page to moderate
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Host the page was served from; selects the site adapter
    #[arg(long, default_value = "www.facebook.com")]
    pub host: String,

    /// YAML word → polarity table replacing the built-in lexicon
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long, value_name = "SECS")]
    pub stop_after: Option<u64>,
}

pub async fn cmd_watch(args: WatchArgs, policy: &PolicySnapshot, format: &OutputFormat) -> Result<()> {
    let mut context = ModerationContext::from_html_file(
        PolicyView::from(policy.clone()),
        &args.html,
        &args.host,
        args.lexicon.as_deref(),
    )
    .await?;

    let mut events = context.scheduler.subscribe();
    let format = format.clone();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let row = DecisionRow::from_event(0, &event);
                    match render_stream(&format, &row, || row.human_line()) {
                        Ok(record) => println!("{record}"),
                        Err(err) => warn!("failed to encode event: {err}"),
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let stop_after = args.stop_after;
    tokio::spawn(async move {
        match stop_after {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                info!("Moderating {}. Press Ctrl+C to exit.", args.html.display());
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!("failed to listen for Ctrl+C: {err}");
                }
            }
        }
        trigger.cancel();
    });

    context.scheduler.run(shutdown).await;
    drop(context);
    printer.await.context("event printer failed")?;

    let metrics = scheduler_metrics::snapshot();
    info!(
        cycles = metrics.cycles,
        allowed = metrics.allowed,
        blocked = metrics.blocked,
        scorer_failures = metrics.scorer_failures,
        "watch finished"
    );
    Ok(())
}
