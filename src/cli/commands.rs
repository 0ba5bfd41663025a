use clap::Subcommand;

use super::policy::PolicyArgs;
use super::scan::ScanArgs;
use super::score::ScoreArgs;
use super::watch::WatchArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run a fixed number of moderation cycles over a saved page
    Scan(ScanArgs),

    /// Keep moderating a saved page until Ctrl+C
    Watch(WatchArgs),

    /// Score a piece of text and show the resulting verdict
    Score(ScoreArgs),

    /// Inspect the resolved policy and where each value came from
    Policy(PolicyArgs),
}
