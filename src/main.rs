use anyhow::Result;
use clap::Parser;

use calmfeed_cli::cli::{self, CliArgs};

#[tokio::main]
async fn main() -> Result<()> {
    cli::run(CliArgs::parse()).await
}
