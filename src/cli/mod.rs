pub mod commands;
pub mod env;
pub mod output;
pub mod policy;
pub mod runtime;
pub mod scan;
pub mod score;
pub mod watch;

use anyhow::Result;
use tracing::{debug, error, info};

pub use commands::Commands;
pub use env::CliArgs;
pub use policy::{cmd_policy, PolicyArgs};
pub use scan::{cmd_scan, ScanArgs};
pub use score::{cmd_score, ScoreArgs};
pub use watch::{cmd_watch, WatchArgs};

use runtime::{init_logging, load_local_env_overrides, load_policy};

pub async fn run(cli: CliArgs) -> Result<()> {
    init_logging(&cli.log_level, cli.debug)?;
    load_local_env_overrides();

    info!("Starting calmfeed v{}", env!("CARGO_PKG_VERSION"));

    let loaded = load_policy(cli.config.as_ref(), &cli.overrides)?;
    let policy = &loaded.snapshot;

    let result = match cli.command {
        Commands::Scan(args) => cmd_scan(args, policy, &cli.output).await,
        Commands::Watch(args) => cmd_watch(args, policy, &cli.output).await,
        Commands::Score(args) => cmd_score(args, policy, &cli.output).await,
        Commands::Policy(args) => cmd_policy(args, &loaded, &cli.output).await,
    };

    match result {
        Ok(()) => {
            debug!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {err:?}");
            Err(err)
        }
    }
}
