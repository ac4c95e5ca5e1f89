//! Topic Drift Daemon
//!
//! # Usage
//!
//! ```bash
//! drift-daemon check --title TITLE --message TEXT [--history TEXT]...
//! drift-daemon suggest --title TITLE --message TEXT...
//! drift-daemon replay --store FIXTURE.json [--events EVENTS.jsonl] [--concurrency N]
//! drift-daemon config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/topic-drift/config.toml)
//! 3. `--config` file
//! 4. Environment variables (DRIFT_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use drift_daemon::{
    handle_check, handle_config, handle_replay, handle_suggest, init_tracing, load_settings, Cli,
    Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_tracing(&settings.log_level)?;

    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Check {
            title,
            message,
            history,
        } => {
            handle_check(&settings, &title, &message, &history, &mut stdout)?;
        }
        Commands::Suggest { title, messages } => {
            handle_suggest(&settings, &title, &messages, &mut stdout).await?;
        }
        Commands::Replay {
            store,
            events,
            concurrency,
        } => {
            handle_replay(settings, &store, events.as_deref(), concurrency).await?;
        }
        Commands::Config => {
            handle_config(&settings, &mut stdout)?;
        }
    }

    Ok(())
}
