//! CLI argument parsing for the drift daemon.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Topic Drift Daemon
///
/// Flags conversation topics that drifted from their title and proposes a
/// better title to the author.
#[derive(Parser, Debug)]
#[command(name = "drift-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/topic-drift/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the drift heuristic on a title and messages (no LLM call)
    Check {
        /// Current topic title
        #[arg(short, long)]
        title: String,

        /// Newly sent message
        #[arg(short, long)]
        message: String,

        /// Earlier messages in the topic, oldest first (repeatable)
        #[arg(long = "history")]
        history: Vec<String>,
    },

    /// Ask the configured LLM for a title
    Suggest {
        /// Current topic title
        #[arg(short, long)]
        title: String,

        /// Topic messages, oldest first (repeatable)
        #[arg(short, long = "message", required = true)]
        messages: Vec<String>,
    },

    /// Feed JSON-lines events through the worker pool
    Replay {
        /// Store fixture: {"streams": [...], "messages": [...]}
        #[arg(short, long)]
        store: PathBuf,

        /// Events file, one JSON event per line (default: stdin)
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Override worker concurrency
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print the effective configuration
    Config,
}
