//! Drift daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (check, suggest, replay, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    build_pipeline, build_suggester, handle_check, handle_config, handle_replay, handle_suggest,
    init_tracing, load_settings, replay_events,
};
