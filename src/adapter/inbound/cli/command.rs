//! Command-line interface definitions.
//!
//! Defines the CLI structure for the labctl application using `clap`. Each
//! lifecycle subcommand drives one experiment through the orchestrator
//! against the sandbox runtime described by the configuration file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Experiment lifecycle orchestrator CLI
#[derive(Parser, Debug)]
#[command(name = "labctl")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Print every broadcast event to stderr
    #[arg(long, global = true)]
    pub watch: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the labctl CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an experiment and print its body
    Start(NameArg),

    /// Stop an experiment and print its body
    Stop(NameArg),

    /// Start an experiment, keep it running for a while, then stop it
    Cycle(CycleArgs),

    /// Show the lifecycle status of an experiment
    Status(NameArg),
}

/// Shared argument for commands that only need an experiment name.
#[derive(Parser, Debug)]
pub struct NameArg {
    /// Experiment name
    pub name: String,
}

/// Arguments for `labctl cycle`.
#[derive(Parser, Debug)]
pub struct CycleArgs {
    /// Experiment name
    pub name: String,

    /// Milliseconds to keep the experiment running before stopping it
    #[arg(long, default_value_t = 0)]
    pub hold_ms: u64,
}
