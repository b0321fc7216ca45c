//! Command-line interface for whoami_oracle.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Who Am I? - guess-the-character game driven by an LLM oracle
#[derive(Parser, Debug)]
#[command(name = "whoami_oracle")]
#[command(about = "Terminal guess-the-character game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run (defaults to play)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play the game in the terminal UI
    Play {
        /// Path to a TOML config file (provider, model, scores path)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Do not persist win scores for this run
        #[arg(long)]
        no_persist: bool,
    },

    /// Print recorded win scores
    Scores {
        /// Path to a TOML config file (provider, model, scores path)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
