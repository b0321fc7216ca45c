//! Who Am I? - terminal guess-the-character game.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use whoami_oracle::{GameConfig, GameMaster, JsonScoreStore, MemoryScoreStore, best, run_game};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Scores { config }) => run_scores(config),
        Some(Command::Play { config, no_persist }) => run_play(config, no_persist).await,
        None => run_play(None, false).await,
    }
}

/// Runs the game in the terminal UI.
async fn run_play(config: Option<PathBuf>, no_persist: bool) -> Result<()> {
    let config = GameConfig::load(config.as_deref())?;
    let oracle = config.create_oracle()?;

    if no_persist {
        run_game(GameMaster::new(oracle, MemoryScoreStore::new())).await
    } else {
        let store = JsonScoreStore::new(config.scores_path().clone());
        run_game(GameMaster::new(oracle, store)).await
    }
}

/// Prints the recorded win scores.
fn run_scores(config: Option<PathBuf>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = GameConfig::load(config.as_deref())?;
    let store = JsonScoreStore::new(config.scores_path().clone());
    let scores = whoami_oracle::ScoreStore::load(&store);

    if scores.is_empty() {
        println!("No wins recorded yet.");
        return Ok(());
    }

    println!("Wins: {}", scores.len());
    if let Some(b) = best(&scores) {
        println!("Best: guessed in {} questions", b);
    }
    println!("History (oldest first): {:?}", scores);
    Ok(())
}
