//! qttt CLI - Train and evaluate tabular Q-learning Tic-Tac-Toe agents
//!
//! Subcommands:
//! - `train`: curriculum training with optional resume, evaluation and stats
//! - `evaluate`: greedy play against a fixed opponent
//! - `stats`: show or reset the persisted statistics
//! - `watch`: print one game move by move
//! - `play`: play against an agent, optionally letting it learn

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qttt")]
#[command(version, about = "Tabular Q-learning for Tic-Tac-Toe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent with self-play and a fixed opponent
    Train(Box<qttt::cli::commands::train::TrainArgs>),

    /// Evaluate a trained agent against a fixed opponent
    Evaluate(qttt::cli::commands::evaluate::EvaluateArgs),

    /// Show or reset training statistics
    Stats(qttt::cli::commands::stats::StatsArgs),

    /// Watch a trained agent play one game
    Watch(qttt::cli::commands::watch::WatchArgs),

    /// Play against a trained agent in the terminal
    Play(qttt::cli::commands::play::PlayArgs),
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qttt::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => qttt::cli::commands::evaluate::execute(args),
        Commands::Stats(args) => qttt::cli::commands::stats::execute(args),
        Commands::Watch(args) => qttt::cli::commands::watch::execute(args),
        Commands::Play(args) => qttt::cli::commands::play::execute(args),
    }
}
