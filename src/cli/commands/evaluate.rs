//! Evaluate command - Play a trained agent against a fixed opponent

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use super::load_trained_agent;
use crate::{
    adapters::JsonStatsRepository,
    cli::output::{format_number, format_percent, print_kv, print_section, print_tally},
    config::StartingPlayer,
    pipeline::{Evaluator, MultiRunEvaluation},
    policies::Opponent,
    ports::StatsRepository,
    stats::EvaluationSummary,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent")]
pub struct EvaluateArgs {
    /// Path to the trained agent (.json table or MessagePack agent)
    pub agent: PathBuf,

    /// Opponent to evaluate against
    #[arg(long, short = 'o', value_enum, default_value = "random")]
    pub opponent: Opponent,

    /// Number of evaluation games per run
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Which seat the agent takes
    #[arg(long, value_enum, default_value = "agent")]
    pub starting_player: StartingPlayer,

    /// Repeat the evaluation with consecutive seeds and report mean and spread
    #[arg(long)]
    pub runs: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Record the result as the latest evaluation in this stats file
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvaluationExport {
    agent_file: String,
    opponent: Opponent,
    starting_player: StartingPlayer,
    seed: Option<u64>,
    agent_episodes: u64,
    agent_states: usize,
    result: EvaluationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    multirun: Option<MultiRunEvaluation>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    println!("Loading trained agent from: {}", args.agent.display());
    let agent = load_trained_agent(&args.agent)?;

    print_section("Evaluation");
    print_kv("Opponent", &args.opponent.to_string());
    print_kv("Starting player", &format!("{:?}", args.starting_player));
    print_kv("Agent states", &format_number(agent.state_count()));
    print_kv("Episodes trained", &agent.episodes_decayed().to_string());
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut evaluator = Evaluator::new(args.games, args.starting_player);
    if let Some(seed) = args.seed {
        evaluator = evaluator.with_seed(seed);
    }

    let tally = evaluator.evaluate(&agent, &args.opponent)?;
    println!("\n=== Evaluation Results ===");
    print_tally(&tally);

    let multirun = match args.runs {
        Some(runs) => {
            let summary = evaluator.evaluate_multirun(&agent, &args.opponent, runs)?;
            println!("\n=== Multi-run Summary ({runs} runs) ===");
            for (name, rate) in [
                ("Win rate", summary.win_rate),
                ("Draw rate", summary.draw_rate),
                ("Loss rate", summary.loss_rate),
            ] {
                print_kv(
                    name,
                    &format!(
                        "{} ± {}",
                        format_percent(rate.mean),
                        format_percent(rate.std_dev)
                    ),
                );
            }
            Some(summary)
        }
        None => None,
    };

    if let Some(path) = &args.stats {
        let repo = JsonStatsRepository::new(path);
        let mut record = repo
            .load_stats()
            .with_context(|| format!("Failed to read stats {}", path.display()))?;
        record.record_evaluation(&tally);
        repo.save_stats(&record)?;
    }

    if let Some(path) = &args.export {
        let export = EvaluationExport {
            agent_file: args.agent.display().to_string(),
            opponent: args.opponent,
            starting_player: args.starting_player,
            seed: args.seed,
            agent_episodes: agent.episodes_decayed(),
            agent_states: agent.state_count(),
            result: EvaluationSummary::from(&tally),
            multirun,
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &export)?;
        println!("\n✓ Results exported to: {}", path.display());
    }

    Ok(())
}
