//! Stats command - Show or reset the persisted statistics

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::JsonStatsRepository,
    cli::output::{format_number, format_percent, print_kv, print_section, print_subsection},
    ports::StatsRepository,
    stats::{EvaluationSummary, PlayStats, TrainingRunRecord},
};

#[derive(Parser, Debug)]
#[command(about = "Show training statistics")]
pub struct StatsArgs {
    /// Stats file
    #[arg(long, default_value = "stats.json")]
    pub stats: PathBuf,

    /// Show only the most recent runs
    #[arg(long, short = 'n', default_value_t = 10)]
    pub last: usize,

    /// Show a single run by id
    #[arg(long)]
    pub run: Option<u64>,

    /// Clear all training statistics
    #[arg(long, default_value_t = false)]
    pub reset: bool,

    /// Clear the human-vs-agent game statistics
    #[arg(long, default_value_t = false)]
    pub reset_play: bool,
}

fn format_eval(summary: Option<&EvaluationSummary>) -> String {
    match summary {
        Some(s) => format!(
            "W {} / D {} / L {} of {}",
            format_percent(s.win_rate),
            format_percent(s.draw_rate),
            format_percent(s.loss_rate),
            format_number(s.games)
        ),
        None => "-".to_string(),
    }
}

fn print_run(run: &TrainingRunRecord) {
    print_subsection(&format!("Run {}", run.run_id));
    print_kv("Finished at", &run.finished_at.to_string());
    print_kv(
        "Episodes",
        &format!(
            "{} / {}{}",
            format_number(run.episodes_completed),
            format_number(run.episodes_requested),
            if run.cancelled { " (cancelled)" } else { "" }
        ),
    );
    print_kv("Opponent mix", &format!("{:.2}", run.opponent_mix));
    print_kv("Final epsilon", &format!("{:.4}", run.final_epsilon));
    print_kv("Q-table states", &format_number(run.q_table_size));
    print_kv("Training", &format_eval(Some(&run.training)));
    print_kv("vs random", &format_eval(run.eval_vs_random.as_ref()));
    print_kv("vs heuristic", &format_eval(run.eval_vs_heuristic.as_ref()));
}

fn print_play(play: &PlayStats) {
    print_section("Human vs Trained");
    print_kv("Games", &play.games.to_string());
    print_kv("Draws", &play.draws.to_string());
    for (name, side) in [("Human wins", play.human), ("Agent wins", play.trained)] {
        print_kv(
            name,
            &format!(
                "{} ({} starting, {} second)",
                side.wins, side.wins_started, side.wins_second
            ),
        );
    }
    print_kv("Online learning", &play.online_learning_games.to_string());
}

pub fn execute(args: StatsArgs) -> Result<()> {
    let repo = JsonStatsRepository::new(&args.stats);
    let mut record = repo
        .load_stats()
        .with_context(|| format!("Failed to read stats {}", args.stats.display()))?;

    if args.reset || args.reset_play {
        if args.reset {
            record.reset_training();
            println!("Training statistics reset in {}", args.stats.display());
        }
        if args.reset_play {
            record.reset_play();
            println!("Play statistics reset in {}", args.stats.display());
        }
        repo.save_stats(&record)?;
        return Ok(());
    }

    if let Some(id) = args.run {
        let run = record
            .run(id)
            .with_context(|| format!("No training run with id {id}"))?;
        print_run(run);
        return Ok(());
    }

    let training = &record.training;
    print_section("Training Statistics");
    print_kv("Sessions", &training.sessions.to_string());
    print_kv("Total episodes", &training.total_episodes.to_string());
    print_kv(
        "Last trained",
        &training
            .last_trained
            .map_or_else(|| "never".to_string(), |t| t.to_string()),
    );
    print_kv("Last run size", &format_number(training.last_train_size));
    print_kv("Q-table states", &format_number(training.q_table_size));
    print_kv(
        "Last evaluation",
        &format_eval(training.last_evaluation.as_ref()),
    );

    for run in record.runs_newest_first().take(args.last) {
        print_run(run);
    }

    if record.play.human_vs_trained.games > 0 {
        print_play(&record.play.human_vs_trained);
    }

    Ok(())
}
