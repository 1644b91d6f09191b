//! Train command - Train a Q-learning agent with the curriculum trainer

use std::{
    fs::File,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;
use tracing::info;

use super::{load_or_fresh, save_agent};
use crate::{
    adapters::{JsonQTableRepository, JsonStatsRepository},
    cli::output::{format_number, print_kv, print_section, print_subsection, print_tally},
    config::{StartingPlayer, TrainConfig},
    pipeline::{
        CheckpointObserver, CurriculumTrainer, Evaluator, JsonlObserver, OutcomeTally,
        ProgressObserver, TrainingOutcome,
    },
    policies::Opponent,
    ports::StatsRepository,
    q_learning::QAgent,
    shaping::RewardShaping,
    stats::{EvaluationSummary, TrainingSession, unix_now},
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    training: EvaluationSummary,
    episodes_requested: usize,
    episodes_completed: usize,
    cancelled: bool,
    final_epsilon: f64,
    q_table_size: usize,
    self_play: EvaluationSummary,
    vs_fixed: EvaluationSummary,
    eval_vs_random: Option<EvaluationSummary>,
    eval_vs_heuristic: Option<EvaluationSummary>,
    config: TrainConfig,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Trailing separator or no file name means a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// JSON training config; flags below override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Probability that an episode is played against the fixed opponent
    #[arg(long)]
    pub opponent_mix: Option<f64>,

    /// Fixed opponent used in curriculum episodes
    #[arg(long, short = 'o', value_enum)]
    pub opponent: Option<Opponent>,

    /// Which seat the learner takes
    #[arg(long, value_enum)]
    pub starting_player: Option<StartingPlayer>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use the tactical reward preset (threat bonuses, larger terminal rewards)
    #[arg(long, default_value_t = false)]
    pub tactical: bool,

    /// Learning rate α
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor γ
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Initial exploration rate
    #[arg(long)]
    pub epsilon_start: Option<f64>,

    /// Exploration floor
    #[arg(long)]
    pub epsilon_min: Option<f64>,

    /// Multiplicative exploration decay per episode
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Episodes between metrics snapshots
    #[arg(long)]
    pub snapshot_every: Option<usize>,

    /// Continue training from a saved agent (.json table or MessagePack agent)
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Output file for the trained agent (.json writes the bare Q-table)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// JSON Q-table rewritten at every snapshot
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Optional file for JSONL snapshots
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Stats file to record this session in
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Post-training evaluation games per opponent (0 to skip)
    #[arg(long, short = 'v', default_value_t = 1000)]
    pub eval_games: usize,

    /// Stop at the next episode boundary after this many seconds
    #[arg(long)]
    pub time_limit: Option<u64>,

    /// Hide the progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

impl TrainArgs {
    /// Resolve the config file and flag overrides into one validated config.
    pub fn resolve_config(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TrainConfig::default(),
        };

        if self.tactical {
            config.reward_shaping = RewardShaping::tactical();
        }
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(mix) = self.opponent_mix {
            config.opponent_mix = mix;
        }
        if let Some(opponent) = self.opponent {
            config.curriculum_opponent = opponent;
        }
        if let Some(starting) = self.starting_player {
            config.starting_player = starting;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(alpha) = self.alpha {
            config.agent.alpha = alpha;
        }
        if let Some(gamma) = self.gamma {
            config.agent.gamma = gamma;
        }
        if let Some(start) = self.epsilon_start {
            config.agent.epsilon_start = start;
        }
        if let Some(min) = self.epsilon_min {
            config.agent.epsilon_min = min;
        }
        if let Some(decay) = self.epsilon_decay {
            config.agent.epsilon_decay = decay;
        }
        if let Some(every) = self.snapshot_every {
            config.snapshot_every = every;
        }

        config.validate()?;
        Ok(config)
    }
}

fn evaluate_against(
    agent: &QAgent,
    opponent: Opponent,
    games: usize,
    config: &TrainConfig,
) -> Result<OutcomeTally> {
    let mut evaluator = Evaluator::new(games, config.starting_player);
    if let Some(seed) = config.seed {
        evaluator = evaluator.with_seed(seed.wrapping_add(1));
    }
    Ok(evaluator.evaluate(agent, &opponent)?)
}

fn print_training_result(outcome: &TrainingOutcome, requested: usize) {
    let metrics = &outcome.metrics;
    if outcome.cancelled {
        println!("\n=== Training Cancelled ===");
    } else {
        println!("\n=== Training Complete ===");
    }
    print_kv(
        "Episodes",
        &format!(
            "{} / {}",
            format_number(metrics.episodes_completed),
            format_number(requested)
        ),
    );
    print_tally(&metrics.overall());
    print_kv("Final epsilon", &format!("{:.4}", metrics.final_epsilon));
    print_kv("Q-table states", &format_number(metrics.q_table_size));

    print_subsection("Self-play episodes");
    print_tally(&metrics.self_play);
    print_subsection("Fixed-opponent episodes");
    print_tally(&metrics.vs_fixed);
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.resolve_config()?;

    let agent = match &args.resume {
        Some(path) => load_or_fresh(path, config.agent)?,
        None => QAgent::new(config.agent),
    };

    print_section("Q-learning Training");
    print_kv("Episodes", &format_number(config.episodes));
    print_kv("Opponent mix", &format!("{:.2}", config.opponent_mix));
    print_kv("Curriculum opponent", &config.curriculum_opponent.to_string());
    print_kv("Starting player", &format!("{:?}", config.starting_player));
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }
    if agent.state_count() > 0 {
        print_kv(
            "Resumed states",
            &format!(
                "{} ({} episodes)",
                format_number(agent.state_count()),
                agent.episodes_decayed()
            ),
        );
    }

    let mut trainer = CurriculumTrainer::new(config.clone())?;
    if !args.quiet {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        trainer = trainer.with_observer(Box::new(observer));
    }
    if let Some(path) = &args.checkpoint {
        trainer = trainer.with_observer(Box::new(CheckpointObserver::new(
            JsonQTableRepository::new(),
            path.clone(),
        )));
    }

    if let Some(seconds) = args.time_limit {
        let token = trainer.cancellation_token();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            token.cancel();
        });
    }

    let outcome = trainer.train_agent(agent)?;
    print_training_result(&outcome, config.episodes);

    let (eval_random, eval_heuristic) = if args.eval_games > 0 {
        println!("\n=== Post-Training Evaluation ===");
        let random = evaluate_against(&outcome.agent, Opponent::Random, args.eval_games, &config)?;
        let heuristic = evaluate_against(
            &outcome.agent,
            Opponent::Heuristic,
            args.eval_games,
            &config,
        )?;
        print_subsection("vs random");
        print_tally(&random);
        print_subsection("vs heuristic");
        print_tally(&heuristic);
        (Some(random), Some(heuristic))
    } else {
        (None, None)
    };

    if let Some(path) = &args.output {
        save_agent(&outcome.agent, path)?;
        println!("\n✓ Agent saved to: {}", path.display());
    }

    if let Some(path) = &args.stats {
        let repo = JsonStatsRepository::new(path);
        let mut record = repo
            .load_stats()
            .with_context(|| format!("Failed to read stats {}", path.display()))?;
        let run = record.record_training_session(
            TrainingSession {
                config: &config,
                metrics: &outcome.metrics,
                cancelled: outcome.cancelled,
                eval_vs_random: eval_random.as_ref(),
                eval_vs_heuristic: eval_heuristic.as_ref(),
            },
            unix_now(),
        );
        info!(run_id = run.run_id, path = %path.display(), "training session recorded");
        repo.save_stats(&record)?;
    }

    if let Some(raw) = &args.summary {
        let summary_path = sanitize_summary_path(raw);
        if let Some(parent) = summary_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let metrics = &outcome.metrics;
        let summary = TrainingSummaryFile {
            training: EvaluationSummary::from(&metrics.overall()),
            episodes_requested: config.episodes,
            episodes_completed: metrics.episodes_completed,
            cancelled: outcome.cancelled,
            final_epsilon: metrics.final_epsilon,
            q_table_size: metrics.q_table_size,
            self_play: EvaluationSummary::from(&metrics.self_play),
            vs_fixed: EvaluationSummary::from(&metrics.vs_fixed),
            eval_vs_random: eval_random.as_ref().map(EvaluationSummary::from),
            eval_vs_heuristic: eval_heuristic.as_ref().map(EvaluationSummary::from),
            config,
        };

        let file = File::create(&summary_path)
            .with_context(|| format!("Failed to create {}", summary_path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> TrainArgs {
        TrainArgs::parse_from(std::iter::once("train").chain(args.iter().copied()))
    }

    #[test]
    fn test_summary_path_normalization() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/run")),
            PathBuf::from("out/run.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/run.JSON")),
            PathBuf::from("out/run.JSON")
        );
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--episodes",
            "50",
            "--opponent-mix",
            "1.0",
            "--opponent",
            "random",
            "--starting-player",
            "alternate",
            "--alpha",
            "0.4",
            "--tactical",
        ])
        .resolve_config()
        .unwrap();

        assert_eq!(config.episodes, 50);
        assert_eq!(config.opponent_mix, 1.0);
        assert_eq!(config.curriculum_opponent, Opponent::Random);
        assert_eq!(config.starting_player, StartingPlayer::Alternate);
        assert_eq!(config.agent.alpha, 0.4);
        assert_eq!(config.reward_shaping, RewardShaping::tactical());
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        assert!(parse(&["--opponent-mix", "-0.5"]).resolve_config().is_err());
        assert!(parse(&["--episodes", "0"]).resolve_config().is_err());
    }
}
