//! Play command - A person against a trained agent in the terminal

use std::{
    cell::RefCell,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::{Rng, rngs::StdRng};
use tracing::info;

use super::{load_trained_agent, save_agent};
use crate::{
    Error,
    adapters::JsonStatsRepository,
    pipeline::{HumanMatch, training::build_rng},
    ports::{Policy, StatsRepository},
    shaping::RewardShaping,
    tictactoe::{Board, GameOutcome, Player},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SeatChoice {
    X,
    O,
    Random,
}

#[derive(Parser, Debug)]
#[command(about = "Play against a trained agent")]
pub struct PlayArgs {
    /// Path to the trained agent (.json table or MessagePack agent)
    pub agent: PathBuf,

    /// Your side; X always moves first
    #[arg(long, value_enum, default_value = "random")]
    pub seat: SeatChoice,

    /// Number of games to play
    #[arg(long, short = 'g', default_value_t = 1)]
    pub games: usize,

    /// Let the agent learn from each game and save it afterwards
    #[arg(long, default_value_t = false)]
    pub online_learning: bool,

    /// Use tactical reward shaping for online learning
    #[arg(long, default_value_t = false)]
    pub tactical: bool,

    /// Record results in this stats file
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Random seed for seat selection
    #[arg(long)]
    pub seed: Option<u64>,
}

/// A person typing cell numbers, one per line.
///
/// `q` or end of input abandons the game.
pub struct TerminalPlayer<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> TerminalPlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn say(&self, text: &str) -> crate::Result<()> {
        let mut output = self.output.borrow_mut();
        writeln!(output, "{text}")?;
        output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Policy for TerminalPlayer<R, W> {
    fn select_action(
        &self,
        _board: &Board,
        player: Player,
        legal: &[usize],
        _rng: &mut StdRng,
    ) -> crate::Result<usize> {
        let mut input = self.input.borrow_mut();
        let mut output = self.output.borrow_mut();
        loop {
            write!(output, "{player} to move, free cells {legal:?} (q quits): ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(Error::MatchAbandoned);
            }
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                return Err(Error::MatchAbandoned);
            }
            match line.parse::<usize>() {
                Ok(cell) if legal.contains(&cell) => return Ok(cell),
                _ => writeln!(output, "'{line}' is not a free cell")?,
            }
        }
    }

    fn name(&self) -> &str {
        "human"
    }
}

fn pick_seat(choice: SeatChoice, rng: &mut StdRng) -> Player {
    match choice {
        SeatChoice::X => Player::X,
        SeatChoice::O => Player::O,
        SeatChoice::Random if rng.random_bool(0.5) => Player::X,
        SeatChoice::Random => Player::O,
    }
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let stdin = io::stdin();
    execute_with(args, stdin.lock(), io::stdout())
}

/// Run the command against any line source and sink.
pub fn execute_with<R: BufRead, W: Write>(args: PlayArgs, input: R, output: W) -> Result<()> {
    let mut agent = load_trained_agent(&args.agent)?;
    let shaping = if args.tactical {
        RewardShaping::tactical()
    } else {
        RewardShaping::default()
    };
    let stats = args.stats.as_ref().map(JsonStatsRepository::new);
    let mut rng = build_rng(args.seed);
    let human = TerminalPlayer::new(input, output);

    for game in 1..=args.games {
        let seat = pick_seat(args.seat, &mut rng);
        human.say(&format!("\nGame {game}: you play {seat}\n{}", Board::new()))?;

        let mut session = HumanMatch::new(&mut agent, seat);
        if args.online_learning {
            session = session.with_online_learning(shaping);
        }
        let played = session.play(&human, &mut rng, |player, action, board| {
            human.say(&format!("\n{player} -> {action}\n{board}"))
        });
        let report = match played {
            Ok(report) => report,
            Err(Error::MatchAbandoned) => {
                human.say("\nGame abandoned")?;
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let verdict = match report.outcome {
            GameOutcome::Draw => "Draw",
            GameOutcome::Win(winner) if winner == seat => "You win",
            GameOutcome::Win(_) => "Agent wins",
        };
        human.say(&format!("\n{verdict}"))?;

        if args.online_learning {
            save_agent(&agent, &args.agent)?;
            info!(
                game,
                updates = report.updates,
                states = agent.state_count(),
                path = %args.agent.display(),
                "saved agent after online learning"
            );
        }

        if let Some(repo) = &stats {
            let mut record = repo
                .load_stats()
                .with_context(|| format!("Failed to read stats {}", repo.path().display()))?;
            record.record_play(&report, args.online_learning);
            repo.save_stats(&record)?;
        }
    }

    Ok(())
}
