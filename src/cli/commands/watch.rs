//! Watch command - Print one greedy game move by move

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use super::load_trained_agent;
use crate::{
    pipeline::training::build_rng,
    policies::Opponent,
    ports::Policy,
    tictactoe::{Environment, GameOutcome, Player},
};

#[derive(Parser, Debug)]
#[command(about = "Watch a trained agent play one game")]
pub struct WatchArgs {
    /// Path to the trained agent (.json table or MessagePack agent)
    pub agent: PathBuf,

    /// Opponent to play against
    #[arg(long, short = 'o', value_enum, default_value = "heuristic")]
    pub opponent: Opponent,

    /// Let the opponent play X and move first
    #[arg(long, default_value_t = false)]
    pub agent_second: bool,

    /// Random seed for the opponent
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: WatchArgs) -> Result<()> {
    let agent = load_trained_agent(&args.agent)?;
    let seat = if args.agent_second { Player::O } else { Player::X };
    let env = Environment::new();
    let mut rng = build_rng(args.seed);

    println!("Agent plays {seat}, {} plays {}", args.opponent, seat.opponent());

    let mut board = env.reset();
    let mut player = Player::X;
    let outcome = loop {
        let legal = board.legal_actions();
        let policy: &dyn Policy = if player == seat {
            &agent
        } else {
            &args.opponent
        };
        let action = policy.select_action(&board, player, &legal, &mut rng)?;

        let transition = env.step(&board, action, player)?;
        println!("\n{player} -> {action}\n{}", transition.board);
        if let Some(outcome) = transition.outcome() {
            break outcome;
        }
        board = transition.board;
        player = player.opponent();
    };

    match outcome {
        GameOutcome::Win(winner) if winner == seat => println!("\nAgent wins"),
        GameOutcome::Win(_) => println!("\n{} wins", args.opponent),
        GameOutcome::Draw => println!("\nDraw"),
    }
    Ok(())
}
