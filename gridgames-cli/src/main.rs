//! GRIDGAMES CLI - Command-line interface
//!
//! Commands:
//! - selfplay: Tic-Tac-Toe AI against a scripted X player
//! - slide: Automated 2048 sessions
//! - solve: Print the AI's move for a Tic-Tac-Toe board

mod selfplay_cmd;
mod slide_cmd;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gridgames_core::tictactoe::Board;
use gridgames_core::{GameResult, Mark, MinimaxAI, SearchConfig};

#[derive(Parser)]
#[command(name = "gridgames")]
#[command(about = "Tic-Tac-Toe minimax and 2048 engines")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play Tic-Tac-Toe games between the AI and a scripted opponent
    Selfplay(selfplay_cmd::SelfplayArgs),
    /// Run automated 2048 games
    Slide(slide_cmd::SlideArgs),
    /// Print the AI's chosen move for a board such as "X.O/.X./..."
    Solve {
        #[arg(long)]
        board: String,
        /// Score top-level moves in parallel
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Selfplay(args) => selfplay_cmd::run(args, cli.seed),
        Commands::Slide(args) => slide_cmd::run(args, cli.seed),
        Commands::Solve { board, parallel } => solve(&board, parallel),
    }
}

/// Print the AI's move, or the result when the board is already decided
fn solve(board: &str, parallel: bool) -> Result<()> {
    let board: Board = board
        .parse()
        .with_context(|| format!("Failed to parse board: {}", board))?;

    let result = board.result();
    if result != GameResult::Ongoing {
        println!("no move: game already decided ({:?})", result);
        return Ok(());
    }

    if board.side_to_move() != Mark::Ai {
        tracing::warn!("X is to move on this board; showing O's best cell anyway");
    }

    let ai = MinimaxAI::new(SearchConfig::default().with_parallel(parallel));
    match ai.best_move(&board) {
        Some(pos) => {
            let next = board.place(pos, Mark::Ai)?;
            println!("{}", pos);
            println!("{}", next);
        }
        None => println!("no move"),
    }
    Ok(())
}
