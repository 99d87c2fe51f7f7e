//! Slide command - automated 2048 sessions
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), play_sessions(), report_results()
//! - Level 3: play_single_game(), pick_direction(), compute_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gridgames_core::slide::{self, Board};
use gridgames_core::{Direction, SlideConfig, SlideSession};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// How the automated player picks directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Legal direction with the largest immediate merge score
    Greedy,
    /// Uniformly random legal direction
    Random,
    /// Rotate through Left, Right, Up, Down, skipping no-ops
    Cycle,
}

#[derive(Args)]
pub struct SlideArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Direction policy
    #[arg(long, value_enum, default_value = "greedy")]
    pub policy: Policy,

    /// Session config JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Stop a game after this many accepted moves
    #[arg(long, default_value = "5000")]
    pub max_moves: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug, serde::Serialize)]
struct GameRecord {
    game_number: usize,
    score: u64,
    max_tile: u32,
    moves: u32,
    won: bool,
    finished: bool,
    board: Board,
}

/// Aggregated session results
#[derive(Clone, Debug)]
struct SlideResults {
    games: Vec<GameRecord>,
    best_score: u64,
    avg_score: f64,
    best_tile: u32,
    wins: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run slide command
///
/// 1. Load the session config (file, then --seed override)
/// 2. Play every game with the chosen policy
/// 3. Report results
pub fn run(args: SlideArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(&args, seed)?;

    tracing::info!(
        "Starting 2048 run: {} games, policy={:?}, win tile {}",
        args.games,
        args.policy,
        config.win_tile
    );

    let results = play_sessions(&config, &args);

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config from file (or defaults) with the CLI seed taking precedence
fn load_config(args: &SlideArgs, seed: Option<u64>) -> Result<SlideConfig> {
    let config = match &args.config {
        Some(path) => SlideConfig::load(path)?,
        None => SlideConfig::default(),
    };
    Ok(match seed {
        Some(s) => config.with_seed(s),
        None => config,
    })
}

/// Play all games; game `i` uses seed `base + i` when a seed is set
fn play_sessions(config: &SlideConfig, args: &SlideArgs) -> SlideResults {
    let mut policy_rng = match config.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s.wrapping_mul(31).wrapping_add(7)),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        let mut game_config = config.clone();
        game_config.seed = config.seed.map(|s| s.wrapping_add(game_num as u64));

        let record = play_single_game(
            SlideSession::new(game_config),
            args.policy,
            args.max_moves,
            game_num + 1,
            &mut policy_rng,
        );

        tracing::info!(
            "Game {}: score {}, max tile {} ({} moves{})",
            record.game_number,
            record.score,
            record.max_tile,
            record.moves,
            if record.finished { "" } else { ", move cap hit" }
        );

        games.push(record);
    }

    compute_statistics(games)
}

/// Report results
fn report_results(results: &SlideResults, args: &SlideArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Drive one session until game over or the move cap
fn play_single_game(
    mut session: SlideSession,
    policy: Policy,
    max_moves: u32,
    game_number: usize,
    rng: &mut ChaCha8Rng,
) -> GameRecord {
    let mut turn = 0usize;

    while !session.is_over() && session.moves() < max_moves {
        let Some(direction) = pick_direction(session.board(), policy, turn, rng) else {
            break;
        };
        turn += 1;
        if session.step(direction).is_err() {
            break;
        }
    }

    GameRecord {
        game_number,
        score: session.score(),
        max_tile: session.board().max_tile(),
        moves: session.moves(),
        won: session.won(),
        finished: session.is_over(),
        board: *session.board(),
    }
}

/// Choose a legal direction, or `None` when the board is stuck
fn pick_direction(
    board: &Board,
    policy: Policy,
    turn: usize,
    rng: &mut ChaCha8Rng,
) -> Option<Direction> {
    let legal = slide::legal_directions(board);
    match policy {
        Policy::Greedy => {
            let mut best: Option<(Direction, u64)> = None;
            for d in legal {
                let (_, gained) = slide::shift(board, d);
                match best {
                    Some((_, g)) if gained <= g => {}
                    _ => best = Some((d, gained)),
                }
            }
            best.map(|(d, _)| d)
        }
        Policy::Random => legal.choose(rng).copied(),
        Policy::Cycle => (0..Direction::ALL.len())
            .map(|i| Direction::ALL[(turn + i) % Direction::ALL.len()])
            .find(|d| legal.contains(d)),
    }
}

/// Compute aggregate statistics from game records
fn compute_statistics(games: Vec<GameRecord>) -> SlideResults {
    let best_score = games.iter().map(|g| g.score).max().unwrap_or(0);
    let best_tile = games.iter().map(|g| g.max_tile).max().unwrap_or(0);
    let wins = games.iter().filter(|g| g.won).count();
    let avg_score = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.score as f64).sum::<f64>() / games.len() as f64
    };

    SlideResults {
        games,
        best_score,
        avg_score,
        best_tile,
        wins,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print results as JSON
fn print_json_results(results: &SlideResults) {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        total_games: usize,
        wins: usize,
        best_score: u64,
        avg_score: f64,
        best_tile: u32,
        games: &'a [GameRecord],
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        wins: results.wins,
        best_score: results.best_score,
        avg_score: results.avg_score,
        best_tile: results.best_tile,
        games: &results.games,
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &SlideResults) {
    println!("\n=== 2048 Results ===");
    println!("Total games: {}", results.games.len());
    println!("Reached win: {}", results.wins);
    println!("Best score:  {}", results.best_score);
    println!("Avg score:   {:.1}", results.avg_score);
    println!("Best tile:   {}", results.best_tile);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: score {} max {} in {} moves{}",
            game.game_number,
            game.score,
            game.max_tile,
            game.moves,
            if game.finished { "" } else { " (capped)" }
        );
    }
    if let Some(best) = results.games.iter().max_by_key(|g| g.score) {
        println!("\nFinal board of game {}:\n{}", best.game_number, best.board);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(policy: Policy) -> SlideArgs {
        SlideArgs {
            games: 3,
            policy,
            config: None,
            max_moves: 5000,
            json: false,
        }
    }

    #[test]
    fn test_greedy_prefers_biggest_merge() {
        let board = Board::from_cells([[2, 2, 0, 0], [0, 0, 0, 0], [8, 0, 0, 0], [8, 0, 0, 0]]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // Up/Down merge the 8s (16 points); Left/Right merge the 2s (4 points)
        assert_eq!(
            pick_direction(&board, Policy::Greedy, 0, &mut rng),
            Some(Direction::Up)
        );
    }

    #[test]
    fn test_cycle_skips_noops() {
        let board = Board::from_cells([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // Left and Up change nothing; turn 0 starts at Left and falls through to Right
        assert_eq!(
            pick_direction(&board, Policy::Cycle, 0, &mut rng),
            Some(Direction::Right)
        );
    }

    #[test]
    fn test_stuck_board_has_no_direction() {
        let stuck = Board::from_cells([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for policy in [Policy::Greedy, Policy::Random, Policy::Cycle] {
            assert_eq!(pick_direction(&stuck, policy, 0, &mut rng), None);
        }
    }

    #[test]
    fn test_games_run_to_completion() {
        let config = SlideConfig::default().with_seed(17);
        for policy in [Policy::Greedy, Policy::Random, Policy::Cycle] {
            let results = play_sessions(&config, &args(policy));
            assert_eq!(results.games.len(), 3);
            for game in &results.games {
                assert!(game.finished, "{:?} game {} hit the cap", policy, game.game_number);
                assert!(slide::is_game_over(&game.board));
                assert!(game.max_tile >= 4);
            }
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = SlideConfig::default().with_seed(5);
        let a = play_sessions(&config, &args(Policy::Random));
        let b = play_sessions(&config, &args(Policy::Random));
        let scores = |r: &SlideResults| r.games.iter().map(|g| g.score).collect::<Vec<_>>();
        assert_eq!(scores(&a), scores(&b));
    }

    #[test]
    fn test_compute_statistics() {
        let record = |n, score, max_tile, won| GameRecord {
            game_number: n,
            score,
            max_tile,
            moves: 10,
            won,
            finished: true,
            board: Board::new(),
        };
        let results = compute_statistics(vec![record(1, 100, 64, false), record(2, 300, 2048, true)]);
        assert_eq!(results.best_score, 300);
        assert_eq!(results.best_tile, 2048);
        assert_eq!(results.wins, 1);
        assert_eq!(results.avg_score, 200.0);
    }
}
