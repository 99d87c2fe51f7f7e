//! Selfplay command - Tic-Tac-Toe AI against a scripted X player
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::{Args, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use gridgames_core::tictactoe::Board;
use gridgames_core::{
    GameResult, MinimaxAI, MinimaxOpponent, Opponent, Position, RandomOpponent, SearchConfig,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Who plays X against the AI
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OpponentKind {
    /// Perfect play; every game should be drawn
    Minimax,
    /// Uniformly random empty cells
    Random,
}

#[derive(Args)]
pub struct SelfplayArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// X player strategy
    #[arg(long, value_enum, default_value = "random")]
    pub opponent: OpponentKind,

    /// Score the AI's top-level moves in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    moves: Vec<Position>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    player_wins: usize,
    ai_wins: usize,
    draws: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
///
/// 1. Play the match (multiple games)
/// 2. Report results
pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting selfplay: AI vs {:?} ({} games)",
        args.opponent,
        args.games
    );

    let results = play_match(&args, seed);

    if results.player_wins > 0 {
        tracing::warn!("AI lost {} game(s)", results.player_wins);
    }

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(args: &SelfplayArgs, seed: Option<u64>) -> MatchResults {
    let mut rng = create_rng(seed);
    let ai = MinimaxAI::new(SearchConfig::default().with_parallel(args.parallel));
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        let mut opponent: Box<dyn Opponent> = match args.opponent {
            OpponentKind::Minimax => Box::new(MinimaxOpponent),
            OpponentKind::Random => Box::new(RandomOpponent::new(rng.gen())),
        };

        let record = play_single_game(&ai, opponent.as_mut(), game_num + 1);

        tracing::info!(
            "Game {}: {:?} ({} moves)",
            record.game_number,
            record.result,
            record.moves.len()
        );

        games.push(record);
    }

    compute_match_statistics(games)
}

/// Report match results
fn report_results(results: &MatchResults, args: &SelfplayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game from an empty board; X moves first
fn play_single_game(ai: &MinimaxAI, opponent: &mut dyn Opponent, game_number: usize) -> GameRecord {
    let (final_board, moves) = ai.play_game(Board::new(), opponent);
    GameRecord {
        game_number,
        result: final_board.result(),
        moves,
    }
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |r: GameResult| games.iter().filter(|g| g.result == r).count();
    let player_wins = count(GameResult::PlayerWins);
    let ai_wins = count(GameResult::AiWins);
    let draws = count(GameResult::Draw);

    let total_moves: usize = games.iter().map(|g| g.moves.len()).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        player_wins,
        ai_wins,
        draws,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: GameResult,
        moves: Vec<Position>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        player_wins: usize,
        ai_wins: usize,
        draws: usize,
        avg_moves: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        player_wins: results.player_wins,
        ai_wins: results.ai_wins,
        draws: results.draws,
        avg_moves: results.avg_moves,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.result,
                moves: g.moves.clone(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Selfplay Results ===");
    println!("Total games: {}", total);
    println!(
        "AI wins:     {} ({:.1}%)",
        results.ai_wins,
        percent(results.ai_wins, total)
    );
    println!(
        "X wins:      {} ({:.1}%)",
        results.player_wins,
        percent(results.player_wins, total)
    );
    println!(
        "Draws:       {} ({:.1}%)",
        results.draws,
        percent(results.draws, total)
    );
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        let moves: Vec<String> = game.moves.iter().map(|p| p.to_string()).collect();
        println!(
            "  Game {}: {:?} [{}]",
            game.game_number,
            game.result,
            moves.join(" ")
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.player_wins, 0);
        assert_eq!(results.ai_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_moves, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let record = |n, result, len| GameRecord {
            game_number: n,
            result,
            moves: vec![Position::new(0, 0); len],
        };
        let games = vec![
            record(1, GameResult::AiWins, 6),
            record(2, GameResult::Draw, 9),
            record(3, GameResult::AiWins, 6),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.ai_wins, 2);
        assert_eq!(results.draws, 1);
        assert_eq!(results.player_wins, 0);
        assert_eq!(results.avg_moves, 7.0);
    }

    #[test]
    fn test_play_match_minimax_all_draws() {
        let args = SelfplayArgs {
            games: 2,
            opponent: OpponentKind::Minimax,
            parallel: false,
            json: false,
        };
        let results = play_match(&args, Some(1));
        assert_eq!(results.draws, 2);
    }

    #[test]
    fn test_play_match_random_is_seeded() {
        let args = SelfplayArgs {
            games: 5,
            opponent: OpponentKind::Random,
            parallel: false,
            json: false,
        };
        let a = play_match(&args, Some(11));
        let b = play_match(&args, Some(11));
        assert_eq!(a.player_wins, 0);
        let moves = |r: &MatchResults| r.games.iter().map(|g| g.moves.clone()).collect::<Vec<_>>();
        assert_eq!(moves(&a), moves(&b));
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }
}
