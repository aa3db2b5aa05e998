//! Bot-vs-bot benchmark.
//!
//! Plays a batch of games with the bots on both seats, spread over a rayon
//! thread pool, and prints the win/draw split and throughput.

use arena::game_controller::{GameController, MoveResult};
use arena::game_wrapper::{GameKind, GameSetup, GameWrapper};
use arena::stats::{OutcomeReport, Tally};
use arena::ArenaError;
use clap::Parser;
use env_logger::Env;
use log::warn;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Action cap per game. Chess has no move-count draw rule and a Pong rally
/// or an Uno cycle can run for a long time, so capped games count as unfinished.
fn action_cap(kind: GameKind) -> usize {
    match kind {
        GameKind::Chess => 600,
        GameKind::Connect4 => 42,
        GameKind::Pong => 200_000,
        GameKind::Uno => 10_000,
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game to benchmark; all games when omitted
    #[arg(long, value_enum)]
    game: Option<GameKind>,

    /// Games per game kind
    #[arg(long, default_value_t = 100)]
    games: u64,

    /// Worker threads (default: number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Base seed; game `i` uses `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// Result of one benchmark game.
struct Played {
    report: Option<OutcomeReport>,
    actions: usize,
}

fn play_one(kind: GameKind, seed: u64) -> Played {
    let setup = GameSetup {
        seed,
        ..GameSetup::default()
    };
    let mut controller = GameController::new(GameWrapper::new(kind, &setup), seed).with_seats("bot-1", "bot-2");
    let cap = action_cap(kind);
    let mut actions = 0;
    while actions < cap {
        match controller.play_bot_move() {
            MoveResult::Success { game_over, .. } => {
                actions += 1;
                if game_over {
                    break;
                }
            }
            MoveResult::GameOver => break,
            MoveResult::Invalid { reason } => {
                warn!("{} game {} stopped: {}", kind, seed, reason);
                break;
            }
        }
    }
    Played {
        report: controller.outcome_report(),
        actions,
    }
}

fn print_stats(kind: GameKind, played: &[Played], duration: Duration) {
    let mut tally = Tally::default();
    for report in played.iter().filter_map(|p| p.report.as_ref()) {
        tally.add(report);
    }
    let unfinished = played.len() as u32 - tally.games;
    let actions: usize = played.iter().map(|p| p.actions).sum();
    let secs = duration.as_secs_f64();

    println!("{} Results:", kind.name());
    println!("  Games: {} ({} unfinished)", played.len(), unfinished);
    println!("  Seat 1 wins: {}", tally.player1_wins);
    println!("  Seat 2 wins: {}", tally.player2_wins);
    println!("  Draws: {}", tally.draws);
    println!("  Time: {:.3}s", secs);
    println!("  Games/sec: {:.1}", played.len() as f64 / secs);
    println!("  Actions/sec: {:.0}", actions as f64 / secs);
}

fn main() -> Result<(), ArenaError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ArenaError::Config(format!("cannot build thread pool: {}", e)))?;

    println!("Mini-Game Arena - Bot Benchmark");
    println!("===============================");
    println!("Games per kind: {}", args.games);
    println!("Threads: {}", threads);
    println!("Seed: {}", args.seed);
    println!("-------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Use --release for accurate numbers.\n");

    let kinds: Vec<GameKind> = match args.game {
        Some(kind) => vec![kind],
        None => GameKind::ALL.to_vec(),
    };
    for kind in kinds {
        let start = Instant::now();
        let played: Vec<Played> = pool.install(|| {
            (0..args.games)
                .into_par_iter()
                .map(|i| play_one(kind, args.seed.wrapping_add(i)))
                .collect()
        });
        print_stats(kind, &played, start.elapsed());
    }
    Ok(())
}
