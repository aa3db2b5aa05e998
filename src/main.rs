//! # Mini-Game Arena
//!
//! Terminal front-end: play Chess, Connect 4, Pong or Uno against the bot.
//! Actions are typed on stdin in each game's notation (`e2e4`, `3`, `left`,
//! `play 17 red`, ...). The bot answers after a short delay, and Pong runs on
//! its own clock while you steer.
//!
//! ## Usage
//! ```text
//! play --game uno --seed 7
//! play --game pong --ball-speed 6 --win-score 3
//! play --game chess --autoplay --bot-delay-ms 200
//! ```

use arena::config::ArenaConfig;
use arena::game_controller::{GameController, MoveResult};
use arena::game_wrapper::{GameKind, GameWrapper};
use arena::persistence::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use arena::session::{GameSession, SessionConfig, SessionEvent};
use arena::stats::LogStatsRecorder;
use arena::{ArenaError, GameError, GameState};
use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game to play
    #[arg(short, long, value_enum, default_value_t = GameKind::Connect4)]
    game: GameKind,

    /// Seed for shuffles, serves and bot choices (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Pause before the bot moves, in milliseconds
    #[arg(long)]
    bot_delay_ms: Option<u64>,

    /// Pong ball speed in pixels per tick
    #[arg(long)]
    ball_speed: Option<f64>,

    /// Pong points needed to win
    #[arg(long)]
    win_score: Option<u32>,

    /// Let the bots play both sides
    #[arg(long, action = clap::ArgAction::SetTrue)]
    autoplay: bool,

    /// Directory for snapshot files
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Resume the last saved game of this kind, if any
    #[arg(long, action = clap::ArgAction::SetTrue)]
    resume: bool,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Loads the config file (if any) and applies the command-line overrides.
    fn resolve(&self) -> Result<ArenaConfig, ArenaError> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::load(path)?,
            None => ArenaConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(ms) = self.bot_delay_ms {
            config.bot_delay_ms = ms;
        }
        if let Some(speed) = self.ball_speed {
            config.pong.ball_speed = speed;
        }
        if let Some(score) = self.win_score {
            config.pong.win_score = score;
        }
        if self.autoplay {
            config.autoplay = true;
        }
        if self.snapshot_dir.is_some() {
            config.snapshot_dir = self.snapshot_dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn help_text(kind: GameKind) -> &'static str {
    match kind {
        GameKind::Chess => "Enter moves like e2e4 or e7e8q (promotion).",
        GameKind::Connect4 => "Enter a column number from 0 to 6.",
        GameKind::Pong => "left/right (l/r), move <x>, pause, resume, speed <3-12>.",
        GameKind::Uno => "play <id> [red|blue|green|yellow] or draw.",
    }
}

fn print_commands(kind: GameKind) {
    println!("{}", help_text(kind).dimmed());
    println!("{}", "Other commands: board, moves, history, help, quit".dimmed());
}

fn print_state(session: &GameSession) {
    println!("{}", session.snapshot());
}

fn print_result(result: &MoveResult) {
    match result {
        MoveResult::Success { .. } => {}
        MoveResult::Invalid { reason } => println!("{} {}", "Rejected:".red().bold(), reason),
        MoveResult::GameOver => println!("{}", "The game is over.".yellow()),
    }
}

fn print_event(kind: GameKind, event: &SessionEvent, session: &GameSession) -> bool {
    match event {
        SessionEvent::Moved {
            player,
            move_made,
            by_bot,
        } => {
            if kind == GameKind::Pong {
                return false;
            }
            let name = session.with_controller(|c| c.get_player_name(*player));
            let line = format!("{} plays {}", name, move_made);
            if *by_bot {
                println!("{}", line.cyan());
                print_state(session);
            } else {
                println!("{}", line);
            }
            false
        }
        SessionEvent::Finished(report) => {
            print_state(session);
            let text = match &report.winner_id {
                Some(winner) => format!("{} wins!", winner),
                None => "Draw.".to_string(),
            };
            println!("{} {}", "Game over:".bold(), text.green().bold());
            true
        }
        SessionEvent::Abandoned(reason) => {
            println!("{} {}", "Game abandoned:".red().bold(), reason);
            true
        }
    }
}

fn open_store(config: &ArenaConfig) -> Result<Arc<dyn SnapshotStore>, ArenaError> {
    let store: Arc<dyn SnapshotStore> = match &config.snapshot_dir {
        Some(dir) => Arc::new(FileSnapshotStore::new(dir)?),
        None => Arc::new(MemorySnapshotStore::new()),
    };
    Ok(store)
}

/// Picks up the saved game if asked to and one is still running.
fn initial_state(
    kind: GameKind,
    config: &ArenaConfig,
    seed: u64,
    store: &dyn SnapshotStore,
    resume: bool,
) -> Result<GameWrapper, ArenaError> {
    if resume {
        match store.load(kind)? {
            Some(saved) if !saved.is_terminal() => {
                info!("resuming saved {} game", kind.name());
                return Ok(saved);
            }
            Some(_) => info!("saved {} game is finished, starting a new one", kind.name()),
            None => info!("no saved {} game", kind.name()),
        }
    }
    Ok(GameWrapper::new(kind, &config.setup(seed)))
}

#[tokio::main]
async fn main() -> Result<(), ArenaError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.resolve()?;
    let kind = args.game;
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("starting {} with seed {}", kind.name(), seed);

    let store = open_store(&config)?;
    let state = initial_state(kind, &config, seed, store.as_ref(), args.resume)?;
    let controller = GameController::new(state, seed);
    let session_config = SessionConfig {
        bot_delay: config.bot_delay(),
        autoplay: config.autoplay,
        ..SessionConfig::default()
    };
    let (mut session, mut events) =
        GameSession::start(controller, session_config, Arc::new(LogStatsRecorder), Some(store));

    println!("{}", format!("=== {} ===", kind.name()).bold());
    print_state(&session);
    if !config.autoplay {
        print_commands(kind);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut scoreboard = tokio::time::interval(Duration::from_secs(1));
    let mut stdin_open = !config.autoplay;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if print_event(kind, &event, &session) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!("stdin closed: {}", e);
                        stdin_open = false;
                        continue;
                    }
                };
                match line.trim() {
                    "" => {}
                    "quit" | "q" | "exit" => break,
                    "help" | "?" => print_commands(kind),
                    "board" => print_state(&session),
                    "moves" => {
                        let moves = session.with_controller(|c| c.get_legal_moves());
                        let listed: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
                        println!("{}", listed.join(", "));
                    }
                    "history" => println!("{}", session.with_controller(|c| c.format_history())),
                    input => {
                        let result = session.submit_str(input);
                        print_result(&result);
                        if matches!(result, MoveResult::Invalid { reason: GameError::MalformedInput(_) }) {
                            println!("{}", help_text(kind).dimmed());
                        }
                    }
                }
            }
            _ = scoreboard.tick(), if kind == GameKind::Pong => {
                print_state(&session);
            }
        }
    }

    session.stop();
    Ok(())
}
