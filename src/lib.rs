//! # Mini-Game Arena
//!
//! Rule engines for four two-player games (Chess, Connect 4, Pong and Uno),
//! each paired with a simple heuristic bot, plus the orchestration needed to
//! play them: a move-validating controller, timer-driven sessions, snapshot
//! persistence and outcome reporting.
//!
//! Every engine implements [`GameState`]. The trait keeps the engines free of
//! any rendering, storage or networking concern: a state is created by the
//! game's constructor, changes only through [`GameState::apply_move`] and is
//! inspected through [`GameState::outcome`].

pub mod bots;
pub mod config;
pub mod game_controller;
pub mod game_wrapper;
pub mod games;
pub mod persistence;
pub mod session;
pub mod stats;

use thiserror::Error;

/// Player id of the first seat (the human in a human-vs-bot game).
pub const PLAYER_ONE: i32 = 1;
/// Player id of the second seat (the bot in a human-vs-bot game).
pub const PLAYER_TWO: i32 = -1;

/// Errors raised by the engines when an action cannot be applied.
///
/// A rejected action never changes the state it was applied to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// The action is well formed but not among the current legal actions.
    #[error("invalid action: {0}")]
    InvalidAction(String),
    /// The action payload has the wrong shape or an out-of-range value.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// An internal consistency check failed. The game must be abandoned.
    #[error("engine invariant violated: {0}")]
    InvariantViolation(String),
}

/// Errors raised by the orchestration layer and the binaries.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("snapshot holds a {found} game, expected {expected}")]
    SnapshotMismatch {
        expected: game_wrapper::GameKind,
        found: game_wrapper::GameKind,
    },
}

/// Terminal status of a game as seen by the orchestration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    pub terminal: bool,
    pub winner: Option<i32>,
    pub draw: bool,
}

/// The state of a game.
///
/// Implementations are plain values: cloning a state yields an independent
/// game, and `Send + Sync` lets states move between the session's tasks and
/// the benchmark's worker threads.
pub trait GameState: Clone + Send + Sync {
    /// The type of an action in the game.
    type Move: Clone + PartialEq + std::fmt::Debug + Send + Sync;

    /// Returns all actions available to the player whose turn it is.
    fn get_possible_moves(&self) -> Vec<Self::Move>;
    /// Applies an action the caller has already validated.
    fn make_move(&mut self, mv: &Self::Move);
    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool;
    /// Returns the winner of the game, if any.
    /// `None` for a draw or while the game is still running.
    fn get_winner(&self) -> Option<i32>;
    /// Returns the player whose turn it is to act.
    fn get_current_player(&self) -> i32;
    /// Re-checks the engine's structural invariants.
    fn check_invariants(&self) -> Result<(), GameError>;

    /// Returns the number of seats in the game.
    fn get_num_players(&self) -> i32 {
        2
    }

    /// Checks an action against the current rules without applying it.
    ///
    /// The default accepts exactly the actions listed by
    /// [`get_possible_moves`](GameState::get_possible_moves). Games whose
    /// actions carry free-form payloads override this to report
    /// [`GameError::MalformedInput`].
    fn validate_move(&self, mv: &Self::Move) -> Result<(), GameError> {
        if self.is_terminal() {
            return Err(GameError::InvalidAction("game is already over".to_string()));
        }
        if self.get_possible_moves().contains(mv) {
            Ok(())
        } else {
            Err(GameError::InvalidAction(format!("{:?} is not a legal action", mv)))
        }
    }

    /// Checks if an action is legal in the current state.
    fn is_legal(&self, mv: &Self::Move) -> bool {
        self.validate_move(mv).is_ok()
    }

    /// Validates and applies an action, then re-checks the invariants.
    ///
    /// Returns the rejection without touching the state when the action is
    /// not legal.
    fn apply_move(&mut self, mv: &Self::Move) -> Result<(), GameError> {
        self.validate_move(mv)?;
        self.make_move(mv);
        self.check_invariants()
    }

    /// Summarises the terminal status of the game.
    fn outcome(&self) -> Outcome {
        if !self.is_terminal() {
            return Outcome::default();
        }
        let winner = self.get_winner();
        Outcome {
            terminal: true,
            winner,
            draw: winner.is_none(),
        }
    }
}
