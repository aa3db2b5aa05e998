//! # Game Controller Module - Central Game State Management
//!
//! The `GameController` owns the authoritative state of one game. Every
//! action, human or bot, goes through [`GameController::try_make_move`],
//! which validates it against the engine, applies it and records it in the
//! move history. Everything else (terminal UI, sessions, snapshot stores)
//! works on clones handed out by the controller.
//!
//! The controller also owns the seeded generator the bots draw from, times the
//! game, and builds the [`OutcomeReport`] once the game is over.

use crate::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use crate::stats::OutcomeReport;
use crate::{GameError, GameState, PLAYER_ONE};
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{Duration, Instant};

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        /// The applied move
        move_made: MoveWrapper,
        /// Player who made the move
        player: i32,
        /// Whether the game is now over
        game_over: bool,
        /// Winner if game is over (None for draw)
        winner: Option<i32>,
    },
    /// Move was rejected; the state is unchanged unless the reason is an
    /// invariant violation, in which case the game has been abandoned
    Invalid { reason: GameError },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// Player who made the move
    pub player: i32,
    /// The move that was made
    pub move_made: MoveWrapper,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(player: i32, move_made: MoveWrapper, move_number: usize) -> Self {
        Self {
            player,
            move_made,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Game is still in progress
    InProgress,
    /// Game ended with a winner
    Win(i32),
    /// Game ended in a draw
    Draw,
    /// An engine consistency check failed and the game was stopped
    Abandoned,
}

impl GameStatus {
    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```rust,ignore
/// let mut controller = GameController::new(GameWrapper::new(GameKind::Connect4, &setup), seed);
///
/// match controller.try_make_move(mv) {
///     MoveResult::Success { game_over, winner, .. } => { /* applied */ }
///     MoveResult::Invalid { reason } => { /* rejected, state untouched */ }
///     MoveResult::GameOver => { /* nothing more to play */ }
/// }
///
/// // Let the bot answer
/// controller.play_bot_move();
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    /// The authoritative game state
    game_state: GameWrapper,
    /// History of player decisions (Pong clock ticks are not recorded)
    move_history: Vec<MoveHistoryEntry>,
    /// Current game status
    status: GameStatus,
    /// Generator the bots draw from
    rng: Xoshiro256PlusPlus,
    /// Seat identifiers used in outcome reports
    seats: [String; 2],
    started: Instant,
    finished_after: Option<Duration>,
}

impl GameController {
    /// Create a new game controller with the given initial state
    ///
    /// The state may be fresh or restored from a snapshot; a restored state
    /// that is already terminal starts the controller in its final status.
    pub fn new(initial_state: GameWrapper, seed: u64) -> Self {
        let mut controller = Self {
            game_state: initial_state,
            move_history: Vec::new(),
            status: GameStatus::InProgress,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            seats: ["player".to_string(), "bot".to_string()],
            started: Instant::now(),
            finished_after: None,
        };
        controller.refresh_status();
        controller
    }

    /// Sets the identifiers reported for the first and second seat.
    pub fn with_seats(mut self, player1: impl Into<String>, player2: impl Into<String>) -> Self {
        self.seats = [player1.into(), player2.into()];
        self
    }

    fn refresh_status(&mut self) {
        if self.game_state.is_terminal() {
            self.status = match self.game_state.get_winner() {
                Some(w) => GameStatus::Win(w),
                None => GameStatus::Draw,
            };
            self.finished_after.get_or_insert_with(|| self.started.elapsed());
        }
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &MoveWrapper) -> Result<(), GameError> {
        if self.status.is_game_over() {
            return Err(GameError::InvalidAction("game is already over".to_string()));
        }
        self.game_state.validate_move(mv)
    }

    /// Attempt to make a move
    ///
    /// Validates the move and applies it if valid. Returns the result of the attempt.
    pub fn try_make_move(&mut self, mv: MoveWrapper) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }

        let player = self.game_state.get_current_player();
        if let Err(reason) = self.game_state.validate_move(&mv) {
            warn!("rejected {} from {}: {}", mv, self.get_player_name(player), reason);
            return MoveResult::Invalid { reason };
        }

        self.game_state.make_move(&mv);
        if let Err(reason) = self.game_state.check_invariants() {
            error!("abandoning {} game after {}: {}", self.kind().name(), mv, reason);
            self.status = GameStatus::Abandoned;
            self.finished_after = Some(self.started.elapsed());
            return MoveResult::Invalid { reason };
        }

        if !mv.is_tick() {
            let move_number = self.move_history.len() + 1;
            debug!("{}. {} - {}", move_number, self.get_player_name(player), mv);
            self.move_history.push(MoveHistoryEntry::new(player, mv.clone(), move_number));
        }

        self.refresh_status();
        let game_over = self.status.is_game_over();
        let winner = self.get_winner();
        if game_over {
            match winner {
                Some(w) => info!("{} over: {} wins", self.kind().name(), self.get_player_name(w)),
                None => info!("{} over: draw", self.kind().name()),
            }
        }

        MoveResult::Success {
            move_made: mv,
            player,
            game_over,
            winner,
        }
    }

    /// Asks the bot for the action it would play, without playing it.
    ///
    /// Draws from the controller's generator, so it advances the bot's
    /// random sequence just as playing would.
    pub fn suggest_bot_move(&mut self) -> Option<MoveWrapper> {
        if self.status.is_game_over() {
            return None;
        }
        self.game_state.bot_move(&mut self.rng)
    }

    /// Lets the bot choose and play the action for the player to move.
    pub fn play_bot_move(&mut self) -> MoveResult {
        match self.suggest_bot_move() {
            Some(mv) => self.try_make_move(mv),
            None => MoveResult::GameOver,
        }
    }

    /// Parses an action in the game's notation and tries it.
    pub fn try_make_move_str(&mut self, input: &str) -> MoveResult {
        match self.game_state.parse_move(input) {
            Ok(mv) => self.try_make_move(mv),
            Err(reason) => MoveResult::Invalid { reason },
        }
    }

    /// Get a clone of the game state, e.g. for a snapshot
    pub fn snapshot(&self) -> GameWrapper {
        self.game_state.clone()
    }

    /// Get a reference to the game state for rendering
    pub fn get_render_state(&self) -> &GameWrapper {
        &self.game_state
    }

    pub fn kind(&self) -> GameKind {
        self.game_state.kind()
    }

    /// Get the current player
    pub fn get_current_player(&self) -> i32 {
        self.game_state.get_current_player()
    }

    /// Get the current game status
    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Get the winner if the game is over
    pub fn get_winner(&self) -> Option<i32> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    /// Get the complete move history
    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    /// Get the number of moves made
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Get legal moves for the current player
    pub fn get_legal_moves(&self) -> Vec<MoveWrapper> {
        if self.status.is_game_over() {
            Vec::new()
        } else {
            self.game_state.get_possible_moves()
        }
    }

    /// Time since the game started, frozen once it is over.
    pub fn elapsed(&self) -> Duration {
        self.finished_after.unwrap_or_else(|| self.started.elapsed())
    }

    /// Reset the game to a new initial state
    pub fn reset(&mut self, new_state: GameWrapper) {
        self.game_state = new_state;
        self.move_history.clear();
        self.status = GameStatus::InProgress;
        self.started = Instant::now();
        self.finished_after = None;
        self.refresh_status();
    }

    /// Builds the outcome report of a finished game.
    ///
    /// Returns `None` while the game is running or after it was abandoned.
    pub fn outcome_report(&self) -> Option<OutcomeReport> {
        let winner_id = match self.status {
            GameStatus::InProgress | GameStatus::Abandoned => return None,
            GameStatus::Win(w) => Some(self.seat_id(w).to_string()),
            GameStatus::Draw => None,
        };
        Some(OutcomeReport {
            game_type: self.kind(),
            player1_id: self.seats[0].clone(),
            player2_id: self.seats[1].clone(),
            is_draw: winner_id.is_none(),
            winner_id,
            duration_seconds: self.elapsed().as_secs_f64(),
            counters: self.game_state.counters(),
        })
    }

    fn seat_id(&self, player_id: i32) -> &str {
        if player_id == PLAYER_ONE {
            &self.seats[0]
        } else {
            &self.seats[1]
        }
    }

    /// Format move history as plain text, one numbered move per line
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", self.kind().name());

        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number,
                self.get_player_name(entry.player),
                entry.move_made
            ));
        }

        match self.status {
            GameStatus::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", self.get_player_name(winner)));
            }
            GameStatus::Draw => {
                output.push_str("\nResult: Draw\n");
            }
            GameStatus::Abandoned => {
                output.push_str("\nResult: Abandoned\n");
            }
            GameStatus::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.get_player_name(self.get_current_player())
                ));
            }
        }

        output
    }

    /// Get a human-readable player name
    pub fn get_player_name(&self, player_id: i32) -> &'static str {
        self.game_state.player_name(player_id)
    }
}
