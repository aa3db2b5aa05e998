//! # Game Wrapper Module - Unified Game Interface
//!
//! This module lets the controller, the sessions, the snapshot stores and the
//! binaries work with any of the four games through one type. `GameWrapper`
//! and `MoveWrapper` are plain enums over the per-game types, so dispatch is a
//! `match` rather than a trait object and each game keeps its own action type.
//!
//! Both enums serialize as adjacently tagged JSON (`{"game": "Pong", "state": ...}`),
//! which is the snapshot format used by [`crate::persistence`].

use crate::bots;
use crate::games::chess::{ChessMove, ChessState};
use crate::games::connect4::{Connect4Move, Connect4State};
use crate::games::pong::{PongConfig, PongMove, PongState};
use crate::games::uno::{UnoMove, UnoState};
use crate::{ArenaError, GameError, GameState, PLAYER_ONE};
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The games the arena can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Chess,
    Connect4,
    Pong,
    Uno,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [GameKind::Chess, GameKind::Connect4, GameKind::Pong, GameKind::Uno];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            GameKind::Chess => "Chess",
            GameKind::Connect4 => "Connect 4",
            GameKind::Pong => "Pong",
            GameKind::Uno => "Uno",
        }
    }

    /// Lowercase identifier used for file names and the command line.
    pub fn slug(self) -> &'static str {
        match self {
            GameKind::Chess => "chess",
            GameKind::Connect4 => "connect4",
            GameKind::Pong => "pong",
            GameKind::Uno => "uno",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Parameters for creating a fresh game.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GameSetup {
    /// Seed for the games that own a generator (Pong, Uno).
    pub seed: u64,
    pub pong: PongConfig,
}

/// Wrapper enum for all supported game states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", content = "state")]
pub enum GameWrapper {
    Chess(ChessState),
    Connect4(Connect4State),
    Pong(PongState),
    Uno(UnoState),
}

/// Wrapper enum for all supported action types.
///
/// Displays in each game's own notation, which is also what
/// [`GameWrapper::parse_move`] accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", content = "move")]
pub enum MoveWrapper {
    /// Coordinate move such as `e2e4` or `e7e8q`.
    Chess(ChessMove),
    /// Column index, gravity picks the row.
    Connect4(Connect4Move),
    /// Paddle input or a clock tick.
    Pong(PongMove),
    /// Card play (with a declared colour for wilds) or a draw.
    Uno(UnoMove),
}

impl MoveWrapper {
    pub fn kind(&self) -> GameKind {
        match self {
            MoveWrapper::Chess(_) => GameKind::Chess,
            MoveWrapper::Connect4(_) => GameKind::Connect4,
            MoveWrapper::Pong(_) => GameKind::Pong,
            MoveWrapper::Uno(_) => GameKind::Uno,
        }
    }

    /// True for the Pong clock tick, which advances time rather than being a player decision.
    pub fn is_tick(&self) -> bool {
        matches!(self, MoveWrapper::Pong(PongMove::Tick))
    }
}

impl fmt::Display for MoveWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveWrapper::Chess(m) => write!(f, "{}", m),
            MoveWrapper::Connect4(m) => write!(f, "{}", m.0),
            MoveWrapper::Pong(m) => write!(f, "{}", m),
            MoveWrapper::Uno(m) => write!(f, "{}", m),
        }
    }
}

impl fmt::Display for GameWrapper {
    /// Delegates to the specific game's Display implementation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameWrapper::Chess(g) => write!(f, "{}", g),
            GameWrapper::Connect4(g) => write!(f, "{}", g),
            GameWrapper::Pong(g) => write!(f, "{}", g),
            GameWrapper::Uno(g) => write!(f, "{}", g),
        }
    }
}

fn mismatch(game: GameKind, mv: &MoveWrapper) -> GameError {
    GameError::MalformedInput(format!("{} action sent to a {} game", mv.kind().name(), game.name()))
}

macro_rules! impl_game_dispatch {
    ($($variant:ident),*) => {
        impl GameState for GameWrapper {
            type Move = MoveWrapper;

            fn get_current_player(&self) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.get_current_player(),)*
                }
            }

            fn get_num_players(&self) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.get_num_players(),)*
                }
            }

            fn get_possible_moves(&self) -> Vec<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g
                        .get_possible_moves()
                        .into_iter()
                        .map(MoveWrapper::$variant)
                        .collect(),)*
                }
            }

            /// A move of the wrong game is ignored; `validate_move` rejects it first.
            fn make_move(&mut self, mv: &Self::Move) {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.make_move(m),)*
                    _ => {}
                }
            }

            fn is_terminal(&self) -> bool {
                match self {
                    $(GameWrapper::$variant(g) => g.is_terminal(),)*
                }
            }

            fn get_winner(&self) -> Option<i32> {
                match self {
                    $(GameWrapper::$variant(g) => g.get_winner(),)*
                }
            }

            fn check_invariants(&self) -> Result<(), GameError> {
                match self {
                    $(GameWrapper::$variant(g) => g.check_invariants(),)*
                }
            }

            fn validate_move(&self, mv: &Self::Move) -> Result<(), GameError> {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.validate_move(m),)*
                    _ => Err(mismatch(self.kind(), mv)),
                }
            }
        }
    };
}

impl_game_dispatch!(Chess, Connect4, Pong, Uno);

impl GameWrapper {
    /// Creates a fresh game of the given kind.
    pub fn new(kind: GameKind, setup: &GameSetup) -> Self {
        match kind {
            GameKind::Chess => GameWrapper::Chess(ChessState::new()),
            GameKind::Connect4 => GameWrapper::Connect4(Connect4State::new()),
            GameKind::Pong => GameWrapper::Pong(PongState::with_config(setup.pong, setup.seed)),
            GameKind::Uno => GameWrapper::Uno(UnoState::new(setup.seed)),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GameWrapper::Chess(_) => GameKind::Chess,
            GameWrapper::Connect4(_) => GameKind::Connect4,
            GameWrapper::Pong(_) => GameKind::Pong,
            GameWrapper::Uno(_) => GameKind::Uno,
        }
    }

    /// Asks the game's bot for an action on behalf of the player to move.
    ///
    /// For Pong the bot's paddle is steered by the engine itself, so this
    /// returns the autopilot action for the player's paddle instead.
    pub fn bot_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MoveWrapper> {
        match self {
            GameWrapper::Chess(g) => bots::chess::choose_move(g, rng).map(MoveWrapper::Chess),
            GameWrapper::Connect4(g) => bots::connect4::choose_move(g, rng).map(MoveWrapper::Connect4),
            GameWrapper::Pong(g) => bots::pong::choose_move(g, rng).map(MoveWrapper::Pong),
            GameWrapper::Uno(g) => bots::uno::choose_move(g, rng).map(MoveWrapper::Uno),
        }
    }

    /// Parses an action typed in the game's notation.
    pub fn parse_move(&self, input: &str) -> Result<MoveWrapper, GameError> {
        let input = input.trim();
        let parsed = match self {
            GameWrapper::Chess(_) => input.parse().map(MoveWrapper::Chess),
            GameWrapper::Connect4(_) => input.parse().map(MoveWrapper::Connect4),
            GameWrapper::Pong(_) => input.parse().map(MoveWrapper::Pong),
            GameWrapper::Uno(_) => input.parse().map(MoveWrapper::Uno),
        };
        parsed.map_err(GameError::MalformedInput)
    }

    /// Display name of a seat.
    pub fn player_name(&self, player_id: i32) -> &'static str {
        let first = player_id == PLAYER_ONE;
        match self {
            GameWrapper::Chess(_) => {
                if first { "White" } else { "Black" }
            }
            GameWrapper::Connect4(_) => {
                if first { "Red" } else { "Yellow" }
            }
            GameWrapper::Pong(_) | GameWrapper::Uno(_) => {
                if first { "Player" } else { "Bot" }
            }
        }
    }

    /// Game-specific counters for outcome reports.
    pub fn counters(&self) -> BTreeMap<String, u64> {
        let mut counters = BTreeMap::new();
        let mut put = |key: &str, value: u64| {
            counters.insert(key.to_string(), value);
        };
        match self {
            GameWrapper::Chess(g) => {
                use crate::games::chess::Color;
                put("moves", u64::from(g.moves_count()));
                put("white_captures", u64::from(g.captures(Color::White)));
                put("black_captures", u64::from(g.captures(Color::Black)));
            }
            GameWrapper::Connect4(g) => {
                put("discs", u64::from(g.discs_played()));
            }
            GameWrapper::Pong(g) => {
                put("player_score", u64::from(g.player_score()));
                put("bot_score", u64::from(g.bot_score()));
                put("player_hits", u64::from(g.hits().player));
                put("bot_hits", u64::from(g.hits().bot));
                put("longest_rally", u64::from(g.rally().longest));
                put("rallies", u64::from(g.rally().completed));
                put("ticks", g.ticks());
            }
            GameWrapper::Uno(g) => {
                put("turns", u64::from(g.turns_played()));
                put("player_cards", g.players()[0].hand.len() as u64);
                put("bot_cards", g.players()[1].hand.len() as u64);
            }
        }
        counters
    }

    /// Serializes the state as a JSON snapshot.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restores a state from a JSON snapshot.
    ///
    /// The restored state must pass the engine's consistency checks, so a
    /// hand-edited or corrupted snapshot is rejected here rather than failing
    /// on first use.
    pub fn from_json(json: &str) -> Result<Self, ArenaError> {
        let state: Self = serde_json::from_str(json)?;
        state.check_invariants()?;
        Ok(state)
    }
}
