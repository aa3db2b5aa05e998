//! # Game Implementations Module
//!
//! This module contains the rule engines for every game in the arena.
//! Each game implements the `GameState` trait so the controller, the sessions
//! and the bots can drive any of them through one interface.
//!
//! ## Supported Games
//! - **Chess**: 8x8 board, full piece movement with check filtering and promotion
//! - **Connect 4**: Gravity-based connection game on a 6x7 grid
//! - **Pong**: Continuous paddle-and-ball simulation advanced by fixed ticks
//! - **Uno**: 108-card shedding game with skip, reverse and draw penalties
//!
//! ## Adding New Games
//! To add a new game, create a new module and implement:
//! 1. An action type with `Display` and `FromStr` for the terminal front-end
//! 2. A state type implementing `GameState` and serde's traits for snapshots
//! 3. A bot in `crate::bots`
//! 4. A variant in `crate::game_wrapper`

pub mod chess;
pub mod connect4;
pub mod pong;
pub mod uno;

use serde::{Deserialize, Serialize};

/// Lifecycle phase shared by the turn-based games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    GameOver,
}
