//! # Heuristic Bots
//!
//! One simple opponent per game. A bot is a pure function of the current
//! state plus a caller-supplied random generator: it never mutates the game
//! and only ever returns an action from the game's legal action list, or
//! `None` when there is nothing to play.
//!
//! - **Chess**: greedy capture value plus centralisation, random among ties
//! - **Connect 4**: win, else block, else a random open column
//! - **Pong**: imperfect paddle tracking (also used inside the engine's tick)
//! - **Uno**: highest-value playable card, otherwise draw

pub mod chess;
pub mod connect4;
pub mod pong;
pub mod uno;

use rand::seq::IndexedRandom;
use rand::Rng;

/// Picks uniformly among the candidates sharing the highest score.
pub(crate) fn best_scored<M: Clone, R: Rng + ?Sized>(scored: &[(M, i32)], rng: &mut R) -> Option<M> {
    let best = scored.iter().map(|(_, score)| *score).max()?;
    let tied: Vec<&M> = scored
        .iter()
        .filter(|(_, score)| *score == best)
        .map(|(mv, _)| mv)
        .collect();
    tied.choose(rng).map(|mv| (*mv).clone())
}
