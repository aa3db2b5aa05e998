//! Connect 4 bot: take an immediate win, otherwise block the opponent's
//! immediate win, otherwise drop into a random open column.

use crate::games::connect4::{Connect4Move, Connect4State};
use crate::GameState;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Chooses the bot's column, or `None` when the game is over.
pub fn choose_move<R: Rng + ?Sized>(state: &Connect4State, rng: &mut R) -> Option<Connect4Move> {
    let moves = state.get_possible_moves();
    let me = state.current_disc();

    if let Some(win) = moves.iter().find(|mv| state.is_winning_drop(mv.0, me)) {
        return Some(*win);
    }
    if let Some(block) = moves.iter().find(|mv| state.is_winning_drop(mv.0, me.opponent())) {
        return Some(*block);
    }
    moves.choose(rng).copied()
}
