//! Greedy one-ply chess bot.
//!
//! Every legal move is scored as `20 * captured value + (7 - distance)`, where
//! `distance` is the Manhattan distance of the destination from the board
//! centre (1 for the four central squares, 7 for a corner). That is the
//! classic `10 * value + 0.5 * (7 - distance)` rule scaled by two so the score
//! stays integral. The bot plays uniformly at random among the moves tied for
//! the top score.

use super::best_scored;
use crate::games::chess::{ChessMove, ChessState, BOARD_SIZE};
use crate::GameState;
use arena_shared::center_distance_x2;
use rand::Rng;

/// Centre distance of a corner square on an 8x8 board.
const MAX_CENTER_DISTANCE: i32 = 7;

/// Scores a legal move for the side to move.
pub fn score_move(state: &ChessState, mv: &ChessMove) -> i32 {
    let captured = state.board().get(mv.to).map_or(0, |piece| piece.kind.value());
    // The centre lies between squares, so the doubled distance is always even.
    let distance = center_distance_x2(mv.to.row, mv.to.col, BOARD_SIZE) as i32 / 2;
    20 * captured + (MAX_CENTER_DISTANCE - distance)
}

/// Chooses the bot's move, or `None` when the side to move has no legal move.
pub fn choose_move<R: Rng + ?Sized>(state: &ChessState, rng: &mut R) -> Option<ChessMove> {
    let scored: Vec<(ChessMove, i32)> = state
        .get_possible_moves()
        .into_iter()
        .map(|mv| {
            let score = score_move(state, &mv);
            (mv, score)
        })
        .collect();
    best_scored(&scored, rng)
}
