//! Pong autopilot.
//!
//! The engine steers the bot's own paddle inside every tick with
//! [`Paddle::track`]. This module applies the same tracking to the player's
//! paddle so a game can run unattended (autoplay and the benchmark): it
//! returns a `MoveTo` while the ball is out of reach and `Tick` otherwise.
//! The autopilot lines up off-centre so its returns go cross-court.

use crate::games::pong::{PongMove, PongPhase, PongState, FIELD_WIDTH};
use rand::Rng;

/// How far from the paddle centre the autopilot tries to meet the ball.
const AIM_OFFSET: f64 = 24.0;

/// Chooses the autopilot's next action for the player's side.
///
/// A paused game is resumed; a finished game yields `None`.
pub fn choose_move<R: Rng + ?Sized>(state: &PongState, rng: &mut R) -> Option<PongMove> {
    match state.phase() {
        PongPhase::GameOver => None,
        PongPhase::Paused => Some(PongMove::Resume),
        PongPhase::Playing => {
            let paddle = state.player_paddle();
            let ball_x = state.ball().position.x;
            let aim = if ball_x < FIELD_WIDTH / 2.0 { -AIM_OFFSET } else { AIM_OFFSET };
            let dx = paddle.track(ball_x + aim, rng);
            if dx == 0.0 {
                Some(PongMove::Tick)
            } else {
                Some(PongMove::MoveTo(paddle.position.x + dx))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameState;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_autopilot_only_plays_legal_actions() {
        let mut state = PongState::new(11);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        for _ in 0..20_000 {
            let Some(mv) = choose_move(&state, &mut rng) else {
                break;
            };
            state.apply_move(&mv).unwrap();
        }
        assert!(state.ticks() > 0);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_resumes_paused_game() {
        let mut state = PongState::new(1);
        state.apply_move(&PongMove::Pause).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert_eq!(choose_move(&state, &mut rng), Some(PongMove::Resume));
    }
}
