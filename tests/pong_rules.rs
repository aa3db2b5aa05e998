use arena::games::pong::{PongConfig, PongMove, PongPhase, PongState, FIELD_WIDTH, PADDLE_WIDTH};
use arena::GameState;

/// Keeps the player's paddle on the far side from the ball so every ball
/// coming down is a conceded point.
fn dodge(state: &mut PongState) {
    let target = if state.ball().position.x < FIELD_WIDTH / 2.0 {
        FIELD_WIDTH - PADDLE_WIDTH
    } else {
        0.0
    };
    state.apply_move(&PongMove::MoveTo(target)).unwrap();
}

#[test]
fn test_match_ends_exactly_at_win_score() {
    let config = PongConfig {
        ball_speed: 9.0,
        win_score: 3,
    };
    let mut state = PongState::with_config(config, 11);
    let mut ticks = 0u64;
    while !state.is_terminal() {
        assert!(ticks < 100_000, "match did not finish");
        dodge(&mut state);
        let before = (state.player_score(), state.bot_score());
        state.apply_move(&PongMove::Tick).unwrap();
        ticks += 1;
        let after = (state.player_score(), state.bot_score());
        assert!(after.0 >= before.0 && after.1 >= before.1);
        if state.is_terminal() {
            assert_ne!(before, after, "game ended on a tick without a point");
        }
    }

    println!("Finished after {} ticks: {}-{}", ticks, state.player_score(), state.bot_score());
    assert_eq!(state.phase(), PongPhase::GameOver);
    assert_eq!(state.player_score().max(state.bot_score()), 3);
    assert!(state.player_score().min(state.bot_score()) < 3);
    assert_eq!(state.ticks(), ticks);
    assert_eq!(state.rally().completed, state.player_score() + state.bot_score());
    assert!(state.check_invariants().is_ok());
    assert!(state.apply_move(&PongMove::Tick).is_err());
}

#[test]
fn test_same_seed_same_match() {
    let mut a = PongState::new(21);
    let mut b = PongState::new(21);
    for _ in 0..3_000 {
        if a.is_terminal() {
            break;
        }
        dodge(&mut a);
        dodge(&mut b);
        a.apply_move(&PongMove::Tick).unwrap();
        b.apply_move(&PongMove::Tick).unwrap();
    }
    assert_eq!(a, b);
}
