use arena::game_controller::GameController;
use arena::game_wrapper::{GameKind, GameSetup, GameWrapper};
use arena::persistence::{MemorySnapshotStore, SnapshotStore};
use arena::GameState;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Advances a game by `plies` bot actions.
fn play_bots(state: &mut GameWrapper, rng: &mut Xoshiro256PlusPlus, plies: usize) {
    for _ in 0..plies {
        let Some(mv) = state.bot_move(rng) else { break };
        state.apply_move(&mv).unwrap();
    }
}

#[test]
fn test_mid_game_snapshots_are_byte_identical() {
    for kind in GameKind::ALL {
        let mut state = GameWrapper::new(kind, &GameSetup { seed: 17, ..GameSetup::default() });
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        play_bots(&mut state, &mut rng, 9);

        let first = state.to_json().unwrap();
        let restored = GameWrapper::from_json(&first).unwrap();
        let second = restored.to_json().unwrap();
        assert_eq!(first, second, "{} snapshot changed on round trip", kind);
        assert_eq!(restored, state);
    }
}

#[test]
fn test_restored_games_do_not_diverge() {
    for kind in GameKind::ALL {
        let mut original = GameWrapper::new(kind, &GameSetup { seed: 5, ..GameSetup::default() });
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        play_bots(&mut original, &mut rng, 12);

        let mut restored = GameWrapper::from_json(&original.to_json().unwrap()).unwrap();
        let mut rng_a = Xoshiro256PlusPlus::seed_from_u64(99);
        let mut rng_b = rng_a.clone();
        play_bots(&mut original, &mut rng_a, 40);
        play_bots(&mut restored, &mut rng_b, 40);
        assert_eq!(original, restored, "{} diverged after restore", kind);
    }
}

#[test]
fn test_store_resumes_through_controller() {
    let store = MemorySnapshotStore::new();
    let mut controller = GameController::new(
        GameWrapper::new(GameKind::Uno, &GameSetup { seed: 8, ..GameSetup::default() }),
        8,
    );
    for _ in 0..6 {
        controller.play_bot_move();
    }
    store.save(&controller.snapshot()).unwrap();

    let resumed = store.load(GameKind::Uno).unwrap().unwrap();
    assert_eq!(resumed, controller.snapshot());
    let resumed = GameController::new(resumed, 8);
    assert_eq!(resumed.get_current_player(), controller.get_current_player());
    assert_eq!(resumed.get_legal_moves(), controller.get_legal_moves());
}

#[test]
fn test_pong_float_state_survives() {
    let mut state = GameWrapper::new(
        GameKind::Pong,
        &GameSetup {
            seed: 3,
            pong: arena::games::pong::PongConfig {
                ball_speed: 7.3,
                win_score: 5,
            },
        },
    );
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    play_bots(&mut state, &mut rng, 500);
    let json = state.to_json().unwrap();
    assert_eq!(GameWrapper::from_json(&json).unwrap(), state);
}
