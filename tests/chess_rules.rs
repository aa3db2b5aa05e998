use arena::games::chess::{Board, ChessMove, ChessState, ChessStatus, Color, PieceKind, Position};
use arena::{GameError, GameState};

fn pos(square: &str) -> Position {
    square.parse().unwrap()
}

fn play(state: &mut ChessState, moves: &[&str]) {
    for notation in moves {
        let mv: ChessMove = notation.parse().unwrap();
        state.apply_move(&mv).unwrap();
    }
}

#[test]
fn test_twenty_opening_moves() {
    let state = ChessState::new();
    assert_eq!(state.get_possible_moves().len(), 20);
    assert_eq!(state.get_current_player(), 1);
}

#[test]
fn test_fools_mate() {
    let mut state = ChessState::new();
    play(&mut state, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(state.status(), ChessStatus::Checkmate);
    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Color::Black));
    assert_eq!(state.get_winner(), Some(-1));
    assert_eq!(state.moves_count(), 4);
}

#[test]
fn test_legal_moves_never_leave_king_in_check() {
    let mut state = ChessState::new();
    play(&mut state, &["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6"]);
    for mv in state.get_possible_moves() {
        let mut next = state.clone();
        next.apply_move(&mv).unwrap();
        assert!(!next.board().is_king_in_check(Color::White), "{} leaves the king in check", mv);
    }
}

#[test]
fn test_scholars_mate() {
    let mut state = ChessState::new();
    play(&mut state, &["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6", "h5f7"]);
    assert!(state.is_checkmate());
    assert_eq!(state.get_winner(), Some(1));
}

#[test]
fn test_rejected_move_keeps_state() {
    let mut state = ChessState::new();
    let before = state.clone();
    let illegal = ChessMove::new(pos("e2"), pos("e5"));
    assert!(matches!(state.apply_move(&illegal), Err(GameError::InvalidAction(_))));
    assert_eq!(state, before);
}

#[test]
fn test_promotion_choices() {
    let board = Board::from_placement("7k/P7/8/8/8/8/8/K7").unwrap();
    let mut state = ChessState::from_board(board, Color::White);
    let promotions: Vec<ChessMove> = state
        .get_possible_moves()
        .into_iter()
        .filter(|m| m.from == pos("a7"))
        .collect();
    assert_eq!(promotions.len(), 4);

    state
        .apply_move(&ChessMove::with_promotion(pos("a7"), pos("a8"), PieceKind::Knight))
        .unwrap();
    assert_eq!(state.board().get(pos("a8")).map(|p| p.kind), Some(PieceKind::Knight));
}

#[test]
fn test_stalemate_is_a_draw() {
    // Black king on a8, white queen on b6 and king on c1; Black to move has no legal move.
    let board = Board::from_placement("k7/8/1Q6/8/8/8/8/2K5").unwrap();
    let state = ChessState::from_board(board, Color::Black);
    assert!(state.is_stalemate());
    assert!(state.is_terminal());
    assert_eq!(state.get_winner(), None);
    assert!(state.outcome().draw);
}
