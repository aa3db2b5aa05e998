//! # Chess Game Implementation
//!
//! This module implements standard chess movement on an 8x8 board.
//!
//! ## Rules
//! - Pawns push one square, two from their starting rank, and capture diagonally
//! - Rooks, bishops and queens slide until blocked; knights jump; kings step once
//! - A pawn reaching the far rank promotes to a queen, rook, bishop or knight
//! - A move is legal only if it does not leave the mover's own king attacked
//! - No legal move while in check is checkmate; no legal move otherwise is stalemate
//!
//! Castling and en passant are not part of this rule set.
//!
//! The board is a flat `Copy` array, so testing a candidate move for king
//! safety copies the board on the stack, applies the move and discards the copy.

use super::Phase;
use crate::{GameError, GameState, PLAYER_ONE, PLAYER_TWO};
use arena_shared::offset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const BOARD_SIZE: usize = 8;

const ROOK_DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const QUEEN_DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0), (1, 0), (0, -1), (0, 1),
    (-1, -1), (-1, 1), (1, -1), (1, 1),
];
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];
const PROMOTION_KINDS: [PieceKind; 4] = [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight];

/// Side of the board. White moves first and maps to player id 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn player_id(self) -> i32 {
        match self {
            Color::White => PLAYER_ONE,
            Color::Black => PLAYER_TWO,
        }
    }

    /// Index into per-player counters (White = 0, Black = 1).
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Row step of a pawn push. White starts on row 6 and moves toward row 0.
    fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    fn pawn_start_row(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    fn promotion_row(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Material value used by the bot when weighing captures.
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight => 3,
            PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 100,
        }
    }

    fn letter(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }

    fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceKind::King),
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            'p' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color, has_moved: false }
    }

    /// FEN-style letter: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }
}

/// A board square. Row 0 is rank 8, column 0 is file a.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    fn step(self, dr: i32, dc: i32) -> Option<Position> {
        offset(self.row, self.col, dr, dc, BOARD_SIZE, BOARD_SIZE).map(|(row, col)| Position { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col as u8) as char;
        let rank = BOARD_SIZE - self.row;
        write!(f, "{}{}", file, rank)
    }
}

impl FromStr for Position {
    type Err = String;

    /// Parses a square in algebraic form, e.g. "e4".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(format!("Expected a square like e4, got {:?}", s));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(format!("Square {:?} is off the board", s));
        }
        Ok(Position {
            row: BOARD_SIZE - (rank - b'0') as usize,
            col: (file - b'a') as usize,
        })
    }
}

/// A chess action: move the piece on `from` to `to`, promoting if the move
/// carries a pawn onto the far rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to, promotion: None }
    }

    pub fn with_promotion(from: Position, to: Position, kind: PieceKind) -> Self {
        Self { from, to, promotion: Some(kind) }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for ChessMove {
    type Err = String;

    /// Parses coordinate notation: "e2e4", or "e7e8q" for a promotion.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || (s.len() != 4 && s.len() != 5) {
            return Err("Expected format: e2e4 or e7e8q".to_string());
        }
        let from = Position::from_str(&s[0..2])?;
        let to = Position::from_str(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind) if PROMOTION_KINDS.contains(&kind) => Some(kind),
                _ => return Err(format!("Cannot promote to {:?}", c)),
            },
        };
        Ok(ChessMove { from, to, promotion })
    }
}

/// A move as it was played, with the moving and captured pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    pub from: Position,
    pub to: Position,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChessStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

/// An 8x8 grid of optional pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// The standard starting position.
    pub fn standard() -> Self {
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Self::empty();
        for (col, kind) in back_rank.into_iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(kind, Color::Black));
            board.squares[1][col] = Some(Piece::new(PieceKind::Pawn, Color::Black));
            board.squares[6][col] = Some(Piece::new(PieceKind::Pawn, Color::White));
            board.squares[7][col] = Some(Piece::new(kind, Color::White));
        }
        board
    }

    /// Builds a board from the piece-placement field of a FEN string,
    /// e.g. `"4k3/8/8/8/8/8/8/4K2R"`. Pawns off their starting rank are
    /// marked as having moved.
    pub fn from_placement(placement: &str) -> Result<Self, GameError> {
        let ranks: Vec<&str> = placement.trim().split('/').collect();
        if ranks.len() != BOARD_SIZE {
            return Err(GameError::MalformedInput(format!("expected 8 ranks, got {}", ranks.len())));
        }
        let mut board = Self::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                    continue;
                }
                let kind = PieceKind::from_letter(c)
                    .ok_or_else(|| GameError::MalformedInput(format!("unknown piece letter {:?}", c)))?;
                if col >= BOARD_SIZE {
                    return Err(GameError::MalformedInput(format!("rank {} is too long", row)));
                }
                let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                let mut piece = Piece::new(kind, color);
                piece.has_moved = kind == PieceKind::Pawn && row != color.pawn_start_row();
                board.squares[row][col] = Some(piece);
                col += 1;
            }
            if col != BOARD_SIZE {
                return Err(GameError::MalformedInput(format!("rank {} does not cover 8 files", row)));
            }
        }
        Ok(board)
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row][pos.col]
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.row][pos.col] = piece;
    }

    /// Iterates over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| Position::new(row, col)))
            .filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, p)| p.kind == PieceKind::King && p.color == color)
            .map(|(pos, _)| pos)
    }

    /// Destinations the piece on `from` can reach by its movement pattern,
    /// ignoring whether its own king ends up attacked.
    pub fn pseudo_legal_destinations(&self, from: Position) -> Vec<Position> {
        let Some(piece) = self.get(from) else {
            return Vec::new();
        };
        let mut targets = Vec::new();
        match piece.kind {
            PieceKind::Pawn => self.pawn_targets(from, piece.color, &mut targets),
            PieceKind::Knight => self.jump_targets(from, piece.color, &KNIGHT_OFFSETS, &mut targets),
            PieceKind::King => self.jump_targets(from, piece.color, &QUEEN_DIRECTIONS, &mut targets),
            PieceKind::Rook => self.slide_targets(from, piece.color, &ROOK_DIRECTIONS, &mut targets),
            PieceKind::Bishop => self.slide_targets(from, piece.color, &BISHOP_DIRECTIONS, &mut targets),
            PieceKind::Queen => self.slide_targets(from, piece.color, &QUEEN_DIRECTIONS, &mut targets),
        }
        targets
    }

    fn pawn_targets(&self, from: Position, color: Color, targets: &mut Vec<Position>) {
        let dir = color.forward();
        if let Some(one) = from.step(dir, 0) {
            if self.get(one).is_none() {
                targets.push(one);
                if from.row == color.pawn_start_row() {
                    if let Some(two) = one.step(dir, 0) {
                        if self.get(two).is_none() {
                            targets.push(two);
                        }
                    }
                }
            }
        }
        for dc in [-1, 1] {
            if let Some(diag) = from.step(dir, dc) {
                if matches!(self.get(diag), Some(p) if p.color != color) {
                    targets.push(diag);
                }
            }
        }
    }

    fn jump_targets(&self, from: Position, color: Color, offsets: &[(i32, i32)], targets: &mut Vec<Position>) {
        for &(dr, dc) in offsets {
            if let Some(to) = from.step(dr, dc) {
                if !matches!(self.get(to), Some(p) if p.color == color) {
                    targets.push(to);
                }
            }
        }
    }

    fn slide_targets(&self, from: Position, color: Color, directions: &[(i32, i32)], targets: &mut Vec<Position>) {
        for &(dr, dc) in directions {
            let mut cursor = from;
            while let Some(to) = cursor.step(dr, dc) {
                match self.get(to) {
                    None => targets.push(to),
                    Some(p) => {
                        if p.color != color {
                            targets.push(to);
                        }
                        break;
                    }
                }
                cursor = to;
            }
        }
    }

    /// All pseudo-legal moves for `color`, expanding pawn promotions into one
    /// move per promotion kind.
    pub fn pseudo_legal_moves(&self, color: Color) -> Vec<ChessMove> {
        let mut moves = Vec::new();
        for (from, piece) in self.pieces().filter(|(_, p)| p.color == color) {
            for to in self.pseudo_legal_destinations(from) {
                if piece.kind == PieceKind::Pawn && to.row == color.promotion_row() {
                    moves.extend(PROMOTION_KINDS.iter().map(|&kind| ChessMove::with_promotion(from, to, kind)));
                } else {
                    moves.push(ChessMove::new(from, to));
                }
            }
        }
        moves
    }

    /// Whether any piece of `by` can move onto `target`.
    pub fn is_square_attacked(&self, target: Position, by: Color) -> bool {
        self.pieces()
            .filter(|(_, p)| p.color == by)
            .any(|(from, _)| self.pseudo_legal_destinations(from).contains(&target))
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_square_attacked(king, color.opponent()),
            None => false,
        }
    }

    /// Moves a piece without any rule checks and returns what was played,
    /// or `None` when `mv.from` is empty.
    fn play(&mut self, mv: &ChessMove) -> Option<PlayedMove> {
        let piece = self.squares[mv.from.row][mv.from.col].take()?;
        let captured = self.get(mv.to);
        let mut placed = piece;
        placed.has_moved = true;
        if let Some(kind) = mv.promotion {
            placed.kind = kind;
        }
        self.set(mv.to, Some(placed));
        Some(PlayedMove {
            from: mv.from,
            to: mv.to,
            piece,
            captured,
            promotion: mv.promotion,
        })
    }

    /// Whether playing `mv` would leave the mover's king attacked.
    pub fn leaves_king_in_check(&self, mv: &ChessMove) -> bool {
        let Some(piece) = self.get(mv.from) else {
            return true;
        };
        let mut scratch = *self;
        scratch.play(mv);
        scratch.is_king_in_check(piece.color)
    }

    pub fn legal_moves(&self, color: Color) -> Vec<ChessMove> {
        self.pseudo_legal_moves(color)
            .into_iter()
            .filter(|mv| !self.leaves_king_in_check(mv))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

/// Represents the complete state of a chess game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChessState {
    board: Board,
    current_player: Color,
    status: ChessStatus,
    phase: Phase,
    winner: Option<Color>,
    last_move: Option<PlayedMove>,
    moves_count: u32,
    captures_by_player: [u32; 2],
    checkmate: bool,
    stalemate: bool,
}

impl ChessState {
    /// Creates a game from the standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Color::White)
    }

    /// Creates a game from an arbitrary position. The status is evaluated
    /// immediately, so a position with no legal moves starts as game over.
    pub fn from_board(board: Board, to_move: Color) -> Self {
        let mut state = Self {
            board,
            current_player: to_move,
            status: ChessStatus::Active,
            phase: Phase::Playing,
            winner: None,
            last_move: None,
            moves_count: 0,
            captures_by_player: [0, 0],
            checkmate: false,
            stalemate: false,
        };
        state.refresh_status();
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_color(&self) -> Color {
        self.current_player
    }

    pub fn status(&self) -> ChessStatus {
        self.status
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn last_move(&self) -> Option<&PlayedMove> {
        self.last_move.as_ref()
    }

    pub fn moves_count(&self) -> u32 {
        self.moves_count
    }

    pub fn captures(&self, color: Color) -> u32 {
        self.captures_by_player[color.index()]
    }

    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    /// Re-evaluates check, checkmate and stalemate for the side to move.
    fn refresh_status(&mut self) {
        let in_check = self.board.is_king_in_check(self.current_player);
        let has_moves = !self.board.legal_moves(self.current_player).is_empty();
        self.checkmate = in_check && !has_moves;
        self.stalemate = !in_check && !has_moves;
        self.status = match (in_check, has_moves) {
            (true, true) => ChessStatus::Check,
            (true, false) => ChessStatus::Checkmate,
            (false, true) => ChessStatus::Active,
            (false, false) => ChessStatus::Stalemate,
        };
        if !has_moves {
            self.phase = Phase::GameOver;
            self.winner = if in_check { Some(self.current_player.opponent()) } else { None };
        }
    }
}

impl Default for ChessState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            write!(f, "{} ", BOARD_SIZE - row)?;
            for col in 0..BOARD_SIZE {
                let symbol = self.board.get(Position::new(row, col)).map_or('.', |p| p.symbol());
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

impl GameState for ChessState {
    type Move = ChessMove;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.phase == Phase::GameOver {
            return Vec::new();
        }
        self.board.legal_moves(self.current_player)
    }

    fn make_move(&mut self, mv: &Self::Move) {
        let mover = self.current_player;
        let Some(played) = self.board.play(mv) else {
            return;
        };
        if played.captured.is_some() {
            self.captures_by_player[mover.index()] += 1;
        }
        self.last_move = Some(played);
        self.moves_count += 1;
        self.current_player = mover.opponent();
        self.refresh_status();
    }

    fn is_terminal(&self) -> bool {
        self.phase == Phase::GameOver
    }

    fn get_winner(&self) -> Option<i32> {
        self.winner.map(Color::player_id)
    }

    fn get_current_player(&self) -> i32 {
        self.current_player.player_id()
    }

    fn check_invariants(&self) -> Result<(), GameError> {
        for color in [Color::White, Color::Black] {
            let kings = self
                .board
                .pieces()
                .filter(|(_, p)| p.kind == PieceKind::King && p.color == color)
                .count();
            if kings != 1 {
                return Err(GameError::InvariantViolation(format!("{} has {} kings", color, kings)));
            }
        }
        if self.board.is_king_in_check(self.current_player.opponent()) {
            return Err(GameError::InvariantViolation(format!(
                "{} king is attacked while {} is to move",
                self.current_player.opponent(),
                self.current_player
            )));
        }
        Ok(())
    }

    fn validate_move(&self, mv: &Self::Move) -> Result<(), GameError> {
        for square in [mv.from, mv.to] {
            if square.row >= BOARD_SIZE || square.col >= BOARD_SIZE {
                return Err(GameError::MalformedInput(format!("square {:?} is off the board", square)));
            }
        }
        if self.phase == Phase::GameOver {
            return Err(GameError::InvalidAction("game is already over".to_string()));
        }
        match self.board.get(mv.from) {
            None => return Err(GameError::InvalidAction(format!("no piece on {}", mv.from))),
            Some(p) if p.color != self.current_player => {
                return Err(GameError::InvalidAction(format!("the piece on {} belongs to {}", mv.from, p.color)))
            }
            Some(_) => {}
        }
        if self.board.legal_moves(self.current_player).contains(mv) {
            Ok(())
        } else {
            Err(GameError::InvalidAction(format!("{} is not a legal move", mv)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> ChessMove {
        ChessMove::from_str(s).unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = ChessState::new();
        assert_eq!(game.get_current_player(), 1);
        assert_eq!(game.status(), ChessStatus::Active);
        assert_eq!(game.board().pieces().count(), 32);
        assert!(game.check_invariants().is_ok());
    }

    #[test]
    fn test_twenty_opening_moves() {
        let game = ChessState::new();
        assert_eq!(game.get_possible_moves().len(), 20);
    }

    #[test]
    fn test_move_notation() {
        let m = mv("e2e4");
        assert_eq!(m.from, Position::new(6, 4));
        assert_eq!(m.to, Position::new(4, 4));
        assert_eq!(m.to_string(), "e2e4");
        assert_eq!(mv("a7a8q").promotion, Some(PieceKind::Queen));
        assert!(ChessMove::from_str("e2").is_err());
        assert!(ChessMove::from_str("e7e8k").is_err());
        assert!(ChessMove::from_str("i2i4").is_err());
    }

    #[test]
    fn test_fools_mate() {
        let mut game = ChessState::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.apply_move(&mv(m)).unwrap();
        }
        assert!(game.is_checkmate());
        assert_eq!(game.status(), ChessStatus::Checkmate);
        assert_eq!(game.winner(), Some(Color::Black));
        assert_eq!(game.get_winner(), Some(-1));
        assert!(game.is_terminal());
        assert_eq!(game.moves_count(), 4);
        assert!(game.get_possible_moves().is_empty());
    }

    #[test]
    fn test_rejects_wrong_side_and_unreachable_square() {
        let mut game = ChessState::new();
        let before = game.clone();
        assert!(matches!(game.apply_move(&mv("e7e5")), Err(GameError::InvalidAction(_))));
        assert!(matches!(game.apply_move(&mv("e2e5")), Err(GameError::InvalidAction(_))));
        assert!(matches!(game.apply_move(&mv("e3e4")), Err(GameError::InvalidAction(_))));
        assert_eq!(game, before);
    }

    #[test]
    fn test_off_board_square_is_malformed() {
        let game = ChessState::new();
        let bad = ChessMove::new(Position::new(8, 0), Position::new(5, 0));
        assert!(matches!(game.validate_move(&bad), Err(GameError::MalformedInput(_))));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // White bishop on e2 is pinned by the rook on e8.
        let board = Board::from_placement("4r2k/8/8/8/8/8/4B3/4K3").unwrap();
        let game = ChessState::from_board(board, Color::White);
        let moves = game.get_possible_moves();
        assert!(moves.iter().all(|m| m.from != Position::from_str("e2").unwrap()));
    }

    #[test]
    fn test_capture_counts() {
        let mut game = ChessState::new();
        for m in ["e2e4", "d7d5", "e4d5"] {
            game.apply_move(&mv(m)).unwrap();
        }
        assert_eq!(game.captures(Color::White), 1);
        assert_eq!(game.captures(Color::Black), 0);
        let last = game.last_move().unwrap();
        assert_eq!(last.captured.map(|p| p.kind), Some(PieceKind::Pawn));
        assert!(game.board().get(Position::from_str("d5").unwrap()).unwrap().has_moved);
    }

    #[test]
    fn test_promotion_choices() {
        let board = Board::from_placement("7k/P7/8/8/8/8/8/K7").unwrap();
        let mut game = ChessState::from_board(board, Color::White);
        let promotions: Vec<_> = game
            .get_possible_moves()
            .into_iter()
            .filter(|m| m.from == Position::from_str("a7").unwrap())
            .collect();
        assert_eq!(promotions.len(), 4);
        assert!(game.apply_move(&mv("a7a8")).is_err());
        game.apply_move(&mv("a7a8n")).unwrap();
        let promoted = game.board().get(Position::from_str("a8").unwrap()).unwrap();
        assert_eq!(promoted.kind, PieceKind::Knight);
        assert_eq!(game.last_move().unwrap().piece.kind, PieceKind::Pawn);
    }

    #[test]
    fn test_stalemate_is_draw() {
        // Black king on a8 has no moves and is not in check.
        let board = Board::from_placement("k7/2Q5/1K6/8/8/8/8/8").unwrap();
        let game = ChessState::from_board(board, Color::Black);
        assert!(game.is_stalemate());
        let outcome = game.outcome();
        assert!(outcome.terminal);
        assert!(outcome.draw);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_check_status() {
        let mut game = ChessState::new();
        for m in ["e2e4", "f7f6", "d1h5"] {
            game.apply_move(&mv(m)).unwrap();
        }
        assert_eq!(game.status(), ChessStatus::Check);
        assert!(game.get_possible_moves().iter().all(|m| !game.board().leaves_king_in_check(m)));
    }

    #[test]
    fn test_legal_moves_never_leave_king_in_check() {
        let mut game = ChessState::new();
        for m in ["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6"] {
            game.apply_move(&mv(m)).unwrap();
        }
        let mover = game.current_color();
        for m in game.get_possible_moves() {
            let mut next = game.clone();
            next.make_move(&m);
            assert!(!next.board().is_king_in_check(mover), "{} left the king in check", m);
        }
    }

    #[test]
    fn test_bad_placement() {
        assert!(Board::from_placement("8/8/8").is_err());
        assert!(Board::from_placement("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("x7/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_invariants_catch_broken_positions() {
        let mut missing_king = ChessState::new();
        missing_king.board.set(Position::from_str("e8").unwrap(), None);
        assert!(matches!(missing_king.check_invariants(), Err(GameError::InvariantViolation(_))));

        let mut two_kings = ChessState::new();
        two_kings.board.set(
            Position::from_str("d1").unwrap(),
            Some(Piece::new(PieceKind::King, Color::White)),
        );
        assert!(matches!(two_kings.check_invariants(), Err(GameError::InvariantViolation(_))));

        // Black's king is attacked but it is White's turn.
        let board = Board::from_placement("4k3/8/8/8/8/8/8/4RK2").unwrap();
        let exposed = ChessState::from_board(board, Color::White);
        assert!(matches!(exposed.check_invariants(), Err(GameError::InvariantViolation(_))));

        assert!(ChessState::new().check_invariants().is_ok());
    }

    #[test]
    fn test_display() {
        let game = ChessState::new();
        let text = game.to_string();
        assert!(text.starts_with("8 r n b q k b n r"));
        assert!(text.contains("1 R N B Q K B N R"));
    }
}
