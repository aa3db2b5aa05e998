//! # Connect 4 Game Implementation
//!
//! This module implements the classic Connect 4 board game.
//! Players take turns dropping discs into columns, trying to get 4 discs
//! in a row (horizontally, vertically, or diagonally).
//!
//! ## Rules
//! - Players alternate dropping discs into columns; Red moves first
//! - Discs fall to the lowest available spot in the column due to gravity
//! - A full column rejects further drops
//! - First player to get 4 discs in a row wins
//! - Game is a draw if the board fills up with no winner

use super::Phase;
use crate::{GameError, GameState, PLAYER_ONE, PLAYER_TWO};
use arena_shared::{check_line_win, line_through, AXES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_WIDTH: usize = 7;
pub const DEFAULT_HEIGHT: usize = 6;
pub const DEFAULT_LINE_SIZE: usize = 4;

/// Represents a move in Connect 4
///
/// Contains the column number where a player wants to drop their disc.
/// Column numbers are 0-based indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Connect4Move(pub usize);

/// Disc colour, also the cell content of an occupied square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disc {
    Red,
    Yellow,
}

impl Disc {
    pub fn opponent(self) -> Disc {
        match self {
            Disc::Red => Disc::Yellow,
            Disc::Yellow => Disc::Red,
        }
    }

    pub fn player_id(self) -> i32 {
        match self {
            Disc::Red => PLAYER_ONE,
            Disc::Yellow => PLAYER_TWO,
        }
    }
}

/// Direction of a winning line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
    Diagonal,
    AntiDiagonal,
}

impl Axis {
    fn from_step(step: (i32, i32)) -> Axis {
        match step {
            (0, _) => Axis::Horizontal,
            (_, 0) => Axis::Vertical,
            (dr, dc) if dr == dc => Axis::Diagonal,
            _ => Axis::AntiDiagonal,
        }
    }
}

/// Represents the complete state of a Connect 4 game
///
/// The board is stored row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connect4State {
    /// The game board as a flat vector (row-major)
    board: Vec<Option<Disc>>,
    /// Player to move
    current_player: Disc,
    /// Board width (number of columns)
    width: usize,
    /// Board height (number of rows)
    height: usize,
    /// Number of discs needed in a row to win
    line_size: usize,
    phase: Phase,
    winner: Option<Disc>,
    winning_axis: Option<Axis>,
    /// Last move made, if any (row, column)
    last_move: Option<(usize, usize)>,
    discs_played: u32,
}

impl fmt::Display for Connect4State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height {
            for c in 0..self.width {
                let symbol = match self.board[r * self.width + c] {
                    Some(Disc::Red) => "R",
                    Some(Disc::Yellow) => "Y",
                    None => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        for c in 0..self.width {
            write!(f, "{} ", c)?;
        }
        writeln!(f)
    }
}

impl GameState for Connect4State {
    type Move = Connect4Move; // Column to drop a disc

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.phase == Phase::GameOver {
            return Vec::new();
        }
        (0..self.width)
            .filter(|&c| self.board[c].is_none())
            .map(Connect4Move)
            .collect()
    }

    fn make_move(&mut self, mv: &Self::Move) {
        let player = self.current_player;
        let Some(row) = self.drop_disc(mv.0, player) else {
            return;
        };
        self.last_move = Some((row, mv.0));
        self.discs_played += 1;

        if let Some(axis) = self.winning_axis_at(row, mv.0) {
            self.phase = Phase::GameOver;
            self.winner = Some(player);
            self.winning_axis = Some(axis);
        } else if self.is_full() {
            self.phase = Phase::GameOver;
        }
        self.current_player = player.opponent();
    }

    fn is_terminal(&self) -> bool {
        self.phase == Phase::GameOver
    }

    fn get_winner(&self) -> Option<i32> {
        self.winner.map(Disc::player_id)
    }

    fn get_current_player(&self) -> i32 {
        self.current_player.player_id()
    }

    fn check_invariants(&self) -> Result<(), GameError> {
        if self.width == 0 || self.height == 0 || self.line_size < 2 {
            return Err(GameError::InvariantViolation(format!(
                "{}x{} board with lines of {} is not playable",
                self.width, self.height, self.line_size
            )));
        }
        if self.board.len() != self.width * self.height {
            return Err(GameError::InvariantViolation("board size changed".to_string()));
        }
        for c in 0..self.width {
            let mut seen_empty = false;
            for r in (0..self.height).rev() {
                match self.board[r * self.width + c] {
                    None => seen_empty = true,
                    Some(_) if seen_empty => {
                        return Err(GameError::InvariantViolation(format!("floating disc in column {}", c)));
                    }
                    Some(_) => {}
                }
            }
        }
        if self.phase == Phase::Playing {
            for disc in [Disc::Red, Disc::Yellow] {
                if check_line_win(&self.board, self.width, self.height, &Some(disc), self.line_size) {
                    return Err(GameError::InvariantViolation(format!("{:?} has a line but the game is running", disc)));
                }
            }
        }
        Ok(())
    }

    fn validate_move(&self, mv: &Self::Move) -> Result<(), GameError> {
        if mv.0 >= self.width {
            return Err(GameError::MalformedInput(format!(
                "column {} is outside 0..{}",
                mv.0, self.width
            )));
        }
        if self.phase == Phase::GameOver {
            return Err(GameError::InvalidAction("game is already over".to_string()));
        }
        if self.board[mv.0].is_some() {
            return Err(GameError::InvalidAction(format!("column {} is full", mv.0)));
        }
        Ok(())
    }
}

impl Connect4State {
    /// Creates a standard 7x6 game that needs 4 in a row.
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_LINE_SIZE)
    }

    /// Creates a new Connect 4 game with the specified configuration
    pub fn with_dimensions(width: usize, height: usize, line_size: usize) -> Self {
        Self {
            board: vec![None; width * height],
            current_player: Disc::Red,
            width,
            height,
            line_size,
            phase: Phase::Playing,
            winner: None,
            winning_axis: None,
            last_move: None,
            discs_played: 0,
        }
    }

    /// Gets the number of discs needed in a row to win
    pub fn get_line_size(&self) -> usize {
        self.line_size
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Disc> {
        self.board[row * self.width + col]
    }

    pub fn current_disc(&self) -> Disc {
        self.current_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner(&self) -> Option<Disc> {
        self.winner
    }

    pub fn winning_axis(&self) -> Option<Axis> {
        self.winning_axis
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    pub fn discs_played(&self) -> u32 {
        self.discs_played
    }

    /// Returns the board as rows of cells, top row first.
    pub fn get_board(&self) -> Vec<Vec<Option<Disc>>> {
        self.board.chunks(self.width).map(|row| row.to_vec()).collect()
    }

    /// Places `disc` in the lowest empty row of `col` and returns that row,
    /// or `None` if the column is full or out of range.
    pub fn drop_disc(&mut self, col: usize, disc: Disc) -> Option<usize> {
        if col >= self.width {
            return None;
        }
        let row = (0..self.height).rev().find(|&r| self.board[r * self.width + col].is_none())?;
        self.board[row * self.width + col] = Some(disc);
        Some(row)
    }

    /// Whether dropping the current player's disc in `col` would win immediately.
    pub fn is_winning_drop(&self, col: usize, disc: Disc) -> bool {
        let mut scratch = self.clone();
        match scratch.drop_disc(col, disc) {
            Some(row) => scratch.winning_axis_at(row, col).is_some(),
            None => false,
        }
    }

    /// Returns the first axis through `(row, col)` holding a full line.
    fn winning_axis_at(&self, row: usize, col: usize) -> Option<Axis> {
        self.board[row * self.width + col]?;
        AXES.into_iter()
            .find(|&axis| line_through(&self.board, self.width, self.height, row, col, axis) >= self.line_size)
            .map(Axis::from_step)
    }

    fn is_full(&self) -> bool {
        self.board[..self.width].iter().all(Option::is_some)
    }
}

impl Default for Connect4State {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Connect4Move {
    type Err = String;

    /// Creates a Connect4Move from a string representation
    ///
    /// Expected format is just the column number as a string.
    ///
    /// # Examples
    /// ```
    /// use std::str::FromStr;
    /// use arena::games::connect4::Connect4Move;
    /// let mv = Connect4Move::from_str("3").unwrap();
    /// assert_eq!(mv.0, 3);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s.trim().parse::<usize>().map_err(|e| e.to_string())?;
        Ok(Connect4Move(c))
    }
}
