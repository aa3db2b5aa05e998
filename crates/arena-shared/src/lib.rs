#![cfg_attr(not(test), no_std)]

//! Grid geometry shared by the board engines (Chess, Connect 4).
//!
//! Boards are flat row-major slices with row 0 at the top. All helpers take the
//! board dimensions explicitly so one set of functions serves every grid size.

/// The four line axes as (row step, column step): horizontal, vertical,
/// diagonal (top-left to bottom-right) and anti-diagonal (top-right to bottom-left).
pub const AXES: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Steps from `(row, col)` by `(dr, dc)`, returning `None` when the result leaves the board.
pub fn offset(row: usize, col: usize, dr: i32, dc: i32, width: usize, height: usize) -> Option<(usize, usize)> {
    let r = row as i32 + dr;
    let c = col as i32 + dc;
    if r < 0 || c < 0 || r >= height as i32 || c >= width as i32 {
        return None;
    }
    Some((r as usize, c as usize))
}

/// Counts cells equal to `board[row][col]` walking away from it in one direction.
/// The starting cell itself is not counted.
pub fn run_length<T: PartialEq>(
    board: &[T],
    width: usize,
    height: usize,
    row: usize,
    col: usize,
    dr: i32,
    dc: i32,
) -> usize {
    let target = &board[row * width + col];
    let mut count = 0;
    let (mut r, mut c) = (row, col);
    while let Some((nr, nc)) = offset(r, c, dr, dc, width, height) {
        if board[nr * width + nc] != *target {
            break;
        }
        count += 1;
        r = nr;
        c = nc;
    }
    count
}

/// Length of the line of equal cells through `(row, col)` along `axis`, inclusive of the cell.
pub fn line_through<T: PartialEq>(
    board: &[T],
    width: usize,
    height: usize,
    row: usize,
    col: usize,
    axis: (i32, i32),
) -> usize {
    let (dr, dc) = axis;
    1 + run_length(board, width, height, row, col, dr, dc)
        + run_length(board, width, height, row, col, -dr, -dc)
}

/// Checks the whole board for `line_size` consecutive cells equal to `player`.
///
/// # Arguments
/// * `board` - The board data as a flat slice
/// * `width` - Board width
/// * `height` - Board height
/// * `player` - The cell value to look for
/// * `line_size` - Number of consecutive pieces needed to win
pub fn check_line_win<T: PartialEq>(board: &[T], width: usize, height: usize, player: &T, line_size: usize) -> bool {
    for row in 0..height {
        for col in 0..width {
            if board[row * width + col] != *player {
                continue;
            }
            for (dr, dc) in AXES {
                // Only count forward so each line is measured from its first cell.
                if 1 + run_length(board, width, height, row, col, dr, dc) >= line_size {
                    return true;
                }
            }
        }
    }
    false
}

/// Twice the Manhattan distance of `(row, col)` from the centre of a `size`×`size` board.
///
/// Doubling keeps the value integral for even board sizes, where the centre
/// lies between squares.
pub fn center_distance_x2(row: usize, col: usize, size: usize) -> u32 {
    let span = size as i32 - 1;
    ((2 * row as i32 - span).abs() + (2 * col as i32 - span).abs()) as u32
}
