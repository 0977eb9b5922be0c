//! Static scoring of Connect 4 positions

use static_assertions::const_assert;

use crate::board::{Board, GameResult, Player};
use crate::{HEIGHT, WIDTH};

/// The score of a won position, before any adjustment for distance to the win
pub const WIN_SCORE: i32 = 1_000_000_000;

/// Weight of an unblocked four-cell window, indexed by the number of discs in it
pub const LINE_WEIGHTS: [i32; 4] = [0, 1, 8, 64];

/// Weight of each disc in the centre column
pub const CENTER_WEIGHT: i32 = 4;

/// The number of four-cell windows on the board
pub const NUM_WINDOWS: usize =
    HEIGHT * (WIDTH - 3) + WIDTH * (HEIGHT - 3) + 2 * (HEIGHT - 3) * (WIDTH - 3);

/// An upper bound on the magnitude of any non-terminal evaluation
pub const MAX_HEURISTIC: i32 = NUM_WINDOWS as i32 * LINE_WEIGHTS[3] + HEIGHT as i32 * CENTER_WEIGHT;

// terminal scores, even after subtracting the ply count, must stay above any heuristic score
const_assert!(MAX_HEURISTIC < WIN_SCORE - (WIDTH * HEIGHT) as i32);

// (column, row) steps for horizontal, vertical and both diagonal windows
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Scores `board` from `player`'s point of view, higher is better
///
/// Finished games score `WIN_SCORE`, `-WIN_SCORE` or 0. Otherwise every
/// four-cell window holding discs of only one player is worth
/// `LINE_WEIGHTS[discs]` to that player, and centre column discs are worth
/// `CENTER_WEIGHT` each. The opponent's windows count against `player` with
/// the same weights, so `evaluate(b, p) == -evaluate(b, p.other())`.
pub fn evaluate(board: &Board, player: Player) -> i32 {
    match board.game_result() {
        GameResult::Win(winner) if winner == player => return WIN_SCORE,
        GameResult::Win(_) => return -WIN_SCORE,
        GameResult::Draw => return 0,
        GameResult::Ongoing => {}
    }

    let mut score = 0;

    let center = WIDTH / 2;
    for row in 0..board.height(center) {
        score += disc_sign(board, center, row, player) * CENTER_WEIGHT;
    }

    for &(dx, dy) in DIRECTIONS.iter() {
        for column in 0..WIDTH as i32 {
            for row in 0..HEIGHT as i32 {
                let (end_x, end_y) = (column + 3 * dx, row + 3 * dy);
                if end_x >= WIDTH as i32 || end_y < 0 || end_y >= HEIGHT as i32 {
                    continue;
                }
                score += score_window(board, player, (column, row), (dx, dy));
            }
        }
    }

    score
}

fn score_window(board: &Board, player: Player, start: (i32, i32), step: (i32, i32)) -> i32 {
    let mut own = 0;
    let mut opp = 0;
    for i in 0..4 {
        let column = (start.0 + i * step.0) as usize;
        let row = (start.1 + i * step.1) as usize;
        match disc_sign(board, column, row, player) {
            1 => own += 1,
            -1 => opp += 1,
            _ => {}
        }
    }

    // blocked
    if own > 0 && opp > 0 {
        return 0;
    }
    LINE_WEIGHTS[own.min(3)] - LINE_WEIGHTS[opp.min(3)]
}

fn disc_sign(board: &Board, column: usize, row: usize, player: Player) -> i32 {
    match board.cell(column, row).player() {
        Some(owner) if owner == player => 1,
        Some(_) => -1,
        None => 0,
    }
}
