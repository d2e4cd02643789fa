//! Single-ply move pickers used by the easy and medium tiers.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::game::{evaluate, Board, Mark, TerminalResult, CENTER, CORNERS};

/// Any empty cell, uniformly. `None` only when the board is full.
pub fn select_random<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<usize> {
    board.empty_cells().choose(rng).copied()
}

/// Win, else block, else center, else a random corner, else any cell.
///
/// `None` only when the board is full.
pub fn select_heuristic<R: Rng + ?Sized>(board: &Board, mark: Mark, rng: &mut R) -> Option<usize> {
    if let Some(index) = completing_move(board, mark) {
        return Some(index);
    }
    if let Some(index) = completing_move(board, mark.opponent()) {
        return Some(index);
    }

    let cells = board.cells();
    if cells[CENTER].is_empty() {
        return Some(CENTER);
    }

    let open_corners: Vec<usize> = CORNERS
        .iter()
        .copied()
        .filter(|index| cells[*index].is_empty())
        .collect();
    if let Some(corner) = open_corners.choose(rng) {
        return Some(*corner);
    }

    select_random(board, rng)
}

/// First empty cell, in index order, where `mark` would complete a line.
pub fn completing_move(board: &Board, mark: Mark) -> Option<usize> {
    board.empty_cells().into_iter().find(|index| {
        board
            .with_mark(*index, mark)
            .map(|next| matches!(evaluate(&next), TerminalResult::Win { winner, .. } if winner == mark))
            .unwrap_or(false)
    })
}
