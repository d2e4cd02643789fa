//! Full-depth minimax with alpha-beta pruning for the hard tier.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::game::{evaluate, Board, Cell, Mark, TerminalResult};

/// Score of an immediate win; each extra ply costs one point.
pub const WIN_SCORE: i32 = 10;

const INFINITY: i32 = i32::MAX / 2;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth_reached: u8,
}

impl SearchStats {
    fn visit(&mut self, depth: u8) {
        self.nodes += 1;
        self.depth_reached = self.depth_reached.max(depth);
    }
}

/// A root move together with its minimax value for the side to move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredMove {
    pub index: usize,
    pub score: i32,
}

/// A hypothetical mark on the board that is taken back when dropped, so the
/// cell is restored on every exit path including pruning breaks.
struct Placement<'a> {
    board: &'a mut Board,
    index: usize,
}

impl<'a> Placement<'a> {
    fn new(board: &'a mut Board, index: usize, mark: Mark) -> Self {
        board.set(index, Cell::from(mark));
        Self { board, index }
    }
}

impl Deref for Placement<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Placement<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Placement<'_> {
    fn drop(&mut self) {
        self.board.set(self.index, Cell::Empty);
    }
}

/// Value of `board` for `mark`, where `maximizing` says whether `mark` is the
/// side to move. `depth` is the number of plies already played below the root.
///
/// The board is mutated during the search and left exactly as it was found.
pub fn search(
    board: &mut Board,
    depth: u8,
    maximizing: bool,
    mark: Mark,
    mut alpha: i32,
    mut beta: i32,
    stats: &mut SearchStats,
) -> i32 {
    stats.visit(depth);

    match evaluate(board) {
        TerminalResult::Win { winner, .. } if winner == mark => return WIN_SCORE - depth as i32,
        TerminalResult::Win { .. } => return depth as i32 - WIN_SCORE,
        TerminalResult::Draw => return 0,
        TerminalResult::Ongoing => {}
    }

    let mover = if maximizing { mark } else { mark.opponent() };

    if maximizing {
        let mut value = -INFINITY;
        for index in board.empty_cells() {
            let mut placed = Placement::new(board, index, mover);
            let score = search(&mut placed, depth + 1, false, mark, alpha, beta, stats);
            drop(placed);
            value = value.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                break;
            }
        }
        value
    } else {
        let mut value = INFINITY;
        for index in board.empty_cells() {
            let mut placed = Placement::new(board, index, mover);
            let score = search(&mut placed, depth + 1, true, mark, alpha, beta, stats);
            drop(placed);
            value = value.min(score);
            beta = beta.min(score);
            if beta <= alpha {
                break;
            }
        }
        value
    }
}

/// Minimax value of every empty cell for `mark`, in index order. Each root
/// child is searched with a full window so its value is exact.
pub fn score_moves(board: &Board, mark: Mark, stats: &mut SearchStats) -> Vec<ScoredMove> {
    if evaluate(board).is_terminal() {
        return Vec::new();
    }

    let mut scratch = *board;
    scratch
        .empty_cells()
        .into_iter()
        .map(|index| {
            let mut placed = Placement::new(&mut scratch, index, mark);
            let score = search(&mut placed, 0, false, mark, -INFINITY, INFINITY, stats);
            ScoredMove { index, score }
        })
        .collect()
}

/// Highest scoring move; ties go to the lowest index.
pub fn best_move(board: &Board, mark: Mark, stats: &mut SearchStats) -> Option<ScoredMove> {
    let mut best: Option<ScoredMove> = None;
    for candidate in score_moves(board, mark, stats) {
        if best.map_or(true, |current| candidate.score > current.score) {
            best = Some(candidate);
        }
    }
    best
}

/// Optimal move for `mark`, or `None` when the game is already decided or
/// the board is full.
pub fn select_minimax(board: &Board, mark: Mark) -> Option<usize> {
    best_move(board, mark, &mut SearchStats::default()).map(|choice| choice.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::strategy::select_heuristic;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn board(layout: &str) -> Board {
        layout.parse().expect("test layout should parse")
    }

    /// Plain minimax without pruning, used as the reference.
    fn exhaustive(board: &mut Board, depth: u8, maximizing: bool, mark: Mark, nodes: &mut u64) -> i32 {
        *nodes += 1;
        match evaluate(board) {
            TerminalResult::Win { winner, .. } if winner == mark => return WIN_SCORE - depth as i32,
            TerminalResult::Win { .. } => return depth as i32 - WIN_SCORE,
            TerminalResult::Draw => return 0,
            TerminalResult::Ongoing => {}
        }
        let mover = if maximizing { mark } else { mark.opponent() };
        let scores = board.empty_cells().into_iter().map(|index| {
            board.set(index, Cell::from(mover));
            let score = exhaustive(board, depth + 1, !maximizing, mark, nodes);
            board.set(index, Cell::Empty);
            score
        });
        let scores: Vec<i32> = scores.collect();
        if maximizing {
            scores.into_iter().max().unwrap_or(0)
        } else {
            scores.into_iter().min().unwrap_or(0)
        }
    }

    fn exhaustive_scores(board: &Board, mark: Mark, nodes: &mut u64) -> Vec<ScoredMove> {
        if evaluate(board).is_terminal() {
            return Vec::new();
        }
        let mut scratch = *board;
        scratch
            .empty_cells()
            .into_iter()
            .map(|index| {
                scratch.set(index, Cell::from(mark));
                let score = exhaustive(&mut scratch, 0, false, mark, nodes);
                scratch.set(index, Cell::Empty);
                ScoredMove { index, score }
            })
            .collect()
    }

    fn reachable_positions() -> Vec<Board> {
        let mut seen = HashSet::new();
        let mut stack = vec![Board::new()];
        let mut positions = Vec::new();
        while let Some(position) = stack.pop() {
            if !seen.insert(position) {
                continue;
            }
            positions.push(position);
            if evaluate(&position).is_terminal() {
                continue;
            }
            let mark = position.mark_to_move();
            for index in position.empty_cells() {
                let next = position.with_mark(index, mark).expect("empty cell accepts a mark");
                stack.push(next);
            }
        }
        positions
    }

    #[test]
    fn takes_the_immediate_win() {
        assert_eq!(select_minimax(&board("XX. O.. ..."), Mark::X), Some(2));
    }

    #[test]
    fn blocks_the_immediate_threat() {
        assert_eq!(select_minimax(&board("... OO. ..."), Mark::X), Some(5));
    }

    #[test]
    fn prefers_faster_wins() {
        // The direct win at 2 outscores every slower winning line.
        let choice = best_move(&board("XX. OO. ..."), Mark::X, &mut SearchStats::default())
            .expect("ongoing board has a move");
        assert_eq!(choice, ScoredMove { index: 2, score: WIN_SCORE });
    }

    #[test]
    fn decided_or_full_board_yields_no_move() {
        assert_eq!(select_minimax(&board("XXX OO. ..."), Mark::O), None);
        assert_eq!(select_minimax(&board("XOX XOO OXX"), Mark::X), None);
    }

    #[test]
    fn search_restores_the_board() {
        let mut position = board("X.. .O. ...");
        let before = position;
        let mut stats = SearchStats::default();
        let _ = search(&mut position, 0, true, Mark::X, -INFINITY, INFINITY, &mut stats);
        assert_eq!(position, before, "search must undo every placement");
        assert!(stats.nodes > 1);
        assert!(stats.depth_reached <= 7);
    }

    #[test]
    fn empty_board_is_a_draw_with_best_play() {
        let scores = score_moves(&Board::new(), Mark::X, &mut SearchStats::default());
        assert_eq!(scores.len(), 9);
        assert!(scores.iter().all(|scored| scored.score == 0));
        assert_eq!(select_minimax(&Board::new(), Mark::X), Some(0));
    }

    #[test]
    fn pruning_visits_fewer_nodes_than_exhaustive_search() {
        let mut pruned = SearchStats::default();
        let _ = score_moves(&Board::new(), Mark::X, &mut pruned);
        let mut exhaustive_nodes = 0;
        let _ = exhaustive_scores(&Board::new(), Mark::X, &mut exhaustive_nodes);
        assert!(
            pruned.nodes < exhaustive_nodes,
            "pruned {} vs exhaustive {}",
            pruned.nodes,
            exhaustive_nodes
        );
    }

    #[test]
    fn pruning_matches_exhaustive_search_on_reachable_positions() {
        for position in reachable_positions() {
            let mark = position.mark_to_move();
            let mut nodes = 0;
            let expected = exhaustive_scores(&position, mark, &mut nodes);
            let actual = score_moves(&position, mark, &mut SearchStats::default());
            assert_eq!(actual, expected, "scores differ for\n{position}");

            let expected_best = expected
                .iter()
                .fold(None::<ScoredMove>, |best, candidate| match best {
                    Some(current) if current.score >= candidate.score => Some(current),
                    _ => Some(*candidate),
                })
                .map(|choice| choice.index);
            assert_eq!(select_minimax(&position, mark), expected_best);
        }
    }

    fn assert_minimax_never_loses(position: &mut Board, to_move: Mark, minimax_mark: Mark) {
        let result = evaluate(position);
        if result.is_terminal() {
            assert_ne!(
                result.winner(),
                Some(minimax_mark.opponent()),
                "minimax lost:\n{position}"
            );
            return;
        }

        if to_move == minimax_mark {
            let index = select_minimax(position, minimax_mark).expect("ongoing board has a move");
            position.place(index, minimax_mark).expect("minimax must pick an empty cell");
            assert_minimax_never_loses(position, to_move.opponent(), minimax_mark);
            position.set(index, Cell::Empty);
        } else {
            for index in position.empty_cells() {
                position.set(index, Cell::from(to_move));
                assert_minimax_never_loses(position, to_move.opponent(), minimax_mark);
                position.set(index, Cell::Empty);
            }
        }
    }

    #[test]
    fn never_loses_against_any_reply_sequence() {
        assert_minimax_never_loses(&mut Board::new(), Mark::X, Mark::X);
        assert_minimax_never_loses(&mut Board::new(), Mark::X, Mark::O);
    }

    #[test]
    fn self_play_ends_in_a_draw() {
        let mut position = Board::new();
        let mut mark = Mark::X;
        while !evaluate(&position).is_terminal() {
            let index = select_minimax(&position, mark).expect("ongoing board has a move");
            position.place(index, mark).expect("minimax must pick an empty cell");
            mark = mark.opponent();
        }
        assert_eq!(evaluate(&position), TerminalResult::Draw);
    }

    #[test]
    fn never_loses_to_the_heuristic() {
        for seed in 0..20 {
            for minimax_mark in [Mark::X, Mark::O] {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut position = Board::new();
                let mut mark = Mark::X;
                while !evaluate(&position).is_terminal() {
                    let choice = if mark == minimax_mark {
                        select_minimax(&position, mark)
                    } else {
                        select_heuristic(&position, mark, &mut rng)
                    };
                    let index = choice.expect("ongoing board has a move");
                    position.place(index, mark).expect("strategies pick empty cells");
                    mark = mark.opponent();
                }
                assert_ne!(evaluate(&position).winner(), Some(minimax_mark.opponent()));
            }
        }
    }
}
