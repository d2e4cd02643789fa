use serde::{Deserialize, Serialize};

use super::board::{Board, Line, Mark, LINES};

/// Outcome classification of a board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TerminalResult {
    Ongoing,
    Draw,
    Win { winner: Mark, line: Line },
}

impl TerminalResult {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminalResult::Ongoing)
    }

    pub fn winner(&self) -> Option<Mark> {
        match self {
            TerminalResult::Win { winner, .. } => Some(*winner),
            _ => None,
        }
    }

    pub fn winning_line(&self) -> Option<Line> {
        match self {
            TerminalResult::Win { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Scans the eight lines in order and reports the first completed one.
///
/// Turn legality is not checked: a board with two completed lines reports the
/// earlier line in `LINES`.
pub fn evaluate(board: &Board) -> TerminalResult {
    let cells = board.cells();
    for line in LINES {
        let [a, b, c] = line;
        if let Some(mark) = cells[a].mark() {
            if cells[a] == cells[b] && cells[a] == cells[c] {
                return TerminalResult::Win { winner: mark, line };
            }
        }
    }

    if board.is_full() {
        TerminalResult::Draw
    } else {
        TerminalResult::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{Cell, BOARD_SIZE};

    fn board(layout: &str) -> Board {
        layout.parse().expect("test layout should parse")
    }

    fn all_boards() -> impl Iterator<Item = Board> {
        (0..3usize.pow(BOARD_SIZE as u32)).map(|mut code| {
            let mut cells = [Cell::Empty; BOARD_SIZE];
            for cell in cells.iter_mut() {
                *cell = match code % 3 {
                    0 => Cell::Empty,
                    1 => Cell::X,
                    _ => Cell::O,
                };
                code /= 3;
            }
            Board::from_cells(cells)
        })
    }

    fn has_line(board: &Board) -> bool {
        let cells = board.cells();
        LINES
            .iter()
            .any(|[a, b, c]| !cells[*a].is_empty() && cells[*a] == cells[*b] && cells[*a] == cells[*c])
    }

    #[test]
    fn detects_row_column_and_diagonal() {
        assert_eq!(
            evaluate(&board("XXX OO. ...")),
            TerminalResult::Win {
                winner: Mark::X,
                line: [0, 1, 2]
            }
        );
        assert_eq!(
            evaluate(&board("XO. XO. .O.")),
            TerminalResult::Win {
                winner: Mark::O,
                line: [1, 4, 7]
            }
        );
        assert_eq!(
            evaluate(&board("..X OX. XO.")),
            TerminalResult::Win {
                winner: Mark::X,
                line: [2, 4, 6]
            }
        );
    }

    #[test]
    fn full_board_without_line_is_draw() {
        assert_eq!(evaluate(&board("XOX XOO OXX")), TerminalResult::Draw);
        assert_eq!(evaluate(&Board::new()), TerminalResult::Ongoing);
    }

    #[test]
    fn double_line_reports_first_in_scan_order() {
        // Completes both the top row and the left column.
        let result = evaluate(&board("XXX XOO XOO"));
        assert_eq!(result.winning_line(), Some([0, 1, 2]));
    }

    #[test]
    fn every_board_is_classified_consistently() {
        for candidate in all_boards() {
            match evaluate(&candidate) {
                TerminalResult::Win { winner, line } => {
                    let expected = Cell::from(winner);
                    assert!(
                        line.iter().all(|index| candidate.cells()[*index] == expected),
                        "winning line must hold the winner's mark:\n{candidate}"
                    );
                }
                TerminalResult::Draw => {
                    assert!(candidate.is_full() && !has_line(&candidate));
                }
                TerminalResult::Ongoing => {
                    assert!(!candidate.is_full() && !has_line(&candidate));
                }
            }
        }
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let json = serde_json::to_string(&evaluate(&board("OOO XX. X..")))
            .expect("result should serialize");
        assert_eq!(json, r#"{"status":"win","winner":"O","line":[0,1,2]}"#);
        let json = serde_json::to_string(&TerminalResult::Draw).expect("draw should serialize");
        assert_eq!(json, r#"{"status":"draw"}"#);
    }
}
