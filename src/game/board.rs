use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of cells on the fixed 3x3 grid.
pub const BOARD_SIZE: usize = 9;

/// A winning combination of three cell indices.
pub type Line = [usize; 3];

/// Rows, then columns, then diagonals. Evaluation order depends on this ordering.
pub const LINES: [Line; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

pub const CENTER: usize = 4;
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EngineError {
    #[error("cell index {index} is outside 0..{}", BOARD_SIZE)]
    OutOfRange { index: usize },

    #[error("invalid board: {reason}")]
    InvalidBoard { reason: String },

    #[error("cell {index} is already taken")]
    CellOccupied { index: usize },

    #[error("unknown mark {value:?}")]
    InvalidMark { value: String },

    /// A saved session whose fields contradict each other.
    #[error("invalid session snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("game is already finished")]
    GameFinished,

    #[error("waiting for the computer to move")]
    NotHumanTurn,

    #[error("it is not the computer's turn")]
    NotAiTurn,
}

pub(crate) fn check_index(index: usize) -> Result<usize, EngineError> {
    if index < BOARD_SIZE {
        Ok(index)
    } else {
        Err(EngineError::OutOfRange { index })
    }
}

/// The symbol a player places.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl Default for Mark {
    fn default() -> Self {
        Mark::X
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Mark::X),
            "o" | "O" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of a single cell. Serialized as `""`, `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cell {
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

impl From<Option<Mark>> for Cell {
    fn from(mark: Option<Mark>) -> Self {
        mark.map(Cell::from).unwrap_or(Cell::Empty)
    }
}

impl FromStr for Cell {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "." | "-" | "_" => Ok(Cell::Empty),
            other => other
                .parse::<Mark>()
                .map(Cell::from)
                .map_err(|_| EngineError::InvalidBoard {
                    reason: format!("unknown cell value {other:?}"),
                }),
        }
    }
}

/// Nine cells in row-major order.
///
/// The board does not enforce turn order; it only guarantees its shape and
/// that writes go through validated indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_SIZE],
        }
    }

    pub fn from_cells(cells: [Cell; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Builds a board from string tokens such as the UI's `["X", "", "O", ...]`.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, EngineError> {
        if tokens.len() != BOARD_SIZE {
            return Err(EngineError::InvalidBoard {
                reason: format!("expected {BOARD_SIZE} cells, got {}", tokens.len()),
            });
        }
        let mut board = Board::new();
        for (slot, token) in board.cells.iter_mut().zip(tokens) {
            *slot = token.as_ref().parse()?;
        }
        Ok(board)
    }

    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Result<Cell, EngineError> {
        check_index(index).map(|index| self.cells[index])
    }

    pub fn is_empty_at(&self, index: usize) -> Result<bool, EngineError> {
        self.get(index).map(Cell::is_empty)
    }

    /// Indices of empty cells in ascending order.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    pub fn count(&self, mark: Mark) -> usize {
        let target = Cell::from(mark);
        self.cells.iter().filter(|cell| **cell == target).count()
    }

    /// The mark whose turn it is under alternating play with X first.
    pub fn mark_to_move(&self) -> Mark {
        if self.count(Mark::X) > self.count(Mark::O) {
            Mark::O
        } else {
            Mark::X
        }
    }

    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), EngineError> {
        let index = check_index(index)?;
        if !self.cells[index].is_empty() {
            return Err(EngineError::CellOccupied { index });
        }
        self.cells[index] = Cell::from(mark);
        Ok(())
    }

    /// Copy of the board with `mark` placed at `index`.
    pub fn with_mark(&self, index: usize, mark: Mark) -> Result<Board, EngineError> {
        let mut next = *self;
        next.place(index, mark)?;
        Ok(next)
    }

    pub fn clear(&mut self) {
        self.cells = [Cell::Empty; BOARD_SIZE];
    }

    /// Unchecked write used by the search, which only visits indices it got
    /// from `empty_cells`.
    pub(crate) fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl TryFrom<Vec<Cell>> for Board {
    type Error = EngineError;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        let cells: [Cell; BOARD_SIZE] =
            cells
                .try_into()
                .map_err(|rejected: Vec<Cell>| EngineError::InvalidBoard {
                    reason: format!("expected {BOARD_SIZE} cells, got {}", rejected.len()),
                })?;
        Ok(Board { cells })
    }
}

impl From<Board> for Vec<Cell> {
    fn from(board: Board) -> Self {
        board.cells.to_vec()
    }
}

/// Parses compact layouts such as `"XX. O.. ..."`; whitespace is ignored and
/// `.`, `-` or `_` mark an empty cell.
impl FromStr for Board {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<String> = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect();
        Board::from_tokens(&tokens)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_index, row) in self.cells.chunks(3).enumerate() {
            if row_index > 0 {
                f.write_str("\n")?;
            }
            for cell in row {
                let symbol = match cell {
                    Cell::Empty => ".",
                    Cell::X => "X",
                    Cell::O => "O",
                };
                f.write_str(symbol)?;
            }
        }
        Ok(())
    }
}
