//! 棋盘、胜负判定与对局状态。

pub mod board;
pub mod rules;
pub mod score;
pub mod session;

pub use board::{Board, Cell, EngineError, Line, Mark, BOARD_SIZE, CENTER, CORNERS, LINES};
pub use rules::{evaluate, TerminalResult};
pub use score::{AiRecord, Scoreboard, TwoPlayerRecord};
pub use session::{GameMode, GameSession, SessionConfig, SessionSnapshot};
