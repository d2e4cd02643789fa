use serde::{Deserialize, Serialize};

use super::board::Mark;
use super::rules::TerminalResult;
use crate::ai::Difficulty;

const STORAGE_PREFIX: &str = "tictactoe.scores";

/// Results against the computer, counted from the human's side.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
}

impl AiRecord {
    pub fn record_win(&mut self) {
        self.wins += 1;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
    }

    pub fn record_loss(&mut self) {
        self.losses += 1;
        self.current_streak = 0;
    }

    pub fn record_draw(&mut self) {
        self.draws += 1;
        self.current_streak = 0;
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwoPlayerRecord {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

impl TwoPlayerRecord {
    pub fn games_played(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }
}

/// Score tally for one game mode. Each mode keeps its own record shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scoreboard {
    Ai {
        difficulty: Difficulty,
        record: AiRecord,
    },
    TwoPlayer {
        record: TwoPlayerRecord,
    },
}

impl Scoreboard {
    pub fn for_ai(difficulty: Difficulty) -> Self {
        Scoreboard::Ai {
            difficulty,
            record: AiRecord::default(),
        }
    }

    pub fn for_two_player() -> Self {
        Scoreboard::TwoPlayer {
            record: TwoPlayerRecord::default(),
        }
    }

    /// Key under which the UI persists this tally.
    pub fn storage_key(&self) -> String {
        match self {
            Scoreboard::Ai { difficulty, .. } => {
                format!("{STORAGE_PREFIX}.{}", difficulty.as_str())
            }
            Scoreboard::TwoPlayer { .. } => format!("{STORAGE_PREFIX}.two"),
        }
    }

    /// Whether `other` tracks the same mode as `self`.
    pub fn same_mode(&self, other: &Scoreboard) -> bool {
        match (self, other) {
            (Scoreboard::Ai { difficulty: a, .. }, Scoreboard::Ai { difficulty: b, .. }) => a == b,
            (Scoreboard::TwoPlayer { .. }, Scoreboard::TwoPlayer { .. }) => true,
            _ => false,
        }
    }

    /// Counts a finished game. `human` is only consulted for AI tallies.
    pub fn record(&mut self, result: &TerminalResult, human: Mark) {
        match self {
            Scoreboard::Ai { record, .. } => match result {
                TerminalResult::Ongoing => {}
                TerminalResult::Draw => record.record_draw(),
                TerminalResult::Win { winner, .. } if *winner == human => record.record_win(),
                TerminalResult::Win { .. } => record.record_loss(),
            },
            Scoreboard::TwoPlayer { record } => match result {
                TerminalResult::Ongoing => {}
                TerminalResult::Draw => record.draws += 1,
                TerminalResult::Win { winner: Mark::X, .. } => record.x_wins += 1,
                TerminalResult::Win { winner: Mark::O, .. } => record.o_wins += 1,
            },
        }
    }

    pub fn reset(&mut self) {
        match self {
            Scoreboard::Ai { record, .. } => *record = AiRecord::default(),
            Scoreboard::TwoPlayer { record } => *record = TwoPlayerRecord::default(),
        }
    }
}
