use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::minimax::{best_move, SearchStats};
use super::strategy::{select_heuristic, select_random};
use crate::game::{evaluate, Board, Mark};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "random" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" | "expert" | "minimax" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// Pause the UI inserts before showing the move.
    pub think_delay: Duration,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                difficulty,
                think_delay: Duration::from_millis(500),
            },
            Difficulty::Medium => Self {
                difficulty,
                think_delay: Duration::from_millis(500),
            },
            Difficulty::Hard => Self {
                difficulty,
                think_delay: Duration::from_millis(600),
            },
        }
    }

    pub fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(Difficulty::Medium)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiDecision {
    /// Chosen cell, or `None` when the game is over or the board is full.
    #[serde(rename = "move")]
    pub index: Option<usize>,
    pub mark: Mark,
    pub difficulty: Difficulty,
    /// Minimax value of the chosen move; only the hard tier searches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<i32>,
    pub nodes: u64,
    pub depth_reached: u8,
}

/// Picks moves for one computer player. Holds only its RNG between calls.
pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn select_move(&mut self, board: &Board, mark: Mark) -> Option<usize> {
        self.decide(board, mark).index
    }

    pub fn decide(&mut self, board: &Board, mark: Mark) -> AiDecision {
        let difficulty = self.config.difficulty;
        let mut decision = AiDecision {
            index: None,
            mark,
            difficulty,
            evaluation: None,
            nodes: 0,
            depth_reached: 0,
        };

        if evaluate(board).is_terminal() {
            return decision;
        }

        match difficulty {
            Difficulty::Easy => decision.index = select_random(board, &mut self.rng),
            Difficulty::Medium => decision.index = select_heuristic(board, mark, &mut self.rng),
            Difficulty::Hard => {
                let mut stats = SearchStats::default();
                let choice = best_move(board, mark, &mut stats);
                decision.index = choice.map(|scored| scored.index);
                decision.evaluation = choice.map(|scored| scored.score);
                decision.nodes = stats.nodes;
                decision.depth_reached = stats.depth_reached;
            }
        }

        decision
    }
}
