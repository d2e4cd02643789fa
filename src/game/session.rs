use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::board::{Board, EngineError, Mark};
use super::rules::{evaluate, TerminalResult};
use super::score::Scoreboard;
use crate::ai::{AiAgent, AiConfig, AiDecision, Difficulty};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameMode {
    Ai { difficulty: Difficulty },
    TwoPlayer,
}

impl GameMode {
    pub fn difficulty(&self) -> Option<Difficulty> {
        match self {
            GameMode::Ai { difficulty } => Some(*difficulty),
            GameMode::TwoPlayer => None,
        }
    }

    pub fn fresh_scoreboard(&self) -> Scoreboard {
        match self {
            GameMode::Ai { difficulty } => Scoreboard::for_ai(*difficulty),
            GameMode::TwoPlayer => Scoreboard::for_two_player(),
        }
    }
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::Ai {
            difficulty: Difficulty::default(),
        }
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "two" | "two-player" | "two_player" | "pvp" => Ok(GameMode::TwoPlayer),
            other => other
                .parse::<Difficulty>()
                .map(|difficulty| GameMode::Ai { difficulty }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: GameMode,
    /// Mark the human plays against the computer. Ignored in two-player mode.
    #[serde(default)]
    pub human: Mark,
}

/// Saved form of a [`GameSession`], as produced by serializing one. Nothing in
/// it is trusted until [`GameSession::from_snapshot`] has checked it.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSnapshot {
    pub config: SessionConfig,
    pub board: Board,
    pub next: Mark,
    pub result: TerminalResult,
    pub scores: Scoreboard,
}

/// One game table: the authoritative board, whose turn it is, and the running
/// tally for the selected mode. X always opens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "SessionSnapshot")]
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    next: Mark,
    result: TerminalResult,
    scores: Scoreboard,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            board: Board::new(),
            next: Mark::X,
            result: TerminalResult::Ongoing,
            scores: config.mode.fresh_scoreboard(),
        }
    }

    /// Rebuilds a session from a snapshot, rejecting one that could not have
    /// come out of play: impossible mark counts, the wrong side to move, a
    /// stored result that disagrees with the board, or a tally kept for
    /// another mode.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self, EngineError> {
        let SessionSnapshot {
            config,
            board,
            next,
            result,
            scores,
        } = snapshot;

        let x = board.count(Mark::X);
        let o = board.count(Mark::O);
        if x != o && x != o + 1 {
            return Err(invalid_snapshot(format!("X has {x} marks and O has {o}")));
        }
        if next != board.mark_to_move() {
            return Err(invalid_snapshot(format!(
                "{next} is recorded to move but the board gives the turn to {}",
                board.mark_to_move()
            )));
        }

        let actual = evaluate(&board);
        if result != actual {
            return Err(invalid_snapshot(format!(
                "stored result {result:?} does not match the board ({actual:?})"
            )));
        }
        // Play stops at the first line, so the winner made the last move.
        if actual.winner() == Some(next) {
            return Err(invalid_snapshot(format!("moves were played after {next} won")));
        }

        if !scores.same_mode(&config.mode.fresh_scoreboard()) {
            return Err(invalid_snapshot(format!(
                "scores stored under {} do not belong to this mode",
                scores.storage_key()
            )));
        }

        Ok(Self {
            config,
            board,
            next,
            result,
            scores,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_mark(&self) -> Mark {
        self.next
    }

    pub fn result(&self) -> TerminalResult {
        self.result
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn human(&self) -> Mark {
        self.config.human
    }

    pub fn scores(&self) -> &Scoreboard {
        &self.scores
    }

    /// Agent settings matching the current mode, if the mode has a computer player.
    pub fn ai_config(&self) -> Option<AiConfig> {
        self.config.mode.difficulty().map(AiConfig::from_difficulty)
    }

    pub fn ai_to_move(&self) -> bool {
        matches!(self.config.mode, GameMode::Ai { .. })
            && !self.result.is_terminal()
            && self.next != self.config.human
    }

    /// Places the next mark at `index` on behalf of a human player.
    pub fn play(&mut self, index: usize) -> Result<TerminalResult, EngineError> {
        if self.result.is_terminal() {
            return Err(EngineError::GameFinished);
        }
        if self.ai_to_move() {
            return Err(EngineError::NotHumanTurn);
        }
        self.apply(index)
    }

    /// Lets `agent` move for the computer side. A decision without a move
    /// leaves the board untouched.
    pub fn play_ai(&mut self, agent: &mut AiAgent) -> Result<AiDecision, EngineError> {
        if self.result.is_terminal() {
            return Err(EngineError::GameFinished);
        }
        if !self.ai_to_move() {
            return Err(EngineError::NotAiTurn);
        }

        let decision = agent.decide(&self.board, self.next);
        if let Some(index) = decision.index {
            self.apply(index)?;
        }
        Ok(decision)
    }

    fn apply(&mut self, index: usize) -> Result<TerminalResult, EngineError> {
        self.board.place(index, self.next)?;
        self.next = self.next.opponent();
        self.result = evaluate(&self.board);
        if self.result.is_terminal() {
            self.scores.record(&self.result, self.config.human);
            console_log!("game finished: {:?}", self.result);
        }
        Ok(self.result)
    }

    /// Clears the board for a new game, keeping the tally.
    pub fn restart(&mut self) {
        self.board.clear();
        self.next = Mark::X;
        self.result = TerminalResult::Ongoing;
    }

    /// Switches mode, starting a fresh tally for it.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.config.mode = mode;
        self.scores = mode.fresh_scoreboard();
        self.restart();
    }

    pub fn set_human(&mut self, human: Mark) {
        self.config.human = human;
        self.restart();
    }

    /// Adopts a persisted tally if it belongs to the current mode.
    pub fn load_scores(&mut self, scores: Scoreboard) -> bool {
        if !self.scores.same_mode(&scores) {
            return false;
        }
        self.scores = scores;
        true
    }

    pub fn reset_scores(&mut self) {
        self.scores.reset();
    }
}

impl TryFrom<SessionSnapshot> for GameSession {
    type Error = EngineError;

    fn try_from(snapshot: SessionSnapshot) -> Result<Self, Self::Error> {
        GameSession::from_snapshot(snapshot)
    }
}

fn invalid_snapshot(reason: String) -> EngineError {
    EngineError::InvalidSnapshot { reason }
}
