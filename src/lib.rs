#[macro_use]
pub mod utils;
pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    best_move, completing_move, score_moves, search, select_heuristic, select_minimax,
    select_random, AiAgent, AiConfig, AiDecision, Difficulty, ScoredMove, SearchStats,
};
pub use game::{
    evaluate, AiRecord, Board, Cell, EngineError, GameMode, GameSession, Line, Mark, Scoreboard,
    SessionConfig, SessionSnapshot, TerminalResult, TwoPlayerRecord, BOARD_SIZE, LINES,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error(error: EngineError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Reads the UI's `string[]` board, reporting malformed input as `InvalidBoard`.
fn board_from_js(value: JsValue) -> Result<Board, JsValue> {
    let tokens: Vec<String> = from_value(value).map_err(|error| {
        to_js_error(EngineError::InvalidBoard {
            reason: error.to_string(),
        })
    })?;
    Board::from_tokens(&tokens).map_err(to_js_error)
}

fn mark_from_str(value: &str) -> Result<Mark, JsValue> {
    Mark::from_str(value).map_err(|_| {
        to_js_error(EngineError::InvalidMark {
            value: value.to_string(),
        })
    })
}

fn difficulty_or_default(value: Option<String>) -> Difficulty {
    value
        .as_deref()
        .and_then(|value| Difficulty::from_str(value).ok())
        .unwrap_or_default()
}

/// Timer delay in milliseconds, saturating at what `setTimeout` accepts.
fn delay_to_millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

fn move_to_js(index: Option<usize>) -> i32 {
    index.map_or(-1, |index| index as i32)
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    result: TerminalResult,
}

#[wasm_bindgen]
pub struct TicTacToeEngine {
    session: GameSession,
    agent: Option<AiAgent>,
}

#[wasm_bindgen]
impl TicTacToeEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(mode: Option<String>, human: Option<String>) -> Result<TicTacToeEngine, JsValue> {
        let mode = mode
            .as_deref()
            .and_then(|value| GameMode::from_str(value).ok())
            .unwrap_or_default();
        let human = match human.as_deref() {
            Some(value) => mark_from_str(value)?,
            None => Mark::X,
        };
        let session = GameSession::new(SessionConfig { mode, human });
        let agent = session.ai_config().map(AiAgent::new);
        Ok(TicTacToeEngine { session, agent })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let snapshot: SessionSnapshot = serde_json::from_str(json).map_err(serde_to_js_error)?;
        let session = GameSession::from_snapshot(snapshot).map_err(to_js_error)?;
        self.agent = session.ai_config().map(AiAgent::new);
        self.session = session;
        Ok(())
    }

    pub fn board(&self) -> Result<JsValue, JsValue> {
        to_value(self.session.board()).map_err(JsValue::from)
    }

    pub fn result(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.result()).map_err(JsValue::from)
    }

    pub fn next_mark(&self) -> String {
        self.session.next_mark().to_string()
    }

    pub fn human(&self) -> String {
        self.session.human().to_string()
    }

    pub fn play(&mut self, index: usize) -> Result<JsValue, JsValue> {
        let result = self.session.play(index).map_err(to_js_error)?;
        to_value(&result).map_err(JsValue::from)
    }

    pub fn ai_to_move(&self) -> bool {
        self.session.ai_to_move()
    }

    pub fn apply_ai_move(&mut self) -> Result<String, JsValue> {
        let Some(agent) = self.agent.as_mut() else {
            return Err(to_js_error(EngineError::NotAiTurn));
        };
        let decision = self.session.play_ai(agent).map_err(to_js_error)?;
        console_log!(
            "ai ({}) played {:?} after {} nodes",
            decision.difficulty,
            decision.index,
            decision.nodes
        );
        let response = AiMoveResponse {
            decision,
            result: self.session.result(),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// Resolves with the computer's decision after the tier's think delay,
    /// without applying it.
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let board = *self.session.board();
        let mark = self.session.next_mark();
        let config = self.session.ai_config();
        let ai_to_move = self.session.ai_to_move();

        future_to_promise(async move {
            let Some(mut config) = config.filter(|_| ai_to_move) else {
                return Err(to_js_error(EngineError::NotAiTurn));
            };
            if let Some(delay_ms) = delay_ms {
                config = config.with_think_delay(Duration::from_millis(u64::from(delay_ms)));
            }
            let delay = delay_to_millis(config.think_delay);
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new(config);
            let decision = agent.decide(&board, mark);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = GameMode::from_str(mode).map_err(|_| {
            JsValue::from_str(&format!("unknown mode {mode:?}"))
        })?;
        self.session.set_mode(mode);
        self.agent = self.session.ai_config().map(AiAgent::new);
        Ok(())
    }

    pub fn set_human(&mut self, human: &str) -> Result<(), JsValue> {
        self.session.set_human(mark_from_str(human)?);
        Ok(())
    }

    pub fn storage_key(&self) -> String {
        self.session.scores().storage_key()
    }

    pub fn scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.scores()).map_err(serde_to_js_error)
    }

    /// Restores a persisted tally; returns `false` if it belongs to another mode.
    pub fn load_scores_json(&mut self, json: &str) -> Result<bool, JsValue> {
        let scores: Scoreboard = serde_json::from_str(json).map_err(serde_to_js_error)?;
        Ok(self.session.load_scores(scores))
    }

    pub fn reset_scores(&mut self) {
        self.session.reset_scores();
    }
}

/// 返回空棋盘（9 个空字符串）。
#[wasm_bindgen(js_name = "emptyBoard")]
pub fn empty_board() -> Result<JsValue, JsValue> {
    to_value(&Board::new()).map_err(JsValue::from)
}

/// 判定棋盘状态：进行中、平局或胜利（附带获胜连线）。
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board = board_from_js(board)?;
    to_value(&evaluate(&board)).map_err(JsValue::from)
}

/// 按难度为指定一方计算走法，返回完整决策（不修改棋盘）。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    mark: Option<String>,
    difficulty: Option<String>,
    seed: Option<u32>,
) -> Result<JsValue, JsValue> {
    let board = board_from_js(board)?;
    let mark = match mark.as_deref() {
        Some(value) => mark_from_str(value)?,
        None => board.mark_to_move(),
    };
    let config = AiConfig::from_difficulty(difficulty_or_default(difficulty));
    let mut agent = match seed {
        Some(seed) => AiAgent::with_seed(config, u64::from(seed)),
        None => AiAgent::new(config),
    };
    let decision = agent.decide(&board, mark);
    to_value(&decision).map_err(JsValue::from)
}

/// 只返回格子下标；无可走位置时返回 -1。
#[wasm_bindgen(js_name = "selectMove")]
pub fn select_move(board: JsValue, mark: &str, difficulty: Option<String>) -> Result<i32, JsValue> {
    let board = board_from_js(board)?;
    let mark = mark_from_str(mark)?;
    let mut agent = AiAgent::new(AiConfig::from_difficulty(difficulty_or_default(difficulty)));
    Ok(move_to_js(agent.select_move(&board, mark)))
}
