//! AI 走子策略（随机、启发式、极小化极大）。

pub mod agent;
pub mod minimax;
pub mod strategy;

pub use agent::{AiAgent, AiConfig, AiDecision, Difficulty};
pub use minimax::{best_move, score_moves, search, select_minimax, ScoredMove, SearchStats};
pub use strategy::{completing_move, select_heuristic, select_random};
