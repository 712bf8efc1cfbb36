use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod moves;
pub mod types;
pub mod wasm;

pub use ai::eval::{EvalWeights, Evaluator, Phase, PhaseWeights, evaluate};
pub use ai::search::{ScoredMove, SearchOutcome, SearchResult, Searcher};
pub use board::{Board, BoardState};
pub use config::{DifficultyTable, DifficultyTier, SessionConfig, TierSettings};
pub use error::{ConfigError, EngineError};
pub use game::{
    FirstLegalMoveSelector, GameController, GameState, MoveSelector, SearchSelector, Transition,
    apply_move, choose_move, is_terminal, legal_moves, new_game, winner,
};
pub use moves::{FlipSet, Move, MoveMap};
pub use types::{Cell, Color, GameResult, GameSnapshot, Position, Winner};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
