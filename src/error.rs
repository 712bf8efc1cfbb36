use thiserror::Error;

/// Errors raised by the game controller and board setup.
///
/// None of these is fatal: a rejected request leaves the game untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("illegal move at row {row}, col {col}")]
    IllegalMove { row: u8, col: u8 },

    #[error("row/col out of range: row {row}, col {col}")]
    OutOfBounds { row: u8, col: u8 },

    #[error("game is already over")]
    GameOver,

    #[error("cannot pass while a legal move is available")]
    PassNotAllowed,

    #[error("AI could not select a move")]
    NoMoveSelected,

    #[error("invalid board: {0}")]
    InvalidBoard(String),
}

/// Errors raised while loading difficulty or evaluation configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("unknown difficulty tier: {0}")]
    UnknownTier(String),

    #[error("tier {tier} is invalid: {reason}")]
    InvalidTier { tier: String, reason: String },

    #[error("tier {tier} must search at least as deep and as long as {previous}")]
    NonMonotonic { tier: String, previous: String },
}
