use std::time::Duration;

use crate::ai::eval::Evaluator;
use crate::ai::search::{ScoredMove, SearchResult, Searcher};
use crate::board::{Board, BoardState};
use crate::config::{DifficultyTier, SessionConfig};
use crate::error::EngineError;
use crate::moves::{FlipSet, MoveMap};
use crate::types::{Color, GameResult, GameSnapshot, Position, Winner};

/// Chooses a move for `player`; implementations may search or not.
pub trait MoveSelector: Send + Sync {
    fn select_move(&self, state: &BoardState, player: Color, config: &SessionConfig)
    -> SearchResult;
}

/// Alpha-beta search limited by the session's difficulty tier.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchSelector;

impl MoveSelector for SearchSelector {
    fn select_move(
        &self,
        state: &BoardState,
        player: Color,
        config: &SessionConfig,
    ) -> SearchResult {
        let settings = config.settings();
        let evaluator = Evaluator::new(config.weights);
        Searcher::with_timeout(&evaluator, settings.time_budget()).choose_move(
            state,
            player,
            settings.depth,
        )
    }
}

/// Deterministic selector that plays the lowest-indexed legal square.
/// Useful for reproducible self-play and scripted opponents.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(
        &self,
        state: &BoardState,
        player: Color,
        _config: &SessionConfig,
    ) -> SearchResult {
        SearchResult {
            best_move: MoveMap::generate(&state.board, player).iter().next(),
            score: 0.0,
            ranked: Vec::new(),
            depth: 0,
            nodes: 0,
            timed_out: false,
        }
    }
}

/// What a successful move request did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A piece was placed. `opponent_passed` is set when the opponent had no
    /// reply and the turn came back to the mover.
    Moved {
        pos: Position,
        flipped: FlipSet,
        opponent_passed: bool,
    },
    /// The side to move had no legal move; only the turn changed.
    Passed,
}

/// Authoritative game state: position, terminal flag and outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub position: BoardState,
    pub is_terminal: bool,
    /// Only set once the game is terminal.
    pub winner: Option<Winner>,
}

impl GameState {
    /// Standard start position, black to move.
    pub fn new() -> Self {
        Self::from_position(Board::new(), Color::Black)
    }

    /// Wraps an arbitrary position. The side to move is kept as given even if
    /// it has no legal move; the next move request will pass for it.
    pub fn from_position(board: Board, side_to_move: Color) -> Self {
        let mut state = Self {
            position: BoardState::with_side(board, side_to_move),
            is_terminal: false,
            winner: None,
        };
        if state.position.is_terminal() {
            state.finish();
        }
        state
    }

    pub fn board(&self) -> &Board {
        &self.position.board
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn legal_moves(&self, player: Color) -> MoveMap {
        MoveMap::generate(&self.position.board, player)
    }

    /// Plays `pos` for the side to move, or passes when that side has no
    /// legal move at all. Off-board coordinates are rejected before the pass
    /// check. Rejected requests leave the state unchanged.
    pub fn play(&mut self, pos: Position) -> Result<Transition, EngineError> {
        if self.is_terminal {
            return Err(EngineError::GameOver);
        }
        if pos.index().is_none() {
            return Err(EngineError::OutOfBounds {
                row: pos.row,
                col: pos.col,
            });
        }

        let mover = self.position.side_to_move;
        let legal = self.legal_moves(mover);
        if legal.is_empty() {
            self.pass_turn();
            return Ok(Transition::Passed);
        }

        let Some(mv) = legal.get(pos) else {
            log::warn!("rejected illegal move {:?} for {:?}", pos, mover);
            return Err(EngineError::IllegalMove {
                row: pos.row,
                col: pos.col,
            });
        };

        let _ = self
            .position
            .board
            .apply(mv.index(), mover, mv.flips.bits());

        let opponent = mover.opposite();
        let opponent_passed = if self.position.board.has_legal_move(opponent) {
            self.position.side_to_move = opponent;
            false
        } else if self.position.board.has_legal_move(mover) {
            log::debug!("{:?} has no reply, turn returns to {:?}", opponent, mover);
            true
        } else {
            self.finish();
            false
        };

        Ok(Transition::Moved {
            pos,
            flipped: mv.flips,
            opponent_passed,
        })
    }

    /// Explicit pass, only allowed when the side to move cannot play.
    pub fn pass(&mut self) -> Result<(), EngineError> {
        if self.is_terminal {
            return Err(EngineError::GameOver);
        }
        if self.position.board.has_legal_move(self.position.side_to_move) {
            return Err(EngineError::PassNotAllowed);
        }
        self.pass_turn();
        Ok(())
    }

    fn pass_turn(&mut self) {
        log::debug!("{:?} passes", self.position.side_to_move);
        self.position.pass();
        if !self.position.board.has_legal_move(self.position.side_to_move) {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let (black, white) = self.position.board.count();
        let winner = Winner::from_counts(black, white);
        log::info!("game over: {:?} (black {} - white {})", winner, black, white);
        self.is_terminal = true;
        self.winner = Some(winner);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Starts a new game.
pub fn new_game() -> GameState {
    GameState::new()
}

/// Legal moves of `player` keyed by square, each with its flip set.
pub fn legal_moves(state: &GameState, player: Color) -> MoveMap {
    state.legal_moves(player)
}

/// Returns the state after `pos` is played by the side to move. The input
/// state is never modified.
pub fn apply_move(state: &GameState, pos: Position) -> Result<GameState, EngineError> {
    let mut next = *state;
    next.play(pos)?;
    Ok(next)
}

pub fn is_terminal(state: &GameState) -> bool {
    state.is_terminal
}

pub fn winner(state: &GameState) -> Option<Winner> {
    state.winner
}

/// Searches `depth` plies for `ai_player` with the default evaluation.
pub fn choose_move(
    state: &GameState,
    ai_player: Color,
    depth: u8,
    time_budget: Option<Duration>,
) -> SearchResult {
    let evaluator = Evaluator::default();
    let mut searcher = match time_budget {
        Some(budget) => Searcher::with_timeout(&evaluator, budget),
        None => Searcher::new(&evaluator),
    };
    searcher.choose_move(&state.position, ai_player, depth)
}

/// Owns one game: the authoritative state, its session settings and the
/// history the frontends display.
pub struct GameController {
    state: GameState,
    config: SessionConfig,
    pub is_pass: bool,
    pub flipped: Vec<Position>,
    pub last_move: Option<Position>,
    /// Applied coordinates in order; `None` marks a pass.
    history: Vec<Option<Position>>,
    decision_log: Vec<ScoredMove>,
    selector: Box<dyn MoveSelector>,
}

impl GameController {
    pub fn new(config: SessionConfig, selector: Box<dyn MoveSelector>) -> Self {
        Self {
            state: GameState::new(),
            config,
            is_pass: false,
            flipped: Vec::new(),
            last_move: None,
            history: Vec::new(),
            decision_log: Vec::new(),
            selector,
        }
    }

    pub fn new_with_default_selector(config: SessionConfig) -> Self {
        Self::new(config, Box::new(SearchSelector))
    }

    /// Starts from a set-up position. A side without moves passes immediately.
    pub fn from_board(
        config: SessionConfig,
        selector: Box<dyn MoveSelector>,
        board: Board,
        side_to_move: Color,
    ) -> Self {
        let mut controller = Self::new(config, selector);
        controller.state = GameState::from_position(board, side_to_move);
        controller.settle();
        controller
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_difficulty(&mut self, difficulty: DifficultyTier) {
        self.config.difficulty = difficulty;
    }

    pub fn history(&self) -> &[Option<Position>] {
        &self.history
    }

    /// Ranked root candidates of the last AI move.
    pub fn decision_log(&self) -> &[ScoredMove] {
        &self.decision_log
    }

    pub fn has_legal_moves_for_current(&self) -> bool {
        self.state
            .board()
            .has_legal_move(self.state.side_to_move())
    }

    /// Plays a human move for the side to move.
    pub fn place(&mut self, row: u8, col: u8) -> Result<Transition, EngineError> {
        let transition = self.state.play(Position::new(row, col))?;
        self.record(transition);
        Ok(transition)
    }

    pub fn pass(&mut self) -> Result<(), EngineError> {
        self.state.pass()?;
        self.record(Transition::Passed);
        Ok(())
    }

    /// Runs the configured selector for the side to move and applies its pick.
    pub fn play_ai_move(&mut self) -> Result<SearchResult, EngineError> {
        if self.state.is_terminal {
            return Err(EngineError::GameOver);
        }

        let player = self.state.side_to_move();
        let result = self
            .selector
            .select_move(&self.state.position, player, &self.config);
        self.apply_search_result(&result)?;
        Ok(result)
    }

    /// Applies a search result computed elsewhere, exactly like a human move.
    pub fn apply_search_result(&mut self, result: &SearchResult) -> Result<Transition, EngineError> {
        if self.state.is_terminal {
            return Err(EngineError::GameOver);
        }
        let mv = result.best_move.ok_or(EngineError::NoMoveSelected)?;
        let transition = self.state.play(mv.pos)?;
        self.decision_log = result.ranked.clone();
        self.record(transition);
        Ok(transition)
    }

    pub fn get_legal_moves(&self) -> Vec<Position> {
        if self.state.is_terminal {
            return Vec::new();
        }
        self.state
            .legal_moves(self.state.side_to_move())
            .positions()
    }

    pub fn to_snapshot(&self) -> GameSnapshot {
        let (black_count, white_count) = self.state.board().count();
        GameSnapshot {
            board: self.state.board().to_array().to_vec(),
            side_to_move: self.state.side_to_move(),
            black_count,
            white_count,
            is_game_over: self.state.is_terminal,
            winner: self.state.winner,
            is_pass: self.is_pass,
            flipped: self.flipped.clone(),
            last_move: self.last_move,
            legal_moves: self.get_legal_moves(),
        }
    }

    /// Final result, `None` while the game is running.
    pub fn to_game_result(&self) -> Option<GameResult> {
        let winner = self.state.winner?;
        let (black_count, white_count) = self.state.board().count();
        Some(GameResult {
            winner,
            black_count,
            white_count,
        })
    }

    fn settle(&mut self) {
        if !self.state.is_terminal && !self.has_legal_moves_for_current() {
            self.state.pass_turn();
            self.record(Transition::Passed);
        }
    }

    fn record(&mut self, transition: Transition) {
        match transition {
            Transition::Moved {
                pos,
                flipped,
                opponent_passed,
            } => {
                self.is_pass = opponent_passed;
                self.flipped = flipped.iter().collect();
                self.last_move = Some(pos);
                self.history.push(Some(pos));
                if opponent_passed {
                    self.history.push(None);
                }
            }
            Transition::Passed => {
                self.is_pass = true;
                self.flipped.clear();
                self.history.push(None);
            }
        }
    }
}
