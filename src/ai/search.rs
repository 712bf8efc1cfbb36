use std::time::Duration;

use serde::Serialize;
use web_time::Instant;

use crate::ai::eval::{Evaluator, square_value};
use crate::board::BoardState;
use crate::moves::{Move, MoveMap};
use crate::types::Color;

const MIN_SCORE: f32 = f32::NEG_INFINITY;
const MAX_SCORE: f32 = f32::INFINITY;
const CORNER_PRIORITY: f32 = 1_000.0;
const FLIP_PRIORITY: f32 = 10.0;

/// One root candidate and the score the search gave it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredMove {
    pub score: f32,
    #[serde(rename = "move")]
    pub mv: Move,
}

/// Outcome of one alpha-beta call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub score: f32,
    pub best_move: Option<Move>,
    /// Descending for a maximizing node, ascending for a minimizing one.
    pub ranked: Vec<ScoredMove>,
}

impl SearchOutcome {
    fn leaf(score: f32) -> Self {
        Self {
            score,
            best_move: None,
            ranked: Vec::new(),
        }
    }
}

/// Move recommendation returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// `None` when the searching side has no legal move.
    pub best_move: Option<Move>,
    /// From the searching player's perspective.
    pub score: f32,
    pub ranked: Vec<ScoredMove>,
    pub depth: u8,
    pub nodes: u64,
    pub timed_out: bool,
}

/// Minimax with alpha-beta pruning over disposable copies of a position.
///
/// Leaves are always scored for the fixed perspective player, so maximizing
/// and minimizing nodes alternate instead of negating scores.
pub struct Searcher<'a> {
    evaluator: &'a Evaluator,
    start_time: Instant,
    timeout: Option<Duration>,
    nodes: u64,
    timed_out: bool,
}

impl<'a> Searcher<'a> {
    /// Searcher without a wall-clock budget.
    pub fn new(evaluator: &'a Evaluator) -> Self {
        Self {
            evaluator,
            start_time: Instant::now(),
            timeout: None,
            nodes: 0,
            timed_out: false,
        }
    }

    pub fn with_timeout(evaluator: &'a Evaluator, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::new(evaluator)
        }
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Picks a move for `player` in `state`, searching `depth` plies.
    ///
    /// The position is searched as if `player` were to move. A move is
    /// returned whenever `depth >= 1` and `player` has a legal move, even if
    /// the budget runs out before the first reply is examined.
    pub fn choose_move(&mut self, state: &BoardState, player: Color, depth: u8) -> SearchResult {
        let root = BoardState::with_side(state.board, player);
        let total_pieces = root.board.total_pieces();

        let outcome = self.search(&root, depth, MIN_SCORE, MAX_SCORE, true, player, total_pieces);

        log::debug!(
            "search for {:?}: depth {} best {:?} score {} nodes {} in {:?}{}",
            player,
            depth,
            outcome.best_move.map(|mv| mv.pos),
            outcome.score,
            self.nodes,
            self.start_time.elapsed(),
            if self.timed_out { " (timed out)" } else { "" }
        );

        SearchResult {
            best_move: outcome.best_move,
            score: outcome.score,
            ranked: outcome.ranked,
            depth,
            nodes: self.nodes,
            timed_out: self.timed_out,
        }
    }

    /// Alpha-beta search from `state`.
    ///
    /// `state` is copied once; the recursion applies and undoes moves on that
    /// copy. Leaf scores come from `evaluate(board, perspective, total_pieces)`.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &mut self,
        state: &BoardState,
        depth: u8,
        alpha: f32,
        beta: f32,
        maximizing: bool,
        perspective: Color,
        total_pieces: u8,
    ) -> SearchOutcome {
        self.start_time = Instant::now();
        self.nodes = 0;
        self.timed_out = false;

        let mut scratch = *state;
        self.alphabeta(
            &mut scratch,
            depth,
            alpha,
            beta,
            maximizing,
            perspective,
            total_pieces,
            true,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn alphabeta(
        &mut self,
        state: &mut BoardState,
        depth: u8,
        mut alpha: f32,
        mut beta: f32,
        maximizing: bool,
        perspective: Color,
        total_pieces: u8,
        is_root: bool,
    ) -> SearchOutcome {
        self.nodes += 1;

        if depth == 0 {
            return SearchOutcome::leaf(self.leaf_score(state, perspective, total_pieces));
        }

        // The root is always expanded so that a move can be returned.
        if !is_root && self.deadline_passed() {
            self.timed_out = true;
            return SearchOutcome::leaf(self.leaf_score(state, perspective, total_pieces));
        }

        let side = state.side_to_move;
        let legal = MoveMap::generate(&state.board, side);
        if legal.is_empty() {
            if !state.board.has_legal_move(side.opposite()) {
                return SearchOutcome::leaf(self.leaf_score(state, perspective, total_pieces));
            }

            log::trace!("{:?} has no move at depth {}, passing", side, depth);
            state.pass();
            let child = self.alphabeta(
                state,
                depth - 1,
                alpha,
                beta,
                !maximizing,
                perspective,
                total_pieces,
                false,
            );
            state.pass();
            return SearchOutcome::leaf(child.score);
        }

        let mut ranked = Vec::with_capacity(legal.len());
        let mut best_move = None;
        let mut best_score = if maximizing { MIN_SCORE } else { MAX_SCORE };

        for mv in ordered_moves(&legal) {
            let undo = state.board.apply(mv.index(), side, mv.flips.bits());
            state.side_to_move = side.opposite();
            let child = self.alphabeta(
                state,
                depth - 1,
                alpha,
                beta,
                !maximizing,
                perspective,
                total_pieces.saturating_add(1),
                false,
            );
            state.board.undo(undo);
            state.side_to_move = side;

            let score = child.score;
            ranked.push(ScoredMove { score, mv });

            if maximizing {
                if score > best_score || best_move.is_none() {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score || best_move.is_none() {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        if maximizing {
            ranked.sort_by(|left, right| right.score.total_cmp(&left.score));
        } else {
            ranked.sort_by(|left, right| left.score.total_cmp(&right.score));
        }

        SearchOutcome {
            score: best_score,
            best_move,
            ranked,
        }
    }

    fn leaf_score(&self, state: &BoardState, perspective: Color, total_pieces: u8) -> f32 {
        self.evaluator
            .evaluate(&state.board, perspective, total_pieces)
    }

    fn deadline_passed(&self) -> bool {
        self.timeout
            .is_some_and(|timeout| self.start_time.elapsed() >= timeout)
    }
}

/// Cheap pre-search priority: corners first, then bigger captures, then the
/// positional value of the target square.
fn move_priority(mv: &Move) -> f32 {
    let corner = if mv.pos.is_corner() { CORNER_PRIORITY } else { 0.0 };
    corner + FLIP_PRIORITY * mv.flips.len() as f32 + square_value(mv.index())
}

/// Legal moves, strongest-looking first. Ties keep square order.
fn ordered_moves(legal: &MoveMap) -> Vec<Move> {
    let mut scored: Vec<(f32, Move)> = legal.iter().map(|mv| (move_priority(&mv), mv)).collect();

    scored.sort_by(|(left_priority, left_mv), (right_priority, right_mv)| {
        right_priority
            .total_cmp(left_priority)
            .then_with(|| left_mv.index().cmp(&right_mv.index()))
    });

    scored.into_iter().map(|(_, mv)| mv).collect()
}
