use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::board::{Board, bit, in_bounds};
use crate::types::{BOARD_SIZE, Color, NUM_SQUARES};

const OPENING_LIMIT: u8 = 20;
const ENDGAME_START: u8 = 52;

/// `(corner, c_squares, x_square)` for each corner.
const CORNER_NEIGHBOURS: [(usize, [usize; 2], usize); 4] = [
    (0, [1, 8], 9),
    (7, [6, 15], 14),
    (56, [48, 57], 49),
    (63, [55, 62], 54),
];
const CORNER_MASK: u64 = (1 << 0) | (1 << 7) | (1 << 56) | (1 << 63);
const BORDER_MASK: u64 = 0xFF00_0000_0000_00FF | 0x8181_8181_8181_8181;
const EDGE_MASK: u64 = BORDER_MASK & !CORNER_MASK;

#[rustfmt::skip]
const SQUARE_VALUES: [f32; NUM_SQUARES] = [
    100.0, -20.0, 10.0,  5.0,  5.0, 10.0, -20.0, 100.0,
    -20.0, -50.0, -2.0, -2.0, -2.0, -2.0, -50.0, -20.0,
     10.0,  -2.0, -1.0, -1.0, -1.0, -1.0,  -2.0,  10.0,
      5.0,  -2.0, -1.0, -1.0, -1.0, -1.0,  -2.0,   5.0,
      5.0,  -2.0, -1.0, -1.0, -1.0, -1.0,  -2.0,   5.0,
     10.0,  -2.0, -1.0, -1.0, -1.0, -1.0,  -2.0,  10.0,
    -20.0, -50.0, -2.0, -2.0, -2.0, -2.0, -50.0, -20.0,
    100.0, -20.0, 10.0,  5.0,  5.0, 10.0, -20.0, 100.0,
];

/// The four border lines, each listed from one corner to the other.
static EDGE_LINES: Lazy<[[usize; BOARD_SIZE]; 4]> = Lazy::new(|| {
    let mut lines = [[0usize; BOARD_SIZE]; 4];
    for i in 0..BOARD_SIZE {
        lines[0][i] = i;
        lines[1][i] = (BOARD_SIZE - 1) * BOARD_SIZE + i;
        lines[2][i] = i * BOARD_SIZE;
        lines[3][i] = i * BOARD_SIZE + BOARD_SIZE - 1;
    }
    lines
});

/// For every edge square, the line it lies on and its offset within it.
static EDGE_SLOTS: Lazy<[Option<(usize, usize)>; NUM_SQUARES]> = Lazy::new(|| {
    let mut slots = [None; NUM_SQUARES];
    for (line_idx, line) in EDGE_LINES.iter().enumerate() {
        for (offset, &pos) in line.iter().enumerate() {
            if (EDGE_MASK & bit(pos)) != 0 {
                slots[pos] = Some((line_idx, offset));
            }
        }
    }
    slots
});

/// Mask of the (up to) 8 squares around each square.
static NEIGHBOURS: Lazy<[u64; NUM_SQUARES]> = Lazy::new(|| {
    let mut masks = [0u64; NUM_SQUARES];
    for (pos, mask) in masks.iter_mut().enumerate() {
        let row = (pos / BOARD_SIZE) as i32;
        let col = (pos % BOARD_SIZE) as i32;
        for dr in -1..=1 {
            for dc in -1..=1 {
                if (dr, dc) != (0, 0) && in_bounds(row + dr, col + dc) {
                    *mask |= bit(((row + dr) as usize) * BOARD_SIZE + (col + dc) as usize);
                }
            }
        }
    }
    masks
});

/// Game phase, chosen by the number of pieces on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Midgame,
    Endgame,
}

impl Phase {
    pub fn from_total_pieces(total_pieces: u8) -> Self {
        if total_pieces < OPENING_LIMIT {
            Phase::Opening
        } else if total_pieces < ENDGAME_START {
            Phase::Midgame
        } else {
            Phase::Endgame
        }
    }
}

/// Term weights used during one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeights {
    pub piece: f32,
    pub mobility: f32,
    pub corner: f32,
    pub edge: f32,
    pub stability: f32,
    pub positional: f32,
    /// Flat penalty per piece next to an empty corner.
    pub danger_square: f32,
    pub x_square: f32,
    pub c_square: f32,
    pub edge_domination: f32,
}

impl PhaseWeights {
    pub const ZERO: PhaseWeights = PhaseWeights {
        piece: 0.0,
        mobility: 0.0,
        corner: 0.0,
        edge: 0.0,
        stability: 0.0,
        positional: 0.0,
        danger_square: 0.0,
        x_square: 0.0,
        c_square: 0.0,
        edge_domination: 0.0,
    };
}

/// Weight vectors for all phases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalWeights {
    pub opening: PhaseWeights,
    pub midgame: PhaseWeights,
    pub endgame: PhaseWeights,
    /// Swing applied when exactly one side has no move, in every phase.
    pub mobility_lock: f32,
}

impl EvalWeights {
    pub fn for_phase(&self, phase: Phase) -> &PhaseWeights {
        match phase {
            Phase::Opening => &self.opening,
            Phase::Midgame => &self.midgame,
            Phase::Endgame => &self.endgame,
        }
    }
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            opening: PhaseWeights {
                piece: 1.0,
                mobility: 15.0,
                corner: 100.0,
                edge: 2.0,
                stability: 80.0,
                positional: 1.0,
                danger_square: 15.0,
                x_square: 25.0,
                c_square: 10.0,
                edge_domination: 40.0,
            },
            midgame: PhaseWeights {
                piece: 5.0,
                mobility: 10.0,
                corner: 100.0,
                edge: 4.0,
                stability: 100.0,
                positional: 1.0,
                danger_square: 15.0,
                x_square: 25.0,
                c_square: 10.0,
                edge_domination: 40.0,
            },
            endgame: PhaseWeights {
                piece: 20.0,
                mobility: 5.0,
                corner: 120.0,
                edge: 6.0,
                stability: 120.0,
                positional: 0.5,
                danger_square: 15.0,
                x_square: 25.0,
                c_square: 10.0,
                edge_domination: 40.0,
            },
            mobility_lock: 150.0,
        }
    }
}

/// Static heuristic evaluator. Holds only its weights, so scoring is a pure
/// function of the board, the perspective and the piece count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluator {
    weights: EvalWeights,
}

impl Evaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// Scores `board` for `player`; higher is better for `player`.
    pub fn evaluate(&self, board: &Board, player: Color, total_pieces: u8) -> f32 {
        let w = self.weights.for_phase(Phase::from_total_pieces(total_pieces));
        let opponent = player.opposite();
        let me = board.bits(player);
        let opp = board.bits(opponent);
        let empty = !board.occupied();

        let mut score = 0.0f32;

        score += w.piece * diff(me.count_ones(), opp.count_ones());

        let my_moves = board.legal_moves(player).count_ones();
        let opp_moves = board.legal_moves(opponent).count_ones();
        score += w.mobility * diff(my_moves, opp_moves);
        if my_moves == 0 && opp_moves > 0 {
            score -= self.weights.mobility_lock;
        } else if opp_moves == 0 && my_moves > 0 {
            score += self.weights.mobility_lock;
        }

        score += w.corner * diff((me & CORNER_MASK).count_ones(), (opp & CORNER_MASK).count_ones());
        for (corner, c_squares, x_square) in CORNER_NEIGHBOURS {
            if (empty & bit(corner)) == 0 {
                continue;
            }
            for pos in [c_squares[0], c_squares[1], x_square] {
                score -= w.danger_square * owner_sign(me, opp, pos);
            }
            score -= w.x_square * owner_sign(me, opp, x_square);
            for pos in c_squares {
                score -= w.c_square * owner_sign(me, opp, pos);
            }
        }

        score += w.edge * diff((me & EDGE_MASK).count_ones(), (opp & EDGE_MASK).count_ones());

        score += w.stability * (stable_score(board, player) - stable_score(board, opponent));

        let positional: f32 = (0..NUM_SQUARES)
            .map(|pos| SQUARE_VALUES[pos] * owner_sign(me, opp, pos))
            .sum();
        score += w.positional * positional;

        for line in EDGE_LINES.iter() {
            let line_mask = line.iter().fold(0u64, |acc, &pos| acc | bit(pos));
            if (me & line_mask) == line_mask {
                score += w.edge_domination;
            } else if (opp & line_mask) == line_mask {
                score -= w.edge_domination;
            }
        }

        score
    }
}

/// Scores `board` for `player` with the default weights.
pub fn evaluate(board: &Board, player: Color, total_pieces: u8) -> f32 {
    Evaluator::default().evaluate(board, player, total_pieces)
}

/// Static value of a square in the positional table.
pub fn square_value(pos: usize) -> f32 {
    SQUARE_VALUES.get(pos).copied().unwrap_or(0.0)
}

/// Stability credit of `color`: corners and anchored edge pieces count 1,
/// fully enclosed interior pieces count 0.5.
pub(crate) fn stable_score(board: &Board, color: Color) -> f32 {
    let mine = board.bits(color);
    let occupied = board.occupied();
    let mut score = 0.0f32;

    for pos in 0..NUM_SQUARES {
        let square = bit(pos);
        if (mine & square) == 0 {
            continue;
        }

        if (CORNER_MASK & square) != 0 {
            score += 1.0;
        } else if let Some((line_idx, offset)) = EDGE_SLOTS[pos] {
            if edge_piece_is_stable(&EDGE_LINES[line_idx], offset, mine, occupied) {
                score += 1.0;
            }
        } else if (NEIGHBOURS[pos] & mine) == NEIGHBOURS[pos] {
            score += 0.5;
        }
    }

    score
}

/// An edge piece can only be bracketed along its own edge. It is safe when
/// the edge is full, or when its own color runs unbroken to either end.
fn edge_piece_is_stable(line: &[usize; BOARD_SIZE], offset: usize, mine: u64, occupied: u64) -> bool {
    if line.iter().all(|&pos| (occupied & bit(pos)) != 0) {
        return true;
    }
    let toward_start = line[..offset].iter().all(|&pos| (mine & bit(pos)) != 0);
    let toward_end = line[offset + 1..].iter().all(|&pos| (mine & bit(pos)) != 0);
    toward_start || toward_end
}

fn owner_sign(me: u64, opp: u64, pos: usize) -> f32 {
    let square = bit(pos);
    if (me & square) != 0 {
        1.0
    } else if (opp & square) != 0 {
        -1.0
    } else {
        0.0
    }
}

fn diff(mine: u32, theirs: u32) -> f32 {
    mine as f32 - theirs as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(weights: PhaseWeights) -> Evaluator {
        Evaluator::new(EvalWeights {
            opening: weights,
            midgame: weights,
            endgame: weights,
            mobility_lock: 0.0,
        })
    }

    fn midgame_board() -> Board {
        Board::parse(
            "..W.....
             ..WB....
             BBBWB...
             ..WBW...
             ..BWWW..
             ...B.W..
             ........
             ........",
        )
        .expect("valid board")
    }

    #[test]
    fn phase_thresholds_follow_piece_count() {
        assert_eq!(Phase::from_total_pieces(4), Phase::Opening);
        assert_eq!(Phase::from_total_pieces(19), Phase::Opening);
        assert_eq!(Phase::from_total_pieces(20), Phase::Midgame);
        assert_eq!(Phase::from_total_pieces(51), Phase::Midgame);
        assert_eq!(Phase::from_total_pieces(52), Phase::Endgame);
        assert_eq!(Phase::from_total_pieces(64), Phase::Endgame);
    }

    #[test]
    fn start_position_is_balanced_for_both_sides() {
        let board = Board::new();

        assert_eq!(evaluate(&board, Color::Black, 4), 0.0);
        assert_eq!(evaluate(&board, Color::White, 4), 0.0);
    }

    #[test]
    fn evaluate_is_deterministic() {
        let board = midgame_board();
        let evaluator = Evaluator::default();

        let first = evaluator.evaluate(&board, Color::White, 30);
        let second = evaluator.evaluate(&board, Color::White, 30);

        assert_eq!(first, second);
    }

    #[test]
    fn perspectives_are_exact_negations() {
        let board = midgame_board();
        for total in [10, 30, 60] {
            assert_eq!(
                evaluate(&board, Color::Black, total),
                -evaluate(&board, Color::White, total)
            );
        }
    }

    #[test]
    fn piece_weight_grows_with_phase() {
        let board = midgame_board();
        let evaluator = Evaluator::default();
        let piece_only = |phase: &PhaseWeights| PhaseWeights {
            piece: phase.piece,
            ..PhaseWeights::ZERO
        };
        let weights = evaluator.weights();
        let scored = |w: PhaseWeights, total: u8| only(w).evaluate(&board, Color::Black, total);

        let opening = scored(piece_only(&weights.opening), 10);
        let endgame = scored(piece_only(&weights.endgame), 60);

        // black 8, white 9
        assert_eq!(opening, -1.0);
        assert_eq!(endgame, -20.0);
    }

    #[test]
    fn owning_a_corner_scores_highly() {
        let with_corner = Board::parse(
            "B.......
             ........
             ........
             ...WB...
             ...BW...
             ........
             ........
             .......W",
        )
        .expect("valid board");
        let evaluator = only(PhaseWeights {
            corner: 100.0,
            ..PhaseWeights::ZERO
        });

        assert_eq!(evaluator.evaluate(&with_corner, Color::Black, 7), 0.0);

        let black_two = Board::parse(
            "B......B
             ........
             ........
             ...WB...
             ...BW...
             ........
             ........
             .......W",
        )
        .expect("valid board");
        assert_eq!(evaluator.evaluate(&black_two, Color::Black, 8), 100.0);
    }

    #[test]
    fn squares_next_to_empty_corners_are_penalized() {
        let board = Board::parse(
            ".B......
             BB......
             ........
             ........
             ........
             ........
             ........
             B.......",
        )
        .expect("valid board");
        let danger = only(PhaseWeights {
            danger_square: 15.0,
            ..PhaseWeights::ZERO
        });
        let x_only = only(PhaseWeights {
            x_square: 25.0,
            ..PhaseWeights::ZERO
        });
        let c_only = only(PhaseWeights {
            c_square: 10.0,
            ..PhaseWeights::ZERO
        });

        // a1 empty with b1, a2, b2 occupied; a8 is owned so its neighbours are free.
        assert_eq!(danger.evaluate(&board, Color::Black, 4), -45.0);
        assert_eq!(x_only.evaluate(&board, Color::Black, 4), -25.0);
        assert_eq!(c_only.evaluate(&board, Color::Black, 4), -20.0);
        assert_eq!(danger.evaluate(&board, Color::White, 4), 45.0);
    }

    #[test]
    fn stability_counts_corner_anchored_edge_runs() {
        let board = Board::parse(
            "BBBB.B..
             ........
             ........
             ........
             ........
             ........
             ........
             ........",
        )
        .expect("valid board");

        // a1..d1 are anchored on the corner, f1 is not.
        assert_eq!(stable_score(&board, Color::Black), 4.0);
        assert_eq!(stable_score(&board, Color::White), 0.0);
    }

    #[test]
    fn full_edge_makes_every_piece_on_it_stable() {
        let board = Board::parse(
            "WBWBWBWB
             ........
             ........
             ........
             ........
             ........
             ........
             ........",
        )
        .expect("valid board");

        assert_eq!(stable_score(&board, Color::Black), 4.0);
        assert_eq!(stable_score(&board, Color::White), 4.0);
    }

    #[test]
    fn enclosed_interior_piece_earns_half_credit() {
        let board = Board::parse(
            "........
             ........
             ..BBB...
             ..BBB...
             ..BBB...
             ........
             ........
             ........",
        )
        .expect("valid board");

        assert_eq!(stable_score(&board, Color::Black), 0.5);
    }

    #[test]
    fn full_edge_line_earns_domination_bonus() {
        let board = Board::parse(
            "BBBBBBBB
             ........
             ........
             ........
             ........
             ........
             ........
             ........",
        )
        .expect("valid board");
        let evaluator = only(PhaseWeights {
            edge_domination: 40.0,
            ..PhaseWeights::ZERO
        });

        assert_eq!(evaluator.evaluate(&board, Color::Black, 8), 40.0);
        assert_eq!(evaluator.evaluate(&board, Color::White, 8), -40.0);
    }

    #[test]
    fn side_without_moves_takes_mobility_lock_malus() {
        let board = Board::parse(
            "BW......
             ........
             ........
             ........
             ........
             ........
             ........
             ........",
        )
        .expect("valid board");
        let evaluator = Evaluator::new(EvalWeights {
            opening: PhaseWeights::ZERO,
            midgame: PhaseWeights::ZERO,
            endgame: PhaseWeights::ZERO,
            mobility_lock: 150.0,
        });

        assert_eq!(evaluator.evaluate(&board, Color::Black, 2), 150.0);
        assert_eq!(evaluator.evaluate(&board, Color::White, 2), -150.0);
    }

    #[test]
    fn mobility_term_counts_moves_of_each_side() {
        let board = midgame_board();
        let evaluator = only(PhaseWeights {
            mobility: 10.0,
            ..PhaseWeights::ZERO
        });

        // black 7 moves, white 11
        assert_eq!(evaluator.evaluate(&board, Color::Black, 17), -40.0);
        assert_eq!(evaluator.evaluate(&board, Color::White, 17), 40.0);
    }

    #[test]
    fn edge_term_excludes_corners() {
        let board = Board::parse(
            "W.B.....
             ........
             ........
             ........
             ........
             ........
             ........
             ........",
        )
        .expect("valid board");
        let evaluator = only(PhaseWeights {
            edge: 4.0,
            ..PhaseWeights::ZERO
        });

        assert_eq!(evaluator.evaluate(&board, Color::Black, 2), 4.0);
        assert_eq!(evaluator.evaluate(&board, Color::White, 2), -4.0);
    }

    #[test]
    fn positional_term_subtracts_opponent_squares() {
        let board = Board::parse(
            "B.......
             .W......
             ........
             ...B....
             ........
             ........
             ........
             ........",
        )
        .expect("valid board");
        let evaluator = only(PhaseWeights {
            positional: 1.0,
            ..PhaseWeights::ZERO
        });

        // a1 100 + d4 -1 for black, b2 -50 for white
        assert_eq!(evaluator.evaluate(&board, Color::Black, 3), 149.0);
        assert_eq!(evaluator.evaluate(&board, Color::White, 3), -149.0);
    }

    #[test]
    fn square_value_table_favours_corners() {
        assert_eq!(square_value(0), 100.0);
        assert_eq!(square_value(9), -50.0);
        assert_eq!(square_value(27), -1.0);
        assert_eq!(square_value(64), 0.0);
    }
}
