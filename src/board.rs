use crate::error::EngineError;
use crate::types::{BOARD_SIZE, Cell, Color, NUM_SQUARES, Position};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Othello board represented by two bitboards, bit `row * 8 + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
}

/// Prior cell values captured by [`Board::apply`] so that a search can
/// backtrack without copying the board per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
        }
    }

    /// Builds a board from raw masks. Squares set in both masks are kept black.
    pub fn from_bitboards(black: u64, white: u64) -> Self {
        Self {
            black,
            white: white & !black,
        }
    }

    /// Parses eight rows of `B`, `W` and `.`; whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let cells: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        if cells.len() != NUM_SQUARES {
            return Err(EngineError::InvalidBoard(format!(
                "expected {NUM_SQUARES} cells, got {}",
                cells.len()
            )));
        }

        let mut board = Self::from_bitboards(0, 0);
        for (pos, ch) in cells.into_iter().enumerate() {
            match ch {
                'B' | 'b' | 'X' | 'x' => board.black |= bit(pos),
                'W' | 'w' | 'O' | 'o' => board.white |= bit(pos),
                '.' | '-' => {}
                other => {
                    return Err(EngineError::InvalidBoard(format!(
                        "unexpected cell character {other:?} at square {pos}"
                    )));
                }
            }
        }
        Ok(board)
    }

    /// Occupancy mask of one color.
    pub fn bits(&self, color: Color) -> u64 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn occupied(&self) -> u64 {
        self.black | self.white
    }

    pub fn cell(&self, pos: usize) -> Cell {
        let square = bit(pos);
        if (self.black & square) != 0 {
            Cell::Black
        } else if (self.white & square) != 0 {
            Cell::White
        } else {
            Cell::Empty
        }
    }

    /// Cell at a coordinate; off-board coordinates read as empty.
    pub fn cell_at(&self, pos: Position) -> Cell {
        pos.index().map_or(Cell::Empty, |idx| self.cell(idx))
    }

    /// Returns the legal move mask for the given side.
    pub fn legal_moves(&self, color: Color) -> u64 {
        let (me, opp) = self.sides(color);
        let occupied = me | opp;
        let mut legal = 0u64;

        for pos in 0..NUM_SQUARES {
            let move_bit = bit(pos);
            if (occupied & move_bit) != 0 {
                continue;
            }
            if Self::collect_flips(pos, me, opp) != 0 {
                legal |= move_bit;
            }
        }

        legal
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        let (me, opp) = self.sides(color);
        let occupied = me | opp;
        (0..NUM_SQUARES)
            .any(|pos| (occupied & bit(pos)) == 0 && Self::collect_flips(pos, me, opp) != 0)
    }

    /// Opponent squares captured if `color` plays at `pos`; 0 when illegal.
    pub fn flips(&self, pos: usize, color: Color) -> u64 {
        let (me, opp) = self.sides(color);
        Self::collect_flips(pos, me, opp)
    }

    /// Places one stone and flips captured stones.
    /// Returns flipped bit mask. Returns 0 when move is illegal.
    pub fn place(&mut self, pos: usize, color: Color) -> u64 {
        let flips = self.flips(pos, color);
        if flips != 0 {
            self.apply(pos, color, flips);
        }
        flips
    }

    /// Writes a precomputed move and returns what is needed to revert it.
    /// `flips` must come from [`Board::flips`] for the same square and color.
    pub fn apply(&mut self, pos: usize, color: Color, flips: u64) -> Undo {
        let undo = Undo {
            black: self.black,
            white: self.white,
        };

        let (me, opp) = self.sides(color);
        let next_me = me | bit(pos) | flips;
        let next_opp = opp & !flips;

        match color {
            Color::Black => {
                self.black = next_me;
                self.white = next_opp;
            }
            Color::White => {
                self.white = next_me;
                self.black = next_opp;
            }
        }

        undo
    }

    pub fn undo(&mut self, undo: Undo) {
        self.black = undo.black;
        self.white = undo.white;
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    pub fn count_of(&self, color: Color) -> u8 {
        self.bits(color).count_ones() as u8
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        NUM_SQUARES as u8 - self.total_pieces()
    }

    /// Pieces of both colors on the board.
    pub fn total_pieces(&self) -> u8 {
        self.occupied().count_ones() as u8
    }

    pub fn to_array(&self) -> [Cell; NUM_SQUARES] {
        let mut board = [Cell::Empty; NUM_SQUARES];
        for (pos, cell) in board.iter_mut().enumerate() {
            *cell = self.cell(pos);
        }
        board
    }

    fn sides(&self, color: Color) -> (u64, u64) {
        match color {
            Color::Black => (self.black, self.white),
            Color::White => (self.white, self.black),
        }
    }

    fn collect_flips(pos: usize, me: u64, opp: u64) -> u64 {
        if pos >= NUM_SQUARES {
            return 0;
        }

        let move_bit = bit(pos);
        if ((me | opp) & move_bit) != 0 {
            return 0;
        }

        let (row, col) = pos_to_row_col(pos);
        let mut flips = 0u64;

        for (dr, dc) in DIRECTIONS {
            let mut r = row + dr;
            let mut c = col + dc;
            let mut line = 0u64;

            while in_bounds(r, c) {
                let square = bit((r as usize) * BOARD_SIZE + c as usize);
                if (opp & square) != 0 {
                    line |= square;
                } else {
                    if (me & square) != 0 {
                        flips |= line;
                    }
                    break;
                }

                r += dr;
                c += dc;
            }
        }

        flips
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// A board together with the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardState {
    pub board: Board,
    pub side_to_move: Color,
}

impl BoardState {
    /// Standard start position, black to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            side_to_move: Color::Black,
        }
    }

    pub fn with_side(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
        }
    }

    /// Neither side can move.
    pub fn is_terminal(&self) -> bool {
        !self.board.has_legal_move(Color::Black) && !self.board.has_legal_move(Color::White)
    }

    /// Hands the turn to the other side without touching the board.
    pub fn pass(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

pub(crate) fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
