use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Piece color, also used to name the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Contents of one board square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Builds a coordinate from a square index in `0..64`.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < NUM_SQUARES {
            Some(Self {
                row: (index / BOARD_SIZE) as u8,
                col: (index % BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// Row-major square index, `None` when off the board.
    pub fn index(self) -> Option<usize> {
        if (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE {
            Some(self.row as usize * BOARD_SIZE + self.col as usize)
        } else {
            None
        }
    }

    pub fn is_corner(self) -> bool {
        let last = (BOARD_SIZE - 1) as u8;
        (self.row == 0 || self.row == last) && (self.col == 0 || self.col == last)
    }
}

/// Final outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Black,
    White,
    Draw,
}

impl Winner {
    pub fn from_counts(black: u8, white: u8) -> Self {
        if black > white {
            Winner::Black
        } else if white > black {
            Winner::White
        } else {
            Winner::Draw
        }
    }
}

/// Public game state returned to frontends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub board: Vec<Cell>,
    pub side_to_move: Color,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    /// `None` until the game is over.
    pub winner: Option<Winner>,
    /// Contract:
    /// - `true` when the previous transition included a pass, either a
    ///   standalone pass or a move after which the opponent had to pass.
    /// - `false` when the previous action was a normal move.
    pub is_pass: bool,
    /// Contract:
    /// - Move (including one the opponent must answer with a pass): the
    ///   positions that move flipped.
    /// - Standalone pass: empty.
    pub flipped: Vec<Position>,
    pub last_move: Option<Position>,
    pub legal_moves: Vec<Position>,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: Winner,
    pub black_count: u8,
    pub white_count: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_index_round_trips_for_all_squares() {
        for index in 0..NUM_SQUARES {
            let pos = Position::from_index(index).expect("in range");
            assert_eq!(pos.index(), Some(index));
        }
        assert_eq!(Position::from_index(64), None);
        assert_eq!(Position::new(8, 0).index(), None);
    }

    #[test]
    fn only_four_corners_are_corners() {
        let corners = (0..NUM_SQUARES)
            .filter_map(Position::from_index)
            .filter(|pos| pos.is_corner())
            .count();
        assert_eq!(corners, 4);
    }

    #[test]
    fn winner_requires_strictly_more_pieces() {
        assert_eq!(Winner::from_counts(33, 31), Winner::Black);
        assert_eq!(Winner::from_counts(10, 54), Winner::White);
        assert_eq!(Winner::from_counts(32, 32), Winner::Draw);
    }
}
