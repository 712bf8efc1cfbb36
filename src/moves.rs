use serde::{Serialize, Serializer};

use crate::board::{Board, bit};
use crate::types::{BOARD_SIZE, Color, NUM_SQUARES, Position};

/// Opponent squares captured by one move, iterated in square order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlipSet(u64);

impl FlipSet {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, pos: Position) -> bool {
        pos.index().is_some_and(|idx| (self.0 & bit(idx)) != 0)
    }

    pub fn iter(self) -> impl Iterator<Item = Position> {
        bitmask_to_indices(self.0).filter_map(Position::from_index)
    }
}

impl Serialize for FlipSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// A legal placement together with the flips it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub pos: Position,
    pub flips: FlipSet,
}

impl Move {
    /// Square index in `0..64`.
    pub fn index(&self) -> usize {
        self.pos.row as usize * BOARD_SIZE + self.pos.col as usize
    }
}

/// Legal moves of one side, keyed by square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveMap {
    flips: [u64; NUM_SQUARES],
    mask: u64,
}

impl MoveMap {
    /// Scans every empty square of `board` for `color`.
    pub fn generate(board: &Board, color: Color) -> Self {
        let mut flips = [0u64; NUM_SQUARES];
        let mut mask = 0u64;
        let empty = !board.occupied();

        for index in bitmask_to_indices(empty) {
            let captured = board.flips(index, color);
            if captured != 0 {
                flips[index] = captured;
                mask |= bit(index);
            }
        }

        Self { flips, mask }
    }

    /// Bitmask of legal target squares.
    pub fn mask(&self) -> u64 {
        self.mask
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    pub fn get(&self, pos: Position) -> Option<Move> {
        let index = pos.index()?;
        let flips = self.flips[index];
        (flips != 0).then_some(Move {
            pos,
            flips: FlipSet(flips),
        })
    }

    /// Moves in square order.
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        bitmask_to_indices(self.mask).filter_map(|index| {
            Position::from_index(index).map(|pos| Move {
                pos,
                flips: FlipSet(self.flips[index]),
            })
        })
    }

    pub fn positions(&self) -> Vec<Position> {
        bitmask_to_indices(self.mask)
            .filter_map(Position::from_index)
            .collect()
    }
}

/// Legal-move map of `color` on `board`.
pub fn legal_moves(board: &Board, color: Color) -> MoveMap {
    MoveMap::generate(board, color)
}

fn bitmask_to_indices(mask: u64) -> impl Iterator<Item = usize> {
    let mut bits = mask;
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let idx = bits.trailing_zeros() as usize;
        bits &= bits - 1;
        Some(idx)
    })
}
