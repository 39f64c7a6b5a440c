use crate::board::{Board, MAX_PIECES, Position};
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Directions in the order the solver tries them.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// A single-cell slide of the piece at `piece_index` in the caller's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub piece_index: u8,
    pub direction: Direction,
}

impl Move {
    pub fn new(piece_index: u8, direction: Direction) -> Self {
        Move {
            piece_index,
            direction,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece #{} {}", self.piece_index, self.direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    NoSuchPiece(usize),
    Blocked(Move),
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::NoSuchPiece(index) => write!(f, "no piece with index {}", index),
            MoveError::Blocked(mv) => write!(f, "cannot move {}: destination blocked", mv),
        }
    }
}

impl std::error::Error for MoveError {}

/// Where the piece at `index` ends up after sliding one cell in `dir`.
///
/// Returns `None` when there is no piece at `index`, or when the translated
/// rectangle would leave the grid or overlap any other piece. The moving
/// piece never collides with itself.
pub fn destination(board: &Board, index: usize, dir: Direction) -> Option<Position> {
    let piece = board.pieces().get(index)?;
    let (dx, dy) = dir.delta();
    let x = piece.x as i16 + dx as i16;
    let y = piece.y as i16 + dy as i16;

    if !board.in_bounds(x, y, piece.width, piece.height) {
        return None;
    }

    let moved = crate::board::Piece {
        x: x as u8,
        y: y as u8,
        ..*piece
    };
    let blocked = board
        .pieces()
        .iter()
        .enumerate()
        .any(|(i, other)| i != index && moved.overlaps(other));

    if blocked { None } else { Some(moved.position()) }
}

const MAX_MOVES: usize = MAX_PIECES * 4;

/// Legal moves from one board, together with each move's destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moves {
    entries: ArrayVec<(Move, Position), MAX_MOVES>,
}

impl Moves {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Move, Position)> + '_ {
        self.entries.iter().copied()
    }
}

/// Enumerate every legal move, by ascending piece index and then in
/// [`ALL_DIRECTIONS`] order.
pub fn legal_moves(board: &Board) -> Moves {
    let mut entries = ArrayVec::new();
    for index in 0..board.pieces().len() {
        for &dir in &ALL_DIRECTIONS {
            if let Some(dest) = destination(board, index, dir) {
                entries.push((Move::new(index as u8, dir), dest));
            }
        }
    }
    Moves { entries }
}
