use crate::board::{Board, MAX_CELLS};
use arrayvec::ArrayVec;
use std::fmt;

/// Row-major grid of kind codes, one per cell, with 0 for empty cells.
///
/// Boards that differ only in which same-kind piece sits where produce the
/// same key, so the search treats them as one state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey {
    width: u8,
    cells: ArrayVec<u8, MAX_CELLS>,
}

impl CanonicalKey {
    pub fn of(board: &Board) -> Self {
        let width = board.width() as usize;
        let mut cells: ArrayVec<u8, MAX_CELLS> = (0..width * board.height() as usize)
            .map(|_| 0)
            .collect();
        for piece in board.pieces() {
            let code = piece.kind.code();
            for y in piece.y..piece.y + piece.height {
                for x in piece.x..piece.x + piece.width {
                    cells[y as usize * width + x as usize] = code;
                }
            }
        }
        CanonicalKey {
            width: board.width(),
            cells,
        }
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for code in row {
                write!(f, "{}", code)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
