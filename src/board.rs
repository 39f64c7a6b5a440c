use crate::movegen::{self, Move, MoveError, Moves};
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SIZE: usize = 8;
pub const MAX_CELLS: usize = MAX_SIZE * MAX_SIZE;
pub const MAX_PIECES: usize = 32;

/// Top-left cell of a piece, as `(x, y)`.
pub type Position = (u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    King,
    Vertical,
    Horizontal,
    Pawn,
}

impl Kind {
    /// Width and height every piece of this kind occupies.
    pub fn dimensions(&self) -> (u8, u8) {
        match self {
            Kind::King => (2, 2),
            Kind::Vertical => (1, 2),
            Kind::Horizontal => (2, 1),
            Kind::Pawn => (1, 1),
        }
    }

    /// Cell code used by the canonical key. Zero is reserved for empty cells.
    pub fn code(&self) -> u8 {
        match self {
            Kind::King => 1,
            Kind::Vertical => 2,
            Kind::Horizontal => 3,
            Kind::Pawn => 4,
        }
    }

    fn from_dimensions(width: u8, height: u8) -> Option<Kind> {
        match (width, height) {
            (2, 2) => Some(Kind::King),
            (1, 2) => Some(Kind::Vertical),
            (2, 1) => Some(Kind::Horizontal),
            (1, 1) => Some(Kind::Pawn),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::King => write!(f, "King"),
            Kind::Vertical => write!(f, "Vertical"),
            Kind::Horizontal => write!(f, "Horizontal"),
            Kind::Pawn => write!(f, "Pawn"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: Kind,
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub height: u8,
}

impl Piece {
    pub fn new(kind: Kind, x: u8, y: u8) -> Self {
        let (width, height) = kind.dimensions();
        Piece {
            kind,
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Position {
        (self.x, self.y)
    }

    /// Axis-aligned rectangle intersection, computed in `u16` so it holds
    /// for unvalidated pieces too.
    pub fn overlaps(&self, other: &Piece) -> bool {
        let (ax, ay, aw, ah) = self.extent();
        let (bx, by, bw, bh) = other.extent();
        ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
    }

    fn extent(&self) -> (u16, u16, u16, u16) {
        (
            self.x as u16,
            self.y as u16,
            self.width as u16,
            self.height as u16,
        )
    }
}

/// Reasons a board is rejected before any search runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    InvalidDimensions { width: u8, height: u8 },
    TooManyPieces(usize),
    InconsistentDimensions { index: usize, kind: Kind },
    OutOfBounds { index: usize },
    Overlap { first: usize, second: usize },
    InvalidTarget(usize),
    GoalOutOfBounds(Position),
    AmbiguousTarget { target: usize, other: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidDimensions { width, height } => write!(
                f,
                "board size {}x{} must be between 1x1 and {}x{}",
                width, height, MAX_SIZE, MAX_SIZE
            ),
            BoardError::TooManyPieces(count) => write!(
                f,
                "{} pieces exceeds maximum of {}",
                count, MAX_PIECES
            ),
            BoardError::InconsistentDimensions { index, kind } => {
                let (w, h) = kind.dimensions();
                write!(f, "piece {} is a {} but is not {}x{}", index, kind, w, h)
            }
            BoardError::OutOfBounds { index } => write!(f, "piece {} is out of bounds", index),
            BoardError::Overlap { first, second } => {
                write!(f, "pieces {} and {} overlap", first, second)
            }
            BoardError::InvalidTarget(index) => write!(f, "target piece {} does not exist", index),
            BoardError::GoalOutOfBounds((x, y)) => {
                write!(f, "goal ({}, {}) puts the target out of bounds", x, y)
            }
            BoardError::AmbiguousTarget { target, other } => write!(
                f,
                "target piece {} shares its kind with piece {}",
                target, other
            ),
        }
    }
}

impl std::error::Error for BoardError {}

/// A grid plus an ordered list of pieces. The index of a piece in the list
/// is its identity for the lifetime of the board and in every move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u8,
    height: u8,
    pieces: ArrayVec<Piece, MAX_PIECES>,
    target: u8,
    goal: Position,
}

impl Board {
    pub fn new(
        width: u8,
        height: u8,
        pieces: &[Piece],
        target: u8,
        goal: Position,
    ) -> Result<Self, BoardError> {
        let pieces = ArrayVec::try_from(pieces)
            .map_err(|_| BoardError::TooManyPieces(pieces.len()))?;
        let board = Board {
            width,
            height,
            pieces,
            target,
            goal,
        };
        board.validate()?;
        Ok(board)
    }

    /// Build a board whose target is the first King (or piece 0 when there
    /// is none) and whose goal is the bottom-centre placement of the target.
    pub fn with_default_goal(width: u8, height: u8, pieces: &[Piece]) -> Result<Self, BoardError> {
        let target = pieces
            .iter()
            .position(|p| p.kind == Kind::King)
            .unwrap_or(0);
        let goal = pieces
            .get(target)
            .map(|p| default_goal(width, height, p))
            .unwrap_or((0, 0));
        Self::new(width, height, pieces, target as u8, goal)
    }

    /// The classic 4x5 layout. The King is piece 0 and must reach (1, 3).
    pub fn classic() -> Self {
        let pieces = [
            Piece::new(Kind::King, 1, 0),
            Piece::new(Kind::Vertical, 0, 0),
            Piece::new(Kind::Vertical, 3, 0),
            Piece::new(Kind::Vertical, 0, 2),
            Piece::new(Kind::Vertical, 3, 2),
            Piece::new(Kind::Horizontal, 1, 2),
            Piece::new(Kind::Pawn, 1, 3),
            Piece::new(Kind::Pawn, 2, 3),
            Piece::new(Kind::Pawn, 0, 4),
            Piece::new(Kind::Pawn, 3, 4),
        ];
        Board {
            width: 4,
            height: 5,
            pieces: pieces.into_iter().collect(),
            target: 0,
            goal: (1, 3),
        }
    }

    /// Check every precondition the solver relies on.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.width == 0
            || self.height == 0
            || self.width as usize > MAX_SIZE
            || self.height as usize > MAX_SIZE
        {
            return Err(BoardError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        for (index, piece) in self.pieces.iter().enumerate() {
            if (piece.width, piece.height) != piece.kind.dimensions() {
                return Err(BoardError::InconsistentDimensions {
                    index,
                    kind: piece.kind,
                });
            }
            if !self.in_bounds(
                piece.x as i16,
                piece.y as i16,
                piece.width,
                piece.height,
            ) {
                return Err(BoardError::OutOfBounds { index });
            }
        }

        for (first, a) in self.pieces.iter().enumerate() {
            for (second, b) in self.pieces.iter().enumerate().skip(first + 1) {
                if a.overlaps(b) {
                    return Err(BoardError::Overlap { first, second });
                }
            }
        }

        let target = self.target as usize;
        let piece = self
            .pieces
            .get(target)
            .ok_or(BoardError::InvalidTarget(target))?;

        if !self.in_bounds(
            self.goal.0 as i16,
            self.goal.1 as i16,
            piece.width,
            piece.height,
        ) {
            return Err(BoardError::GoalOutOfBounds(self.goal));
        }

        // The canonical key only sees kinds, so the target must be the only
        // piece of its kind for the goal test to survive deduplication.
        if let Some(other) = self
            .pieces
            .iter()
            .enumerate()
            .position(|(i, p)| i != target && p.kind == piece.kind)
        {
            return Err(BoardError::AmbiguousTarget { target, other });
        }

        Ok(())
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, index: usize) -> &Piece {
        &self.pieces[index]
    }

    pub fn target(&self) -> usize {
        self.target as usize
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Whether a `width` x `height` rectangle at `(x, y)` lies inside the grid.
    pub fn in_bounds(&self, x: i16, y: i16, width: u8, height: u8) -> bool {
        x >= 0
            && y >= 0
            && x + width as i16 <= self.width as i16
            && y + height as i16 <= self.height as i16
    }

    /// Check if the target piece sits on the goal (win condition)
    pub fn is_solved(&self) -> bool {
        self.pieces[self.target as usize].position() == self.goal
    }

    /// Slide one piece by one cell, in place. This is the path interactive
    /// callers use; it shares its legality test with the solver.
    pub fn slide(&mut self, mv: Move) -> Result<(), MoveError> {
        let index = mv.piece_index as usize;
        if index >= self.pieces.len() {
            return Err(MoveError::NoSuchPiece(index));
        }
        let (x, y) =
            movegen::destination(self, index, mv.direction).ok_or(MoveError::Blocked(mv))?;
        self.pieces[index].x = x;
        self.pieces[index].y = y;
        Ok(())
    }

    /// Every legal single-cell slide from this position.
    pub fn legal_moves(&self) -> Moves {
        movegen::legal_moves(self)
    }

    /// Apply a sequence of moves to a copy of this board.
    pub fn replay(&self, moves: &[Move]) -> Result<Board, MoveError> {
        let mut board = self.clone();
        for &mv in moves {
            board.slide(mv)?;
        }
        Ok(board)
    }

    /// Copy of this board after `mv`, or `None` if the move is illegal.
    pub fn successor(&self, mv: Move) -> Option<Board> {
        let index = mv.piece_index as usize;
        let dest = movegen::destination(self, index, mv.direction)?;
        Some(self.with_piece_at(index, dest))
    }

    /// Copy of this board with one piece moved to `dest`, which must come
    /// from [`movegen::destination`].
    pub(crate) fn with_piece_at(&self, index: usize, dest: Position) -> Board {
        let mut board = self.clone();
        board.pieces[index].x = dest.0;
        board.pieces[index].y = dest.1;
        board
    }

    /// Parse a board from text format.
    ///
    /// Each line is one grid row:
    /// - `.` = empty cell
    /// - any other character labels a piece; all cells sharing a label form
    ///   one rectangular piece whose shape decides its kind
    ///
    /// Pieces are numbered by first appearance, scanning rows top to bottom,
    /// whatever their labels. Two optional directive lines may follow the grid:
    /// - `goal X Y` sets the goal cell for the target's top-left corner
    /// - `target C` makes the piece labelled `C` the target
    pub fn from_text(text: &str) -> Result<Self, String> {
        let mut rows: Vec<&str> = Vec::new();
        let mut goal = None;
        let mut target_label = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() > 1 {
                match words.as_slice() {
                    ["goal", x, y] => {
                        let x = x
                            .parse::<u8>()
                            .map_err(|_| format!("Invalid goal column '{}'", x))?;
                        let y = y
                            .parse::<u8>()
                            .map_err(|_| format!("Invalid goal row '{}'", y))?;
                        goal = Some((x, y));
                    }
                    ["target", label] if label.chars().count() == 1 => {
                        target_label = label.chars().next();
                    }
                    _ => return Err(format!("Invalid directive '{}'", line)),
                }
                continue;
            }
            rows.push(line);
        }

        if rows.is_empty() {
            return Err("Empty board".to_string());
        }

        let height = rows.len();
        let width = rows[0].chars().count();
        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(format!(
                "Board size {}x{} exceeds maximum size {}x{}",
                width, height, MAX_SIZE, MAX_SIZE
            ));
        }

        // label -> (min_x, min_y, max_x, max_y, cell count), in first-seen order
        let mut labels: Vec<(char, [usize; 5])> = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(format!(
                    "Row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                ));
            }
            for (x, ch) in row.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                match labels.iter_mut().find(|(label, _)| *label == ch) {
                    Some((_, extent)) => {
                        extent[0] = extent[0].min(x);
                        extent[1] = extent[1].min(y);
                        extent[2] = extent[2].max(x);
                        extent[3] = extent[3].max(y);
                        extent[4] += 1;
                    }
                    None => labels.push((ch, [x, y, x, y, 1])),
                }
            }
        }

        let mut pieces = Vec::with_capacity(labels.len());
        for &(label, [min_x, min_y, max_x, max_y, count]) in &labels {
            let w = max_x - min_x + 1;
            let h = max_y - min_y + 1;
            if w * h != count {
                return Err(format!("Piece '{}' is not a filled rectangle", label));
            }
            let kind = Kind::from_dimensions(w as u8, h as u8)
                .ok_or_else(|| format!("Piece '{}' has unsupported shape {}x{}", label, w, h))?;
            pieces.push(Piece::new(kind, min_x as u8, min_y as u8));
        }

        let target = match target_label {
            Some(label) => labels
                .iter()
                .position(|(l, _)| *l == label)
                .ok_or_else(|| format!("Target piece '{}' not found", label))?,
            None => pieces
                .iter()
                .position(|p| p.kind == Kind::King)
                .unwrap_or(0),
        };
        let goal = match (goal, pieces.get(target)) {
            (Some(goal), _) => goal,
            (None, Some(piece)) => default_goal(width as u8, height as u8, piece),
            (None, None) => return Err("No pieces found on board".to_string()),
        };

        Board::new(width as u8, height as u8, &pieces, target as u8, goal)
            .map_err(|e| e.to_string())
    }
}

fn default_goal(width: u8, height: u8, piece: &Piece) -> Position {
    (
        width.saturating_sub(piece.width) / 2,
        height.saturating_sub(piece.height),
    )
}

fn label(index: usize) -> char {
    if index < 26 {
        (b'A' + index as u8) as char
    } else {
        (b'a' + (index - 26) as u8) as char
    }
}

/// Renders the text format read by [`Board::from_text`]: the grid, a
/// `goal X Y` line, and a `target C` line when the target is not the piece
/// the parser would pick by default. Piece `i` is labelled `A`, `B`, ... in
/// index order, but parsing numbers pieces by first appearance, so a board
/// whose pieces are not listed in row-major order comes back renumbered.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cells = [[None; MAX_SIZE]; MAX_SIZE];
        for (index, piece) in self.pieces.iter().enumerate() {
            for y in piece.y..piece.y + piece.height {
                for x in piece.x..piece.x + piece.width {
                    cells[y as usize][x as usize] = Some(index);
                }
            }
        }
        for row in cells.iter().take(self.height as usize) {
            let line: String = row
                .iter()
                .take(self.width as usize)
                .map(|cell| cell.map_or('.', label))
                .collect();
            writeln!(f, "{}", line)?;
        }

        let first_seen = cells
            .iter()
            .take(self.height as usize)
            .flat_map(|row| row.iter().take(self.width as usize))
            .flatten();
        let default_target = first_seen
            .clone()
            .find(|&&index| self.pieces[index].kind == Kind::King)
            .or_else(|| first_seen.clone().next());

        writeln!(f, "goal {} {}", self.goal.0, self.goal.1)?;
        if default_target != Some(&(self.target as usize)) {
            writeln!(f, "target {}", label(self.target as usize))?;
        }
        Ok(())
    }
}
