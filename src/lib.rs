//! Exact shortest-path solver for Klotski-style sliding-block puzzles.
//!
//! A [`Board`] holds rigid rectangular pieces on a small grid. The
//! [`Solver`] runs a breadth-first search over board states, deduplicated by
//! [`CanonicalKey`], and returns a shortest list of single-cell [`Move`]s that
//! brings the target piece onto its goal cell.

pub mod board;
pub mod key;
pub mod levels;
pub mod movegen;
pub mod scramble;
pub mod solver;

pub use board::{Board, BoardError, Kind, Piece, Position};
pub use key::CanonicalKey;
pub use levels::{LevelError, Levels};
pub use movegen::{Direction, Move, MoveError};
pub use solver::{SolveResult, Solver, SolverConfig, Tracer, hint, solve};
