use crate::board::{Board, BoardError};
use crate::key::CanonicalKey;
use crate::movegen::Move;
use log::{debug, info};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_MAX_DEPTH: usize = 200;
pub const DEFAULT_MAX_ITERATIONS: usize = 50_000;

/// Bounds on a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Longest move sequence the search will consider.
    pub max_depth: usize,
    /// Number of nodes that may be dequeued before giving up.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// A shortest solution. Empty when the board is already solved.
    Solved(Vec<Move>),
    /// A depth bound, the iteration budget or cancellation stopped the
    /// search before it could either find a solution or rule one out.
    Cutoff,
    /// Every reachable state was expanded and none is solved.
    Impossible,
}

impl SolveResult {
    /// Collapse both failure outcomes into `None`.
    pub fn into_moves(self) -> Option<Vec<Move>> {
        match self {
            SolveResult::Solved(moves) => Some(moves),
            SolveResult::Cutoff | SolveResult::Impossible => None,
        }
    }
}

/// Observer called once for every node taken off the frontier.
pub trait Tracer {
    fn trace(&self, board: &Board, nodes_explored: usize, depth: usize);
}

impl Tracer for () {
    fn trace(&self, _board: &Board, _nodes_explored: usize, _depth: usize) {}
}

struct SearchNode {
    board: Board,
    path: Vec<Move>,
}

/// Breadth-first shortest-path solver.
pub struct Solver<T: Tracer = ()> {
    config: SolverConfig,
    tracer: Option<T>,
    cancel: Option<Arc<AtomicBool>>,
    nodes_explored: usize,
    states_seen: usize,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver {
            config,
            tracer: None,
            cancel: None,
            nodes_explored: 0,
            states_seen: 0,
        }
    }
}

impl<T: Tracer> Solver<T> {
    pub fn with_tracer(config: SolverConfig, tracer: T) -> Self {
        Solver {
            config,
            tracer: Some(tracer),
            cancel: None,
            nodes_explored: 0,
            states_seen: 0,
        }
    }

    /// Stop with [`SolveResult::Cutoff`] once `flag` is set. The flag is
    /// polled once per dequeued node.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Nodes dequeued by the last call to [`Solver::solve`].
    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    /// Distinct canonical keys marked visited by the last call to
    /// [`Solver::solve`].
    pub fn states_seen(&self) -> usize {
        self.states_seen
    }

    /// Find a shortest sequence of moves that brings the target piece onto
    /// the goal. The caller's board is never modified.
    pub fn solve(&mut self, board: &Board) -> Result<SolveResult, BoardError> {
        board.validate()?;
        self.nodes_explored = 0;
        self.states_seen = 0;

        if board.is_solved() {
            return Ok(SolveResult::Solved(Vec::new()));
        }

        debug!(
            "searching {}x{} board with {} pieces (max depth {}, max iterations {})",
            board.width(),
            board.height(),
            board.pieces().len(),
            self.config.max_depth,
            self.config.max_iterations
        );

        let mut visited = HashSet::new();
        let result = self.search(board, &mut visited);
        self.states_seen = visited.len();

        match &result {
            SolveResult::Solved(moves) => debug!(
                "solved in {} moves after {} nodes",
                moves.len(),
                self.nodes_explored
            ),
            SolveResult::Cutoff => info!(
                "search cut off after {} nodes, {} states seen",
                self.nodes_explored, self.states_seen
            ),
            SolveResult::Impossible => debug!(
                "no solution: all {} reachable states expanded",
                self.states_seen
            ),
        }

        Ok(result)
    }

    fn search(&mut self, root: &Board, visited: &mut HashSet<CanonicalKey>) -> SolveResult {
        let mut frontier = VecDeque::new();
        // Set once a successor is dropped for exceeding the depth bound.
        let mut pruned = false;

        visited.insert(CanonicalKey::of(root));
        frontier.push_back(SearchNode {
            board: root.clone(),
            path: Vec::new(),
        });

        while let Some(node) = frontier.pop_front() {
            if self.nodes_explored >= self.config.max_iterations || self.is_cancelled() {
                return SolveResult::Cutoff;
            }
            self.nodes_explored += 1;

            if let Some(tracer) = &self.tracer {
                tracer.trace(&node.board, self.nodes_explored, node.path.len());
            }

            for (mv, dest) in node.board.legal_moves().iter() {
                let next = node.board.with_piece_at(mv.piece_index as usize, dest);
                let key = CanonicalKey::of(&next);
                if visited.contains(&key) {
                    continue;
                }

                let mut path = node.path.clone();
                path.push(mv);

                if next.is_solved() {
                    return SolveResult::Solved(path);
                }

                if path.len() < self.config.max_depth {
                    visited.insert(key);
                    frontier.push_back(SearchNode { board: next, path });
                } else {
                    pruned = true;
                }
            }
        }

        if pruned {
            SolveResult::Cutoff
        } else {
            SolveResult::Impossible
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Solve with the default bounds. `None` means no solution was found within
/// them; `Some(vec![])` means the board is already solved.
pub fn solve(board: &Board) -> Result<Option<Vec<Move>>, BoardError> {
    Solver::new(SolverConfig::default())
        .solve(board)
        .map(SolveResult::into_moves)
}

/// First move of a shortest solution, if there is one to make.
pub fn hint(board: &Board) -> Result<Option<Move>, BoardError> {
    Ok(solve(board)?.and_then(|moves| moves.first().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Kind, Piece};
    use crate::movegen::Direction;
    use std::cell::RefCell;

    fn king_board(
        width: u8,
        height: u8,
        others: &[Piece],
        king: (u8, u8),
        goal: (u8, u8),
    ) -> Board {
        let mut pieces = others.to_vec();
        pieces.push(Piece::new(Kind::King, king.0, king.1));
        let target = others.len() as u8;
        Board::new(width, height, &pieces, target, goal).unwrap()
    }

    #[test]
    fn test_solve_already_solved() {
        let board = king_board(4, 5, &[], (1, 3), (1, 3));
        let mut solver = Solver::new(SolverConfig::default());

        assert_eq!(solver.solve(&board), Ok(SolveResult::Solved(vec![])));
        assert_eq!(solver.nodes_explored(), 0);
    }

    #[test]
    fn test_solve_adjacent_goal() {
        let others = [Piece::new(Kind::Pawn, 0, 0), Piece::new(Kind::Vertical, 3, 0)];
        let board = king_board(4, 5, &others, (1, 2), (1, 3));

        let moves = solve(&board).unwrap().unwrap();
        assert_eq!(moves, vec![Move::new(2, Direction::Down)]);
    }

    #[test]
    fn test_solve_tie_break_order() {
        // Down-then-Right and Right-then-Down are both optimal; Down is tried first
        let board = king_board(3, 3, &[], (0, 0), (1, 1));

        let moves = solve(&board).unwrap().unwrap();
        assert_eq!(
            moves,
            vec![Move::new(0, Direction::Down), Move::new(0, Direction::Right)]
        );
    }

    #[test]
    fn test_solve_classic() {
        let board = Board::classic();
        let mut solver = Solver::new(SolverConfig::default());

        let moves = match solver.solve(&board).unwrap() {
            SolveResult::Solved(moves) => moves,
            other => panic!("expected a solution, got {:?}", other),
        };
        assert!(!moves.is_empty());
        assert!(moves.len() <= DEFAULT_MAX_DEPTH);

        let end = board.replay(&moves).unwrap();
        assert_eq!(end.piece(0).position(), (1, 3));
        assert!(end.is_solved());
        // The caller's board is untouched
        assert_eq!(board, Board::classic());
    }

    #[test]
    fn test_solve_impossible() {
        // Only one cell is ever free, so the King can never move
        let others = [
            Piece::new(Kind::Horizontal, 0, 2),
            Piece::new(Kind::Vertical, 2, 0),
        ];
        let board = king_board(3, 3, &others, (0, 0), (1, 1));
        let mut solver = Solver::new(SolverConfig::default());

        assert_eq!(solver.solve(&board), Ok(SolveResult::Impossible));
        assert!(solver.states_seen() > 1);
        assert_eq!(solver.nodes_explored(), solver.states_seen());
    }

    #[test]
    fn test_solve_cutoff_by_depth() {
        let config = SolverConfig {
            max_depth: 10,
            ..SolverConfig::default()
        };
        let mut solver = Solver::new(config);
        assert_eq!(solver.solve(&Board::classic()), Ok(SolveResult::Cutoff));
    }

    #[test]
    fn test_solve_cutoff_by_iterations() {
        let config = SolverConfig {
            max_iterations: 100,
            ..SolverConfig::default()
        };
        let mut solver = Solver::new(config);
        assert_eq!(solver.solve(&Board::classic()), Ok(SolveResult::Cutoff));
        assert_eq!(solver.nodes_explored(), 100);
        assert_eq!(SolveResult::Cutoff.into_moves(), None);
    }

    #[test]
    fn test_solve_cancelled() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut solver = Solver::new(SolverConfig::default()).with_cancel(flag);
        assert_eq!(solver.solve(&Board::classic()), Ok(SolveResult::Cutoff));
        assert_eq!(solver.nodes_explored(), 0);
    }

    #[test]
    fn test_deterministic() {
        let first = solve(&Board::classic()).unwrap();
        let second = solve(&Board::classic()).unwrap();
        assert_eq!(first, second);
    }

    struct KeyRecorder {
        keys: RefCell<Vec<CanonicalKey>>,
        max_depth: RefCell<usize>,
    }

    impl Tracer for KeyRecorder {
        fn trace(&self, board: &Board, _nodes_explored: usize, depth: usize) {
            self.keys.borrow_mut().push(CanonicalKey::of(board));
            let mut max_depth = self.max_depth.borrow_mut();
            *max_depth = (*max_depth).max(depth);
        }
    }

    #[test]
    fn test_no_duplicate_expansion() {
        let recorder = KeyRecorder {
            keys: RefCell::new(Vec::new()),
            max_depth: RefCell::new(0),
        };
        let config = SolverConfig {
            max_depth: 30,
            max_iterations: 5_000,
        };
        let mut solver = Solver::with_tracer(config, recorder);
        let result = solver.solve(&Board::classic()).unwrap();
        assert_eq!(result, SolveResult::Cutoff);

        let recorder = solver.tracer.as_ref().unwrap();
        let keys = recorder.keys.borrow();
        let unique: HashSet<&CanonicalKey> = keys.iter().collect();
        assert_eq!(keys.len(), solver.nodes_explored());
        assert_eq!(unique.len(), keys.len());
        assert!(keys.len() <= solver.states_seen());
        assert!(*recorder.max_depth.borrow() < 30);
    }

    #[test]
    fn test_hint() {
        let others = [Piece::new(Kind::Pawn, 0, 0)];
        let board = king_board(4, 5, &others, (1, 2), (1, 3));
        assert_eq!(hint(&board), Ok(Some(Move::new(1, Direction::Down))));

        let solved = king_board(4, 5, &others, (1, 3), (1, 3));
        assert_eq!(hint(&solved), Ok(None));
    }
}
