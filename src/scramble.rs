use crate::board::{Board, Position};
use crate::movegen::Move;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Make `steps` random legal moves from `board`.
///
/// The walk is seeded so the same `(board, steps, seed)` always yields the
/// same layout. It avoids immediately undoing the previous move unless that
/// is the only legal move.
pub fn scramble(board: &Board, steps: usize, seed: u64) -> Board {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut board = board.clone();
    let mut last: Option<Move> = None;

    for _ in 0..steps {
        let moves: Vec<(Move, Position)> = board.legal_moves().iter().collect();
        let forward: Vec<(Move, Position)> = moves
            .iter()
            .copied()
            .filter(|(mv, _)| !last.is_some_and(|prev| undoes(prev, *mv)))
            .collect();
        let candidates = if forward.is_empty() { &moves } else { &forward };

        let Some(&(mv, dest)) = candidates.choose(&mut rng) else {
            break;
        };
        board = board.with_piece_at(mv.piece_index as usize, dest);
        last = Some(mv);
    }

    board
}

fn undoes(prev: Move, next: Move) -> bool {
    prev.piece_index == next.piece_index && prev.direction.opposite() == next.direction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Kind, Piece};
    use crate::solver::{SolveResult, Solver, SolverConfig};

    fn solved_board() -> Board {
        let pieces = [
            Piece::new(Kind::King, 1, 3),
            Piece::new(Kind::Vertical, 0, 0),
            Piece::new(Kind::Horizontal, 1, 0),
            Piece::new(Kind::Pawn, 3, 0),
            Piece::new(Kind::Pawn, 3, 1),
        ];
        Board::new(4, 5, &pieces, 0, (1, 3)).unwrap()
    }

    #[test]
    fn test_zero_steps() {
        let board = solved_board();
        assert_eq!(scramble(&board, 0, 7), board);
    }

    #[test]
    fn test_reproducible() {
        let board = Board::classic();
        assert_eq!(scramble(&board, 50, 42), scramble(&board, 50, 42));
    }

    #[test]
    fn test_scrambled_board_is_valid() {
        for seed in 0..10 {
            let board = scramble(&Board::classic(), 100, seed);
            assert!(board.validate().is_ok());
        }
    }

    #[test]
    fn test_solution_no_longer_than_walk() {
        // Walking back the scramble is always a solution
        for seed in 0..5 {
            let steps = 12;
            let board = scramble(&solved_board(), steps, seed);
            let mut solver = Solver::new(SolverConfig::default());
            match solver.solve(&board).unwrap() {
                SolveResult::Solved(moves) => assert!(moves.len() <= steps),
                other => panic!("seed {}: expected a solution, got {:?}", seed, other),
            }
        }
    }

    #[test]
    fn test_stuck_board() {
        let pieces = [Piece::new(Kind::King, 0, 0)];
        let board = Board::new(2, 2, &pieces, 0, (0, 0)).unwrap();
        assert_eq!(scramble(&board, 10, 1), board);
    }
}
