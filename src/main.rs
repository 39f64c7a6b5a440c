use clap::{Parser, ValueEnum};
use klotski::scramble::scramble;
use klotski::{Board, Levels, Move, SolveResult, Solver, SolverConfig, Tracer};
use serde_json::json;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn print_solution(board: &Board, solution: &[Move]) {
    println!("\nStarting position:\n{}", board);
    let mut board = board.clone();
    let total = solution.len();
    for (count, mv) in solution.iter().enumerate() {
        let from = board.piece(mv.piece_index as usize).position();
        if let Err(e) = board.slide(*mv) {
            eprintln!("Error replaying solution: {}", e);
            return;
        }
        println!(
            "Move piece #{} {:?} {} ({}/{}):\n{}",
            mv.piece_index,
            from,
            mv.direction,
            count + 1,
            total,
            board
        );
    }
}

struct VerboseTracer {
    trace_start: usize,
    trace_end: usize,
}

impl VerboseTracer {
    fn new(from_node: usize, to_node: usize) -> Self {
        Self {
            trace_start: from_node,
            trace_end: to_node,
        }
    }
}

impl Tracer for VerboseTracer {
    fn trace(&self, board: &Board, nodes_explored: usize, depth: usize) {
        if self.trace_start <= nodes_explored && nodes_explored <= self.trace_end {
            println!("count={}, depth={}:\n{}", nodes_explored, depth, board);
        }
    }
}

struct LevelStats {
    solved: bool,
    moves: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    level_num: usize,
    config: SolverConfig,
    print_solution: bool,
    hint: bool,
    output: OutputFormat,
    trace_range: Option<(usize, usize)>,
}

fn solve_level_helper<T: Tracer>(
    board: &Board,
    opts: SolveOpts,
    mut solver: Solver<T>,
) -> LevelStats {
    let start = Instant::now();
    let result = match solver.solve(board) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: level {}: {}", opts.level_num, e);
            std::process::exit(1);
        }
    };
    let elapsed_ms = start.elapsed().as_millis();
    let states = solver.nodes_explored();

    let (solved_char, solution_len, solved) = match &result {
        SolveResult::Solved(solution) => ('Y', solution.len(), true),
        SolveResult::Cutoff => ('N', 0, false),
        SolveResult::Impossible => ('X', 0, false),
    };

    match opts.output {
        OutputFormat::Text => {
            println!(
                "level: {:<3}  solved: {}  moves: {:<5}  states: {:<10}  elapsed: {} ms",
                opts.level_num, solved_char, solution_len, states, elapsed_ms
            );
            if let SolveResult::Solved(solution) = &result {
                if opts.hint {
                    match solution.first() {
                        Some(mv) => println!("hint: {}", mv),
                        None => println!("hint: already solved"),
                    }
                }
                if opts.print_solution {
                    print_solution(board, solution);
                }
            }
        }
        OutputFormat::Json => {
            let (status, moves) = match &result {
                SolveResult::Solved(solution) => ("solved", Some(solution.as_slice())),
                SolveResult::Cutoff => ("cutoff", None),
                SolveResult::Impossible => ("impossible", None),
            };
            let mut value = json!({
                "level": opts.level_num,
                "status": status,
                "moves": moves,
                "states": states,
                "elapsedMs": elapsed_ms as u64,
            });
            if opts.hint {
                value["hint"] = json!(moves.and_then(|m| m.first()));
            }
            println!("{}", value);
        }
    }

    LevelStats {
        solved,
        moves: solution_len,
        states_explored: states,
        elapsed_ms,
    }
}

fn solve_level(board: &Board, opts: SolveOpts) -> LevelStats {
    match opts.trace_range {
        Some((start, end)) => {
            let solver = Solver::with_tracer(opts.config, VerboseTracer::new(start, end));
            solve_level_helper(board, opts, solver)
        }
        None => {
            let solver = Solver::new(opts.config);
            solve_level_helper(board, opts, solver)
        }
    }
}

#[derive(Parser)]
#[command(name = "klotski")]
#[command(about = "A sliding-block puzzle solver", long_about = None)]
struct Args {
    /// Path to the levels file
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Also print the first move of the solution as a hint
    #[arg(long)]
    hint: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Longest solution to search for
    #[arg(short = 'd', long, default_value_t = klotski::solver::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum number of nodes to explore before giving up
    #[arg(short = 'n', long, default_value_t = klotski::solver::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Make this many random moves from each level before solving
    #[arg(long, value_name = "STEPS")]
    scramble: Option<usize>,

    /// Seed for --scramble
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Range of node numbers to trace (start, end)
    #[arg(long, num_args = 2)]
    trace_range: Option<Vec<usize>>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let levels = match Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    let level_end = args.level_end.unwrap_or(args.level_start);

    if args.level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < args.level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    let num_levels = level_end - args.level_start + 1;
    if args.print_solution && num_levels > 1 {
        eprintln!("Error: solution printing only supported when solving a single level");
        std::process::exit(1);
    }

    if let Some(ref range) = args.trace_range {
        if range[0] > range[1] {
            eprintln!("Error: trace range start must be <= end");
            std::process::exit(1);
        }
    }
    let trace_range = args.trace_range.as_ref().map(|v| (v[0], v[1]));

    let config = SolverConfig {
        max_depth: args.max_depth,
        max_iterations: args.max_iterations,
    };

    let mut total_solved = 0;
    let mut total_moves = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for (level_num, board) in levels
        .iter()
        .enumerate()
        .map(|(i, board)| (i + 1, board))
        .filter(|(n, _)| (args.level_start..=level_end).contains(n))
    {
        let board = match args.scramble {
            Some(steps) => scramble(board, steps, args.seed),
            None => board.clone(),
        };
        let opts = SolveOpts {
            level_num,
            config,
            print_solution: args.print_solution,
            hint: args.hint,
            output: args.output,
            trace_range,
        };
        let stats = solve_level(&board, opts);

        if stats.solved {
            total_solved += 1;
        }
        total_moves += stats.moves;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    if num_levels > 1 && args.output == OutputFormat::Text {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}       moves: {:<5}  states: {:<10}  elapsed: {} ms",
            total_solved, num_levels, total_moves, total_states, total_time_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_and_hint_flags() {
        let args = Args::try_parse_from(["klotski", "levels.txt", "1", "--hint", "-o", "json"])
            .unwrap();
        assert!(args.hint);
        assert_eq!(args.output, OutputFormat::Json);

        let args = Args::try_parse_from(["klotski", "levels.txt", "1", "3"]).unwrap();
        assert!(!args.hint);
        assert_eq!(args.output, OutputFormat::Text);
        assert_eq!(args.level_end, Some(3));

        assert!(Args::try_parse_from(["klotski", "levels.txt", "1", "--json"]).is_err());
    }
}
