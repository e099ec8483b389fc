//! # Example: Sudoku as Exact Cover
//!
//! [Sudoku] can be solved as a pure exact cover problem. There are 729 rows
//! that correspond to the placement of 9 digits in 81 cells, and 324 columns
//! in 4 groups of 81: each cell holds one digit, and each row, column and
//! 3x3 box holds each digit once. Every row therefore covers exactly 4
//! columns.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example sudoku -- 769000028000400009000000005005000000090860070280003000008300091002080600000000200
//! ```
//!
//! Keep a checkpoint while enumerating every solution of an under-constrained
//! grid, so an interrupted run can be restarted where it stopped:
//!
//! ```sh
//! RUST_LOG=debug cargo run --example sudoku -- --all --checkpoint sudoku.json 000000000...
//! ```
//!
//! [Sudoku]: <https://en.wikipedia.org/wiki/Sudoku>

use std::{path::PathBuf, process, time::Duration};

use clap::Parser;
use dlx_resume::{CheckpointError, ExactCover, Matrix, PeriodicCheckpoint, Row, Solution};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// 81 characters in row-major order; anything other than 1-9 is blank.
    puzzle: String,

    /// Print every solution instead of only the first.
    #[arg(long)]
    all: bool,

    /// Checkpoint file to resume from and keep updated.
    #[arg(long, value_name = "PATH")]
    checkpoint: Option<PathBuf>,

    /// Seconds between checkpoint writes.
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    interval: u64,
}

/// Builds the exact cover problem for `puzzle`, or `None` if it is not 81
/// characters long.
fn problem(puzzle: &str) -> Option<ExactCover> {
    if puzzle.chars().count() != 81 {
        return None;
    }

    let header = (0..81)
        .map(|cell| format!("c{}{}", cell / 9, cell % 9))
        .chain((0..81).map(|i| format!("r{}n{}", i / 9, i % 9 + 1)))
        .chain((0..81).map(|i| format!("k{}n{}", i / 9, i % 9 + 1)))
        .chain((0..81).map(|i| format!("b{}n{}", i / 9, i % 9 + 1)));

    let givens: Vec<Option<usize>> = puzzle
        .chars()
        .map(|ch| {
            ch.to_digit(10)
                .filter(|digit| (1..=9).contains(digit))
                .map(|digit| digit as usize - 1)
        })
        .collect();
    let mut taken = [false; 324];
    for (cell, digit) in givens.iter().enumerate() {
        if let Some(digit) = digit {
            for column in sudoku_columns(cell, *digit) {
                taken[column] = true;
            }
        }
    }

    // Givens first, then every placement that does not conflict with them.
    let mut rows = Vec::new();
    for (cell, digit) in givens.iter().enumerate() {
        if let Some(digit) = digit {
            rows.push(sudoku_columns(cell, *digit));
        }
    }
    for cell in 0..81 {
        for digit in 0..9 {
            let columns = sudoku_columns(cell, digit);
            if columns.iter().all(|&column| !taken[column]) {
                rows.push(columns);
            }
        }
    }

    // Conflicting givens leave duplicate rows behind, which is fine: the
    // search simply finds no solution.
    let matrix = Matrix::from_sparse(header, 0, rows).ok()?;
    Some(ExactCover::from_matrix(matrix))
}

/// Converts a cell and zero-based digit into its 4 column indices.
fn sudoku_columns(cell: usize, digit: usize) -> [usize; 4] {
    let row = cell / 9;
    let col = cell % 9;
    [
        cell,
        81 + row * 9 + digit,
        81 * 2 + col * 9 + digit,
        81 * 3 + (row / 3 * 3 + col / 3) * 9 + digit,
    ]
}

/// Reads a solution back into an 81 character grid.
fn render(solution: &Solution) -> String {
    let mut grid = ['.'; 81];
    for row in solution {
        if let Some((cell, digit)) = placement(row) {
            grid[cell] = digit;
        }
    }
    grid.iter().collect()
}

/// The cell and digit of one selected row, e.g. `["b0n5", "c01", "k1n5", "r0n5"]`.
fn placement(row: &Row) -> Option<(usize, char)> {
    let cell = row.iter().find(|name| name.starts_with('c'))?;
    let digit = row.iter().find(|name| name.starts_with('r'))?;
    let mut rc = cell[1..].chars().filter_map(|ch| ch.to_digit(10));
    let (r, c) = (rc.next()?, rc.next()?);
    Some(((r * 9 + c) as usize, digit.chars().last()?))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let Some(mut problem) = problem(&args.puzzle) else {
        eprintln!("puzzle must be exactly 81 characters");
        process::exit(2);
    };

    let mut state = match &args.checkpoint {
        Some(path) => match PeriodicCheckpoint::open(path) {
            Ok(state) => Some(state.with_interval(Duration::from_secs(args.interval))),
            Err(err) => {
                eprintln!("cannot open checkpoint {}: {err}", path.display());
                process::exit(1);
            }
        },
        None => None,
    };

    {
        let mut solutions = match state.as_mut() {
            Some(state) => problem.solve_resuming(state),
            None => problem.solve(),
        };
        while let Some(solution) = solutions.next() {
            solutions.format_solution(&solution);
            println!("{}", render(&solution));
            if !args.all {
                break;
            }
        }
        log::info!(
            "{} solutions, {} searches",
            solutions.num_solutions(),
            solutions.num_searches()
        );
    }

    if let Some(state) = state {
        if let Err(err) = close_checkpoint(state, args.all) {
            log::warn!("could not update checkpoint: {err}");
        }
    }
}

/// Removes the checkpoint of a search that ran to the end, or writes out the
/// latest position of one that stopped early, whatever the interval.
fn close_checkpoint(mut state: PeriodicCheckpoint, finished: bool) -> Result<(), CheckpointError> {
    if finished { state.finish() } else { state.save() }
}
