//! Problems and checks shared across integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use dlx_resume::{ExactCover, Matrix, Solution};

/// The N queens puzzle: every rank and file holds one queen (primary
/// columns), every diagonal at most one (secondary columns).
///
/// Columns are named `r<rank>`, `f<file>`, `d<rank + file>` and
/// `e<rank + n - 1 - file>`.
pub fn queens(n: usize) -> ExactCover {
    let diagonals = 2 * n - 1;
    let header = (0..n)
        .map(|rank| format!("r{rank}"))
        .chain((0..n).map(|file| format!("f{file}")))
        .chain((0..diagonals).map(|d| format!("d{d}")))
        .chain((0..diagonals).map(|e| format!("e{e}")));

    let mut rows = Vec::with_capacity(n * n);
    for rank in 0..n {
        for file in 0..n {
            rows.push([
                rank,
                n + file,
                2 * n + rank + file,
                2 * n + diagonals + rank + n - 1 - file,
            ]);
        }
    }

    let matrix = Matrix::from_sparse(header, 2 * diagonals, rows).unwrap();
    ExactCover::from_matrix(matrix)
}

/// Checks that `solution` covers every primary column of `matrix` exactly
/// once and every secondary column at most once.
pub fn assert_exact_cover(matrix: &Matrix, solution: &Solution) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in solution {
        for name in row {
            *counts.entry(name.as_str()).or_default() += 1;
        }
    }
    for (column, name) in matrix.column_names().iter().enumerate() {
        let count = counts.remove(name.as_str()).unwrap_or(0);
        if matrix.is_secondary(column) {
            assert!(count <= 1, "secondary column {name} covered {count} times");
        } else {
            assert_eq!(count, 1, "primary column {name} covered {count} times");
        }
    }
    assert!(counts.is_empty(), "unknown columns in solution: {counts:?}");
}
