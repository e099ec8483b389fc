//! Benchmarks for full enumeration and for resuming part-way through.
//!
//! # Running
//!
//! ```sh
//! cargo bench --bench solve
//! ```

use std::hint;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dlx_resume::{Checkpoint, ExactCover, Matrix};

fn queens(n: usize) -> ExactCover {
    let diagonals = 2 * n - 1;
    let header = (0..n)
        .map(|rank| format!("r{rank}"))
        .chain((0..n).map(|file| format!("f{file}")))
        .chain((0..diagonals).map(|d| format!("d{d}")))
        .chain((0..diagonals).map(|e| format!("e{e}")));
    let rows = (0..n * n).map(|square| {
        let (rank, file) = (square / n, square % n);
        [
            rank,
            n + file,
            2 * n + rank + file,
            2 * n + diagonals + rank + n - 1 - file,
        ]
    });
    ExactCover::from_matrix(Matrix::from_sparse(header, 2 * diagonals, rows).unwrap())
}

fn bench_enumerate(c: &mut Criterion) {
    for n in [6, 8, 10] {
        let mut problem = queens(n);
        c.bench_with_input(BenchmarkId::new("enumerate_queens", n), &n, |b, _| {
            b.iter(|| hint::black_box(problem.solve().count()));
        });
    }
}

fn bench_resume(c: &mut Criterion) {
    let mut problem = queens(8);
    let all: Vec<_> = problem.solve().collect();
    let midpoint = all[all.len() / 2].clone();

    c.bench_function("resume_queens_8_midpoint", |b| {
        b.iter(|| {
            let mut state = Checkpoint::from_solution(midpoint.clone());
            hint::black_box(problem.solve_resuming(&mut state).count())
        });
    });
}

criterion_group!(benches, bench_enumerate, bench_resume);
criterion_main!(benches);
