#![doc = include_str!("../README.md")]
//!
//!
//! To solve an exact cover problem with this implementation, build an
//! [`ExactCover`] from a header of column names and the rows of a 0/1
//! matrix, then iterate over [`ExactCover::solve()`].
//!
//! An example, based on Wikipedia's [Algorithm
//! X](https://en.wikipedia.org/wiki/Knuth%27s_Algorithm_X) article, with one
//! extra column per set so each selected row names the set it came from:
//!
//! ```
//! // Elements 1..=7 must each be covered exactly once; the set columns
//! // A..F are secondary, they only label the rows.
//! let header = ["1", "2", "3", "4", "5", "6", "7", "A", "B", "C", "D", "E", "F"];
//! let rows = [
//!     [1, 0, 0, 1, 0, 0, 1, 1, 0, 0, 0, 0, 0],
//!     [1, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0],
//!     [0, 0, 0, 1, 1, 0, 1, 0, 0, 1, 0, 0, 0],
//!     [0, 0, 1, 0, 1, 1, 0, 0, 0, 0, 1, 0, 0],
//!     [0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0, 1, 0],
//!     [0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1],
//! ];
//! let mut problem = dlx_resume::ExactCover::new(header, 6, rows)?;
//!
//! let mut solution_count = 0;
//! for solution in problem.solve() {
//!     solution_count += 1;
//!     let mut sets: Vec<&str> = solution
//!         .iter()
//!         .map(|row| row.last().unwrap().as_str())
//!         .collect();
//!     sets.sort();
//!     assert_eq!(sets, ["B", "D", "F"]);
//! }
//!
//! assert_eq!(1, solution_count);
//! # Ok::<(), dlx_resume::ConfigurationError>(())
//! ```
//!
//! Long searches can be checkpointed and resumed with a [`ResumeState`];
//! see [`PeriodicCheckpoint`] for one that persists to disk.

#![warn(clippy::pedantic)]
#![deny(rustdoc::broken_intra_doc_links, unsafe_code)]

mod error;
mod matrix;
mod resume;
mod search;

pub use error::{CheckpointError, ConfigurationError};
pub use matrix::{Matrix, Truthy};
pub use resume::{Checkpoint, PeriodicCheckpoint, Progress, ResumeState};
pub use search::{ExactCover, SearchStats, Solutions};

/// One selected row: the sorted names of the columns it covers.
pub type Row = Vec<String>;

/// The rows of one exact cover, in the order the search selected them.
pub type Solution = Vec<Row>;
