//! Algorithm X over a [`Matrix`], as a lazy iterator of solutions.

use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Matrix, Progress, ResumeState, Row, Solution, Truthy};

/// Progress counters of a search. Both only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Solutions passed through `format_solution`.
    pub num_solutions: u64,
    /// Search nodes expanded, i.e. columns chosen and covered.
    pub num_searches: u64,
}

impl SearchStats {
    fn raise_to(&mut self, other: SearchStats) {
        self.num_solutions = self.num_solutions.max(other.num_solutions);
        self.num_searches = self.num_searches.max(other.num_searches);
    }
}

/// An exact cover problem, ready to be solved.
///
/// Owns the [`Matrix`] and the [`SearchStats`] accumulated by every search
/// run over it.
#[derive(Debug, Clone)]
pub struct ExactCover {
    matrix: Matrix,
    stats: SearchStats,
}

impl ExactCover {
    /// Builds the matrix with [`Matrix::new`].
    ///
    /// # Errors
    ///
    /// See [`Matrix::new`].
    pub fn new<H, S, R, C, T>(header: H, secondary: usize, rows: R) -> Result<Self, ConfigurationError>
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = T>,
        T: Truthy,
    {
        Matrix::new(header, secondary, rows).map(Self::from_matrix)
    }

    /// Wraps an already built matrix, with zeroed counters.
    #[must_use]
    pub fn from_matrix(matrix: Matrix) -> Self {
        Self {
            matrix,
            stats: SearchStats::default(),
        }
    }

    /// The matrix, fully uncovered whenever no search is running.
    #[must_use]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Gives the matrix back, dropping the counters.
    #[must_use]
    pub fn into_matrix(self) -> Matrix {
        self.matrix
    }

    /// Counters accumulated over every search run so far.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Solutions counted by [`format_solution`](Self::format_solution).
    #[must_use]
    pub fn num_solutions(&self) -> u64 {
        self.stats.num_solutions
    }

    /// Columns chosen and covered across all searches.
    #[must_use]
    pub fn num_searches(&self) -> u64 {
        self.stats.num_searches
    }

    /// Starts a fresh search.
    pub fn solve(&mut self) -> Solutions<'_> {
        Solutions::new(&mut self.matrix, &mut self.stats, None)
    }

    /// Starts a search that first replays the path saved in `state`, then
    /// continues live, reporting progress back to `state` as it goes.
    pub fn solve_resuming<'a>(&'a mut self, state: &'a mut dyn ResumeState) -> Solutions<'a> {
        if let Some(saved) = state.stats() {
            self.stats.raise_to(saved);
        }
        Solutions::new(&mut self.matrix, &mut self.stats, Some(state))
    }

    /// Renders `solution` one row per line and counts it as a solution.
    pub fn format_solution(&mut self, solution: &[Row]) -> String {
        format_solution(&mut self.stats, solution)
    }
}

fn format_solution(stats: &mut SearchStats, solution: &[Row]) -> String {
    stats.num_solutions += 1;
    solution
        .iter()
        .map(|row| row.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One level of the search: the column being covered and the candidate row
/// currently selected for it.
#[derive(Debug, Clone, Copy)]
struct Frame {
    header: usize,
    /// Data node of the selected row, or `header` before the first
    /// candidate has been tried.
    node: usize,
    /// The row was matched from the replay path rather than pushed live.
    replayed: bool,
}

/// An iterator yielding every solution of an [`ExactCover`], created by
/// [`ExactCover::solve`] or [`ExactCover::solve_resuming`].
///
/// Each solution lists the selected rows in search order, every row as the
/// sorted names of the columns it covers. Dropping the iterator part-way
/// leaves the matrix exactly as it was before the search started.
pub struct Solutions<'a> {
    matrix: &'a mut Matrix,
    stats: &'a mut SearchStats,
    resume: Option<&'a mut dyn ResumeState>,

    /// The search stack; `frames.len()` is the current level.
    frames: Vec<Frame>,

    /// Rows selected at each level. While resuming it starts out holding
    /// the whole replay path, and levels below its length match candidates
    /// against it instead of pushing.
    solution: Vec<Row>,

    /// Length of the replay path.
    replay_len: usize,
    replay_reported: bool,
    started: bool,
}

impl<'a> Solutions<'a> {
    fn new(
        matrix: &'a mut Matrix,
        stats: &'a mut SearchStats,
        resume: Option<&'a mut dyn ResumeState>,
    ) -> Self {
        let (solution, replay_reported) = resume
            .as_deref()
            .map(|state| (state.solution().to_vec(), state.solution_reported()))
            .unwrap_or_default();
        Self {
            matrix,
            stats,
            resume,
            frames: Vec::new(),
            replay_len: solution.len(),
            solution,
            replay_reported,
            started: false,
        }
    }

    /// The problem's counters, as updated by this search so far.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        *self.stats
    }

    /// See [`ExactCover::num_solutions`].
    #[must_use]
    pub fn num_solutions(&self) -> u64 {
        self.stats.num_solutions
    }

    /// See [`ExactCover::num_searches`].
    #[must_use]
    pub fn num_searches(&self) -> u64 {
        self.stats.num_searches
    }

    /// Current search depth.
    #[must_use]
    pub fn level(&self) -> usize {
        self.frames.len()
    }

    /// Same as [`ExactCover::format_solution`], usable while the search
    /// holds the problem borrowed.
    pub fn format_solution(&mut self, solution: &[Row]) -> String {
        format_solution(self.stats, solution)
    }

    fn store(&mut self) {
        if let Some(resume) = self.resume.as_deref_mut() {
            resume.store_periodically(&Progress {
                solution: &self.solution,
                stats: *self.stats,
            });
        }
    }

    /// Starts a new level: either every primary column is covered and the
    /// current rows form a solution, or the smallest column is covered and
    /// a frame pushed for it.
    fn enter(&mut self) -> Option<Solution> {
        let level = self.frames.len();
        let replaying = level < self.solution.len();

        let Some(header) = self.matrix.choose_header() else {
            if replaying {
                log::warn!(
                    "resume path is {} rows deep but a solution was complete at level {level}; ignoring the rest",
                    self.solution.len()
                );
                self.solution.truncate(level);
            } else if self.replay_reported
                && level == self.replay_len
                && self.frames.iter().all(|frame| frame.replayed)
            {
                log::info!("replayed resume path to its end, resuming after the saved solution");
                return None;
            }
            log::trace!("solution found at level {level}");
            return Some(self.solution.clone());
        };

        // Levels on the replay path were already counted by the saved run.
        if !replaying {
            self.stats.num_searches += 1;
        }
        self.matrix.cover_header(header);
        self.frames.push(Frame {
            header,
            node: header,
            replayed: false,
        });
        None
    }

    /// Moves the top frame on to its next candidate row. Returns false if
    /// the column is exhausted, in which case the frame has been popped.
    fn advance(&mut self) -> bool {
        let level = self.frames.len() - 1;
        let Frame { header, mut node, .. } = self.frames[level];

        if node != header {
            self.matrix.uncover_row(node);
            self.solution.truncate(level);
        }

        loop {
            node = self.matrix.down(node);
            if node == header {
                if level < self.solution.len() {
                    log::warn!(
                        "no row at level {level} matches the resume path; continuing from level {}",
                        level.saturating_sub(1)
                    );
                    self.solution.truncate(level);
                }
                self.matrix.uncover_header(header);
                self.frames.pop();
                return false;
            }

            let labels = self.matrix.row_labels(self.matrix.row_of(node));
            let replayed = if let Some(saved) = self.solution.get(level) {
                if saved != labels {
                    continue;
                }
                true
            } else {
                if level < self.replay_len {
                    log::debug!("left the resume path at level {level}");
                }
                self.solution.push(labels.clone());
                self.store();
                false
            };

            self.matrix.cover_row(node);
            self.frames[level] = Frame {
                header,
                node,
                replayed,
            };
            return true;
        }
    }
}

impl Iterator for Solutions<'_> {
    type Item = Solution;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            log::debug!(
                "starting search: {} columns ({} secondary), {} rows, replaying {} levels",
                self.matrix.column_count(),
                self.matrix.secondary_count(),
                self.matrix.row_count(),
                self.replay_len
            );
            if let Some(solution) = self.enter() {
                return Some(solution);
            }
        }

        while !self.frames.is_empty() {
            if self.advance() {
                if let Some(solution) = self.enter() {
                    return Some(solution);
                }
            }
        }
        None
    }
}

impl Drop for Solutions<'_> {
    fn drop(&mut self) {
        // Unwind whatever is still covered, innermost level first.
        while let Some(Frame { header, node, .. }) = self.frames.pop() {
            if node != header {
                self.matrix.uncover_row(node);
            }
            self.matrix.uncover_header(header);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Checkpoint;

    use super::*;

    fn knuth() -> ExactCover {
        ExactCover::new(
            ["A", "B", "C", "D", "E", "F", "G"],
            0,
            [
                [0, 0, 1, 0, 1, 1, 0],
                [1, 0, 0, 1, 0, 0, 1],
                [0, 1, 1, 0, 0, 1, 0],
                [1, 0, 0, 1, 0, 0, 0],
                [0, 1, 0, 0, 0, 0, 1],
                [0, 0, 0, 1, 1, 0, 1],
            ],
        )
        .unwrap()
    }

    fn row(labels: &[&str]) -> Row {
        labels.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn knuth_example() {
        let mut problem = knuth();
        let solutions: Vec<_> = problem.solve().collect();
        assert_eq!(
            solutions,
            [vec![row(&["A", "D"]), row(&["C", "E", "F"]), row(&["B", "G"])]]
        );
        // A; B and E under the dead end A D G; E and B under A D.
        assert_eq!(problem.num_searches(), 5);
        assert_eq!(problem.num_solutions(), 0);
    }

    #[test]
    fn format_counts_solutions() {
        let mut problem = knuth();
        let solution = problem.solve().next().unwrap();
        assert_eq!(problem.format_solution(&solution), "A D\nC E F\nB G");
        assert_eq!(problem.num_solutions(), 1);

        let mut solutions = problem.solve();
        let solution = solutions.next().unwrap();
        solutions.format_solution(&solution);
        assert_eq!(solutions.num_solutions(), 2);
    }

    #[test]
    fn column_without_rows() {
        let mut problem = ExactCover::new(["a", "b"], 0, [[0, 1]]).unwrap();
        assert_eq!(problem.solve().count(), 0);

        let mut problem = ExactCover::new(["a"], 0, Vec::<Vec<bool>>::new()).unwrap();
        assert_eq!(problem.solve().count(), 0);
        assert_eq!(problem.num_searches(), 1);
    }

    #[test]
    fn nothing_to_cover() {
        // With no primary columns the empty selection is the only solution.
        let mut problem = ExactCover::new(["s"], 1, [[1]]).unwrap();
        let solutions: Vec<_> = problem.solve().collect();
        assert_eq!(solutions, [Vec::<Row>::new()]);
        assert_eq!(problem.num_searches(), 0);
    }

    #[test]
    fn resume_after_empty_solution() {
        let mut problem = ExactCover::new(["s"], 1, [[1]]).unwrap();
        let all: Vec<_> = problem.solve().collect();
        assert_eq!(all, [Vec::<Row>::new()]);

        let mut state = Checkpoint::from_solution(all[0].clone());
        assert_eq!(problem.solve_resuming(&mut state).count(), 0);

        // A fresh checkpoint has an empty path too, but nothing yielded yet.
        let mut state = Checkpoint::new();
        assert_eq!(problem.solve_resuming(&mut state).collect::<Vec<_>>(), all);

        let mut problem = ExactCover::new(Vec::<String>::new(), 0, Vec::<Vec<bool>>::new()).unwrap();
        let mut state = Checkpoint::from_solution(Vec::new());
        assert_eq!(problem.solve_resuming(&mut state).count(), 0);
    }

    #[test]
    fn bare_state_with_empty_path_starts_fresh() {
        struct PathOnly;

        impl ResumeState for PathOnly {
            fn solution(&self) -> &[Row] {
                &[]
            }

            fn store_periodically(&mut self, _progress: &Progress<'_>) {}
        }

        let mut problem = ExactCover::new(["s"], 1, [[1]]).unwrap();
        assert_eq!(problem.solve_resuming(&mut PathOnly).count(), 1);
        assert_eq!(knuth().solve_resuming(&mut PathOnly).count(), 1);
    }

    #[test]
    fn identical_rows_replay_to_the_first() {
        // Both solutions read [["a"]], so the saved path cannot tell them
        // apart and resuming after the second behaves like after the first.
        let mut problem = ExactCover::new(["a"], 0, [[1], [1]]).unwrap();
        let all: Vec<_> = problem.solve().collect();
        assert_eq!(all, [vec![row(&["a"])], vec![row(&["a"])]]);

        let mut state = Checkpoint::from_solution(all[1].clone());
        assert_eq!(problem.solve_resuming(&mut state).collect::<Vec<_>>(), &all[1..]);
    }

    #[test]
    fn secondary_at_most_once() {
        // p and q must be covered; s may be covered by at most one row.
        let mut problem = ExactCover::new(
            ["p", "q", "s"],
            1,
            [[1, 0, 1], [0, 1, 1], [1, 0, 0], [0, 1, 0]],
        )
        .unwrap();
        let mut solutions: Vec<_> = problem.solve().collect();
        for solution in &mut solutions {
            solution.sort();
        }
        solutions.sort();
        assert_eq!(
            solutions,
            [
                vec![row(&["p"]), row(&["q"])],
                vec![row(&["p"]), row(&["q", "s"])],
                vec![row(&["p", "s"]), row(&["q"])],
            ]
        );
    }

    #[test]
    fn drop_mid_search_restores_matrix() {
        let mut problem = ExactCover::new(
            ["p", "q", "s"],
            1,
            [[1, 0, 1], [0, 1, 1], [1, 0, 0], [0, 1, 0]],
        )
        .unwrap();
        let pristine = problem.matrix().clone();
        {
            let mut solutions = problem.solve();
            assert!(solutions.next().is_some());
            assert_eq!(solutions.level(), 2);
        }
        assert_eq!(problem.matrix(), &pristine);

        let again: Vec<_> = problem.solve().collect();
        assert_eq!(again.len(), 3);
        assert_eq!(problem.matrix(), &pristine);
    }

    #[test]
    fn deterministic() {
        let mut problem = ExactCover::new(
            ["p", "q", "s"],
            1,
            [[1, 0, 1], [0, 1, 1], [1, 0, 0], [0, 1, 0]],
        )
        .unwrap();
        let first: Vec<_> = problem.solve().collect();
        let second: Vec<_> = problem.solve().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn resume_from_yielded_solution() {
        let mut problem = ExactCover::new(
            ["p", "q", "s"],
            1,
            [[1, 0, 1], [0, 1, 1], [1, 0, 0], [0, 1, 0]],
        )
        .unwrap();
        let all: Vec<_> = problem.solve().collect();
        for n in 1..=all.len() {
            let mut state = Checkpoint::from_solution(all[n - 1].clone());
            let rest: Vec<_> = problem.solve_resuming(&mut state).collect();
            assert_eq!(rest, &all[n..], "resuming after solution {n}");
        }
    }

    #[test]
    fn replay_does_not_count_searches() {
        let mut problem = knuth();
        let solution = problem.solve().next().unwrap();
        let searches = problem.num_searches();

        let mut state = Checkpoint::from_solution(solution);
        assert_eq!(problem.solve_resuming(&mut state).count(), 0);
        assert_eq!(problem.num_searches(), searches);
    }

    #[test]
    fn resume_raises_counters() {
        let mut problem = knuth();
        let mut state = Checkpoint {
            solution: Vec::new(),
            stats: SearchStats {
                num_solutions: 7,
                num_searches: 100,
            },
            reported: false,
        };
        let solutions: Vec<_> = problem.solve_resuming(&mut state).collect();
        assert_eq!(solutions.len(), 1);
        assert_eq!(problem.num_solutions(), 7);
        assert_eq!(problem.num_searches(), 105);
        // The hook saw every push, the last one completing the solution.
        assert_eq!(state.solution, solutions[0]);
        assert_eq!(state.stats.num_searches, 105);
    }

    #[test]
    fn stale_resume_path_falls_back_to_live_search() {
        let mut problem = knuth();
        let mut state = Checkpoint::from_solution(vec![row(&["A", "D"]), row(&["no", "such", "row"])]);
        let solutions: Vec<_> = problem.solve_resuming(&mut state).collect();
        // The branch under A D is abandoned, and no later branch has a
        // solution.
        assert!(solutions.is_empty());
        assert_eq!(problem.matrix(), knuth().matrix());
    }
}
