//! Pausing and resuming long searches.
//!
//! A search can be handed a [`ResumeState`]. Before searching live, the
//! engine fast-forwards through the saved path in [`ResumeState::solution`],
//! skipping every branch that sorts before it, and from then on reports each
//! step back through [`ResumeState::store_periodically`] so the state can be
//! persisted.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{CheckpointError, Row, SearchStats, Solution};

/// A snapshot of a running search, passed to
/// [`ResumeState::store_periodically`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    /// The rows selected so far, outermost level first.
    pub solution: &'a [Row],
    /// Counters at the time of the snapshot.
    pub stats: SearchStats,
}

/// Saved position of an interrupted search, plus a hook to keep saving it.
///
/// Rows are identified by their sorted column names alone. If two rows cover
/// the same columns, replay always takes the first of them in column order,
/// so a path through the second is resumed as if it went through the first.
/// Give every row a distinct label set (a secondary column naming the row
/// will do) when such a problem needs to be resumed exactly.
pub trait ResumeState {
    /// The path to replay before searching live: one sorted row of column
    /// names per search level. Empty for a fresh search.
    fn solution(&self) -> &[Row];

    /// Counters of the run that saved the path. The engine raises its own
    /// counters to these before resuming.
    fn stats(&self) -> Option<SearchStats> {
        None
    }

    /// Whether the path returned by [`solution`](Self::solution) is a
    /// complete solution the saved run already yielded, in which case the
    /// resumed search does not yield it again.
    ///
    /// Defaults to `true` for a non-empty path. An empty path defaults to
    /// a fresh search; return `true` for it only when the saved run yielded
    /// the empty solution (possible when no column is primary).
    fn solution_reported(&self) -> bool {
        !self.solution().is_empty()
    }

    /// Called every time the search pushes a row onto its solution stack.
    /// A path stored here has not been searched below yet, so resuming from
    /// it explores its whole subtree.
    fn store_periodically(&mut self, progress: &Progress<'_>);
}

/// An in-memory [`ResumeState`] that always holds the most recent progress
/// it was given. Serializable, so it can be stored anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The path to replay.
    pub solution: Vec<Row>,
    #[serde(default)]
    pub stats: SearchStats,
    /// See [`ResumeState::solution_reported`].
    #[serde(default)]
    pub reported: bool,
}

impl Checkpoint {
    /// An empty checkpoint, which starts a fresh search.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a checkpoint from a solution a previous search yielded, so
    /// that resuming from it yields only the solutions that came after.
    #[must_use]
    pub fn from_solution(solution: Solution) -> Self {
        Self {
            solution,
            stats: SearchStats::default(),
            reported: true,
        }
    }

    /// Overwrites the checkpoint with `progress`. The recorded path has not
    /// been searched below, so it is marked as not yet reported.
    pub fn record(&mut self, progress: &Progress<'_>) {
        self.solution.clear();
        self.solution.extend_from_slice(progress.solution);
        self.stats = progress.stats;
        self.reported = false;
    }
}

impl ResumeState for Checkpoint {
    fn solution(&self) -> &[Row] {
        &self.solution
    }

    fn stats(&self) -> Option<SearchStats> {
        Some(self.stats)
    }

    fn solution_reported(&self) -> bool {
        self.reported
    }

    fn store_periodically(&mut self, progress: &Progress<'_>) {
        self.record(progress);
    }
}

/// A [`ResumeState`] backed by a JSON file, written at most once per
/// interval.
///
/// ```no_run
/// use dlx_resume::{ExactCover, PeriodicCheckpoint};
/// use std::time::Duration;
///
/// let mut problem = ExactCover::new(["a", "b"], 0, [[1, 0], [0, 1], [1, 1]])?;
/// let mut state = PeriodicCheckpoint::open("search.json")?.with_interval(Duration::from_secs(30));
/// for solution in problem.solve_resuming(&mut state) {
///     println!("{solution:?}");
/// }
/// state.finish()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct PeriodicCheckpoint {
    path: PathBuf,
    interval: Duration,
    last_saved: Instant,
    checkpoint: Checkpoint,
}

impl PeriodicCheckpoint {
    /// Interval used unless [`with_interval`](Self::with_interval) says otherwise.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

    /// Loads the checkpoint at `path`, or starts a fresh one if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// [`CheckpointError`] if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let path = path.into();
        let checkpoint = match fs::read_to_string(&path) {
            Ok(json) => {
                let checkpoint: Checkpoint = serde_json::from_str(&json)?;
                log::debug!(
                    "loaded checkpoint from {}: depth {}, {} searches",
                    path.display(),
                    checkpoint.solution.len(),
                    checkpoint.stats.num_searches
                );
                checkpoint
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Checkpoint::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            interval: Self::DEFAULT_INTERVAL,
            last_saved: Instant::now(),
            checkpoint,
        })
    }

    /// Sets the minimum time between two writes made by the search. Zero
    /// writes on every step.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The checkpoint file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The most recent progress seen, or the loaded state if the search has
    /// not started.
    #[must_use]
    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// Writes the current checkpoint now, regardless of the interval.
    ///
    /// # Errors
    ///
    /// [`CheckpointError`] if serialization or the write fails.
    pub fn save(&mut self) -> Result<(), CheckpointError> {
        let json = serde_json::to_string_pretty(&self.checkpoint)?;
        // Write-then-rename so an interrupted write never leaves a torn file.
        let tmp = self.path.with_extension("tmp");
        let written = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::debug!("could not remove {}: {cleanup}", tmp.display());
            }
            return Err(err.into());
        }
        self.last_saved = Instant::now();
        log::debug!(
            "saved checkpoint to {}: depth {}, {} searches, {} solutions",
            self.path.display(),
            self.checkpoint.solution.len(),
            self.checkpoint.stats.num_searches,
            self.checkpoint.stats.num_solutions
        );
        Ok(())
    }

    /// Deletes the checkpoint file once the search it tracked has run to
    /// completion.
    ///
    /// # Errors
    ///
    /// [`CheckpointError`] if the file exists but cannot be removed.
    pub fn finish(self) -> Result<(), CheckpointError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ResumeState for PeriodicCheckpoint {
    fn solution(&self) -> &[Row] {
        &self.checkpoint.solution
    }

    fn stats(&self) -> Option<SearchStats> {
        Some(self.checkpoint.stats)
    }

    fn solution_reported(&self) -> bool {
        self.checkpoint.reported
    }

    fn store_periodically(&mut self, progress: &Progress<'_>) {
        self.checkpoint.record(progress);
        if self.last_saved.elapsed() >= self.interval {
            if let Err(err) = self.save() {
                log::warn!("failed to save checkpoint to {}: {err}", self.path.display());
            }
        }
    }
}
