//! Error types.
//!
//! Only matrix construction and the file-backed checkpoint can fail; once a
//! search has started it always runs to completion.

use std::io;

/// A malformed input matrix, reported by [`Matrix::new`](crate::Matrix::new)
/// and [`Matrix::from_sparse`](crate::Matrix::from_sparse) before any search
/// begins.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigurationError {
    /// More secondary columns were requested than the header has columns.
    #[display("{secondary} secondary columns requested but the header only has {columns}")]
    SecondaryOutOfRange { secondary: usize, columns: usize },

    /// A dense row does not have one cell per header column.
    #[display("row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// Two header columns share a name.
    #[display("duplicate column name {name:?}")]
    DuplicateColumn { name: String },

    /// A sparse row names a column index past the end of the header.
    #[display("row {row} refers to column {column}, but there are only {columns} columns")]
    ColumnOutOfRange {
        row: usize,
        column: usize,
        columns: usize,
    },

    /// A sparse row lists the same column twice.
    #[display("row {row} lists column {column} more than once")]
    DuplicateColumnInRow { row: usize, column: usize },
}

/// Failure to read or write a [`PeriodicCheckpoint`](crate::PeriodicCheckpoint)
/// file.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CheckpointError {
    /// Reading, writing or removing the file failed.
    #[display("checkpoint I/O failed: {_0}")]
    Io(io::Error),
    /// The file does not hold a serialized checkpoint.
    #[display("checkpoint is not valid JSON: {_0}")]
    Json(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = ConfigurationError::RaggedRow {
            row: 3,
            len: 2,
            expected: 7,
        };
        assert_eq!(err.to_string(), "row 3 has 2 cells, expected 7");

        let err = ConfigurationError::SecondaryOutOfRange {
            secondary: 4,
            columns: 3,
        };
        assert_eq!(
            err.to_string(),
            "4 secondary columns requested but the header only has 3"
        );
    }

    #[test]
    fn checkpoint_error_from_io() {
        let err: CheckpointError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CheckpointError::Io(_)));
        assert_eq!(err.to_string(), "checkpoint I/O failed: gone");
    }
}
