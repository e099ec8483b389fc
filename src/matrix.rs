//! The toroidal sparse matrix ("dancing links") and the cover / uncover
//! operations the search is built on.

use std::{collections, iter};

use crate::{ConfigurationError, Row};

/// Index of the root node, which heads the ring of active primary columns.
const ROOT: usize = 0;

/// Node is a node in the sparse graph associating rows with the columns
/// they cover. The root and the column headers are nodes too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    /// For data nodes, the header index of the owning column; for column
    /// headers, the number of data nodes currently linked into the column.
    column_or_size: usize,
    /// Zero-based input row of a data node. Unused for headers.
    row: usize,
    up: usize,
    down: usize,
    left: usize,
    right: usize,
}

/// Values accepted as matrix cells: `false`/`0` leave the cell empty,
/// anything else places a 1.
pub trait Truthy {
    /// Whether the cell holds a 1.
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

macro_rules! impl_truthy_for_int {
    ($($ty:ty),*) => {
        $(
            impl Truthy for $ty {
                fn is_truthy(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

impl_truthy_for_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<T: Truthy + ?Sized> Truthy for &T {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

/// An exact cover matrix in dancing-links form.
///
/// Columns are addressed by their zero-based position in the header; rows
/// by their zero-based position in the input. The trailing `secondary`
/// columns are *secondary*: a solution covers them at most once instead of
/// exactly once.
///
/// A `Matrix` is built once and then only shrunk and regrown logically by
/// [`cover`](Self::cover) and [`uncover`](Self::uncover). It is cheap to
/// [`Clone`], which is how independent searches over the same problem get
/// their own graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    // As with any dancing-links structure, the nodes would naturally be
    // cross-linked through pointers. Here every link is an index into
    // `nodes`, which owns them all: index 0 is the root, indices
    // 1..=columns are the column headers in header order, and the data
    // nodes follow row by row.
    nodes: Vec<Node>,

    /// Column names, in header order.
    names: Vec<String>,

    /// Number of trailing secondary columns.
    secondary: usize,

    /// The sorted column names covered by each row.
    row_labels: Vec<Row>,
}

impl Matrix {
    /// Builds a matrix from a header row and dense rows of cells, one cell
    /// per header column.
    ///
    /// ```
    /// let matrix = dlx_resume::Matrix::new(["a", "b", "c"], 1, [[1, 1, 0], [0, 1, 1]])?;
    /// assert_eq!(matrix.row_count(), 2);
    /// assert_eq!(matrix.primary_count(), 2);
    /// # Ok::<(), dlx_resume::ConfigurationError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if `secondary` exceeds the number of columns,
    /// a column name repeats, or a row's length differs from the header's.
    pub fn new<H, S, R, C, T>(header: H, secondary: usize, rows: R) -> Result<Self, ConfigurationError>
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = T>,
        T: Truthy,
    {
        let mut matrix = Self::with_header(header, secondary)?;
        let expected = matrix.column_count();
        for (row, cells) in rows.into_iter().enumerate() {
            let mut len = 0;
            let mut columns = Vec::new();
            for (column, cell) in cells.into_iter().enumerate() {
                len += 1;
                if cell.is_truthy() {
                    columns.push(column);
                }
            }
            if len != expected {
                return Err(ConfigurationError::RaggedRow { row, len, expected });
            }
            matrix.append_row(&columns);
        }
        Ok(matrix)
    }

    /// Builds a matrix from a header row and sparse rows, each listing the
    /// zero-based indices of the columns it covers (in any order).
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if `secondary` exceeds the number of columns,
    /// a column name repeats, or a row refers to a column that does not
    /// exist or lists one twice.
    pub fn from_sparse<H, S, R, C>(header: H, secondary: usize, rows: R) -> Result<Self, ConfigurationError>
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = usize>,
    {
        let mut matrix = Self::with_header(header, secondary)?;
        let columns = matrix.column_count();
        for (row, cells) in rows.into_iter().enumerate() {
            let mut cells: Vec<usize> = cells.into_iter().collect();
            if let Some(&column) = cells.iter().find(|&&column| column >= columns) {
                return Err(ConfigurationError::ColumnOutOfRange {
                    row,
                    column,
                    columns,
                });
            }
            cells.sort_unstable();
            if let Some(pair) = cells.windows(2).find(|pair| pair[0] == pair[1]) {
                return Err(ConfigurationError::DuplicateColumnInRow {
                    row,
                    column: pair[0],
                });
            }
            matrix.append_row(&cells);
        }
        Ok(matrix)
    }

    /// Creates the root and the column headers, linking the primary columns
    /// into the root ring and self-looping the secondary ones.
    fn with_header<H, S>(header: H, secondary: usize) -> Result<Self, ConfigurationError>
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = header.into_iter().map(Into::into).collect();
        let columns = names.len();
        if secondary > columns {
            return Err(ConfigurationError::SecondaryOutOfRange { secondary, columns });
        }
        let mut seen = collections::HashSet::with_capacity(columns);
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ConfigurationError::DuplicateColumn { name: name.clone() });
            }
        }

        let mut matrix = Matrix {
            nodes: Vec::with_capacity(columns + 1),
            names,
            secondary,
            row_labels: Vec::new(),
        };
        matrix.nodes.push(Node {
            column_or_size: 0,
            row: 0,
            up: ROOT,
            down: ROOT,
            left: ROOT,
            right: ROOT,
        });
        for header in 1..=columns {
            matrix.nodes.push(Node {
                column_or_size: 0,
                row: 0,
                up: header,
                down: header,
                left: header,
                right: header,
            });
            if header <= columns - secondary {
                // Append to the end of the root ring.
                let left = matrix.left(ROOT);
                matrix.set_left(header, left);
                matrix.set_right(header, ROOT);
                matrix.relink_into_row(header);
            }
        }
        Ok(matrix)
    }

    /// Appends one row covering `columns`, which must be sorted, unique and
    /// in range. Empty rows still consume a row index.
    fn append_row(&mut self, columns: &[usize]) {
        let row = self.row_labels.len();
        let mut first = None;
        for &column in columns {
            let header = column + 1;
            let node = self.nodes.len();

            // Insert at the bottom of the column.
            let up = self.up(header);
            self.nodes.push(Node {
                column_or_size: header,
                row,
                up,
                down: header,
                left: node,
                right: node,
            });
            self.relink_into_column(node);
            self.incr_size(header);

            // Insert at the end of the row.
            match first {
                None => first = Some(node),
                Some(first) => {
                    let left = self.left(first);
                    self.set_left(node, left);
                    self.set_right(node, first);
                    self.relink_into_row(node);
                }
            }
        }

        let mut labels: Row = columns.iter().map(|&column| self.names[column].clone()).collect();
        labels.sort();
        self.row_labels.push(labels);
    }

    /// Number of columns, primary and secondary.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    /// Number of primary columns, which every solution covers exactly once.
    #[must_use]
    pub fn primary_count(&self) -> usize {
        self.names.len() - self.secondary
    }

    /// Number of trailing secondary columns.
    #[must_use]
    pub fn secondary_count(&self) -> usize {
        self.secondary
    }

    /// Number of input rows, empty ones included.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    /// Name of the zero-based `column`.
    ///
    /// # Panics
    ///
    /// If `column` is out of range.
    #[must_use]
    pub fn column_name(&self, column: usize) -> &str {
        &self.names[column]
    }

    /// All column names, in header order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Whether `column` is one of the trailing secondary columns. False for
    /// indices past the last column.
    #[must_use]
    pub fn is_secondary(&self, column: usize) -> bool {
        column >= self.primary_count() && column < self.column_count()
    }

    /// The sorted names of the columns `row` covers.
    ///
    /// # Panics
    ///
    /// If `row` is out of range.
    #[must_use]
    pub fn row_labels(&self, row: usize) -> &Row {
        &self.row_labels[row]
    }

    /// Number of rows currently available to cover `column`.
    ///
    /// # Panics
    ///
    /// If `column` is out of range.
    #[must_use]
    pub fn column_size(&self, column: usize) -> usize {
        self.size(column + 1)
    }

    /// Iterates over the primary columns that still need covering, in
    /// header order.
    pub fn active_columns(&self) -> impl Iterator<Item = usize> + '_ {
        let mut header = ROOT;
        iter::from_fn(move || {
            header = self.right(header);
            (header != ROOT).then(|| header - 1)
        })
    }

    /// Removes `column` from the ring of columns to cover and hides every
    /// row that intersects it from all the other columns those rows touch.
    ///
    /// `column` must not already be covered. Covers must be undone with
    /// [`uncover`](Self::uncover) in the reverse order they were made.
    pub fn cover(&mut self, column: usize) {
        debug_assert!(column < self.column_count(), "{column} must be a column");
        self.cover_header(column + 1);
    }

    /// Exact inverse of [`cover`](Self::cover).
    pub fn uncover(&mut self, column: usize) {
        debug_assert!(column < self.column_count(), "{column} must be a column");
        self.uncover_header(column + 1);
    }

    /// The active column the search would branch on next: the one with the
    /// fewest rows, leftmost on ties. `None` once every primary column is
    /// covered.
    #[must_use]
    pub fn choose_column(&self) -> Option<usize> {
        self.choose_header().map(|header| header - 1)
    }

    // Search-facing helpers, in terms of node indices.

    /// Finds the active column with the fewest rows, preferring the
    /// leftmost on ties. Returns its header index, or `None` once every
    /// primary column is covered.
    pub(crate) fn choose_header(&self) -> Option<usize> {
        let mut header = self.right(ROOT);
        if header == ROOT {
            return None;
        }

        let mut min_size = self.size(header);
        let mut min_header = header;
        loop {
            header = self.right(header);
            if header == ROOT {
                break;
            }
            let size = self.size(header);
            if size < min_size {
                min_size = size;
                min_header = header;
            }
        }
        Some(min_header)
    }

    pub(crate) fn cover_header(&mut self, header: usize) {
        // The header keeps its own links, which is all uncover needs to
        // put it back.
        self.unlink_from_row(header);
        let mut covered_node = header;
        loop {
            covered_node = self.down(covered_node);
            if covered_node == header {
                break;
            }
            let mut conflicting_node = covered_node;
            loop {
                conflicting_node = self.right(conflicting_node);
                if conflicting_node == covered_node {
                    break;
                }
                self.unlink_from_column(conflicting_node);
                let column = self.column(conflicting_node);
                self.decr_size(column);
            }
        }
    }

    pub(crate) fn uncover_header(&mut self, header: usize) {
        // Exact reverse of cover_header: up instead of down, left instead
        // of right.
        let mut covered_node = header;
        loop {
            covered_node = self.up(covered_node);
            if covered_node == header {
                break;
            }
            let mut conflicting_node = covered_node;
            loop {
                conflicting_node = self.left(conflicting_node);
                if conflicting_node == covered_node {
                    break;
                }
                let column = self.column(conflicting_node);
                self.incr_size(column);
                self.relink_into_column(conflicting_node);
            }
        }
        self.relink_into_row(header);
    }

    /// Covers the column of every node in `node`'s row except `node`
    /// itself.
    pub(crate) fn cover_row(&mut self, node: usize) {
        let mut row_node = node;
        loop {
            row_node = self.right(row_node);
            if row_node == node {
                break;
            }
            let column = self.column(row_node);
            self.cover_header(column);
        }
    }

    pub(crate) fn uncover_row(&mut self, node: usize) {
        let mut row_node = node;
        loop {
            row_node = self.left(row_node);
            if row_node == node {
                break;
            }
            let column = self.column(row_node);
            self.uncover_header(column);
        }
    }

    pub(crate) fn row_of(&self, node: usize) -> usize {
        self.nodes[node].row
    }

    pub(crate) fn down(&self, node: usize) -> usize {
        self.nodes[node].down
    }

    // Basic accessors, hiding most of the direct indexing of `nodes`.

    fn size(&self, header: usize) -> usize {
        self.nodes[header].column_or_size
    }

    fn incr_size(&mut self, header: usize) {
        self.nodes[header].column_or_size += 1;
    }

    fn decr_size(&mut self, header: usize) {
        self.nodes[header].column_or_size -= 1;
    }

    fn column(&self, node: usize) -> usize {
        self.nodes[node].column_or_size
    }

    fn up(&self, node: usize) -> usize {
        self.nodes[node].up
    }

    fn left(&self, node: usize) -> usize {
        self.nodes[node].left
    }

    fn set_left(&mut self, node: usize, val: usize) {
        self.nodes[node].left = val;
    }

    fn right(&self, node: usize) -> usize {
        self.nodes[node].right
    }

    fn set_right(&mut self, node: usize, val: usize) {
        self.nodes[node].right = val;
    }

    fn unlink_from_row(&mut self, node: usize) {
        let Node { left, right, .. } = self.nodes[node];
        self.nodes[left].right = right;
        self.nodes[right].left = left;
    }

    fn relink_into_row(&mut self, node: usize) {
        let Node { left, right, .. } = self.nodes[node];
        self.nodes[left].right = node;
        self.nodes[right].left = node;
    }

    fn unlink_from_column(&mut self, node: usize) {
        let Node { up, down, .. } = self.nodes[node];
        self.nodes[up].down = down;
        self.nodes[down].up = up;
    }

    fn relink_into_column(&mut self, node: usize) {
        let Node { up, down, .. } = self.nodes[node];
        self.nodes[up].down = node;
        self.nodes[down].up = node;
    }
}
