//! Reshaping flat value streams into row/column matrices.
//!
//! Layouts are tried in a fixed order and the first one that fits wins:
//!
//! 1. [`Layout::RowMajor`]: header declares exactly `[rows][cols]` (or
//!    declares nothing) and the stream holds `rows * cols` values.
//! 2. [`Layout::Transposed`]: header declares `[cols][rows]` with
//!    `rows != cols`; `out[r][c] = flat[c * rows + r]`.
//! 3. [`Layout::SingletonRowMajor`]: any other header whose value count is
//!    `rows * 1 * cols`, e.g. a leaked length-one alongshore axis.
//!
//! Anything else is a [`ParseError::ShapeMismatch`].

use coastal_common::{Matrix2D, NumericSeries, Value};
use tracing::{debug, warn};

use crate::error::{excerpt, ParseError, ParseResult};

/// How the flat stream was mapped onto the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    RowMajor,
    Transposed,
    SingletonRowMajor,
}

const STRATEGIES: &[Layout] = &[Layout::RowMajor, Layout::Transposed, Layout::SingletonRowMajor];

impl Layout {
    fn matches(&self, len: usize, rows: usize, cols: usize, declared: &[usize]) -> bool {
        if len != rows * cols {
            return false;
        }
        match self {
            Layout::RowMajor => declared.is_empty() || declared == [rows, cols],
            Layout::Transposed => rows != cols && squeeze(declared) == [cols, rows],
            Layout::SingletonRowMajor => true,
        }
    }

    fn fill(&self, flat: &[Value], rows: usize, cols: usize) -> Vec<NumericSeries> {
        if cols == 0 {
            return vec![Vec::new(); rows];
        }
        match self {
            Layout::RowMajor | Layout::SingletonRowMajor => {
                flat.chunks(cols).take(rows).map(|c| c.to_vec()).collect()
            }
            Layout::Transposed => (0..rows)
                .map(|r| (0..cols).map(|c| flat[c * rows + r]).collect())
                .collect(),
        }
    }
}

/// Declared sizes with length-one axes removed.
fn squeeze(declared: &[usize]) -> Vec<usize> {
    declared.iter().copied().filter(|&d| d != 1).collect()
}

/// Reshapes flat streams and unifies the dataset sentinel.
#[derive(Debug, Clone, Copy)]
pub struct ShapeResolver {
    sentinel: f64,
}

impl ShapeResolver {
    pub fn new(sentinel: f64) -> Self {
        Self { sentinel }
    }

    /// Shape `flat` into `rows x cols`.
    ///
    /// `declared` holds the header's dimension sizes (empty if unknown) and
    /// only disambiguates between layouts; `variable` and `source` feed the
    /// error report.
    pub fn resolve(
        &self,
        variable: &str,
        flat: &[Value],
        rows: usize,
        cols: usize,
        declared: &[usize],
        source: &str,
    ) -> ParseResult<(Matrix2D, Layout)> {
        let layout = STRATEGIES
            .iter()
            .copied()
            .find(|l| l.matches(flat.len(), rows, cols, declared))
            .ok_or_else(|| ParseError::ShapeMismatch {
                variable: variable.to_string(),
                observed: flat.len(),
                rows,
                cols,
                expected: rows * cols,
                excerpt: excerpt(source),
            })?;

        match layout {
            Layout::Transposed => warn!(variable, rows, cols, "payload emitted in transposed order"),
            Layout::SingletonRowMajor => {
                debug!(variable, ?declared, "reshaping across singleton axes")
            }
            Layout::RowMajor => {}
        }

        let mut matrix = Matrix2D::new(layout.fill(flat, rows, cols), cols).map_err(|e| {
            ParseError::ShapeMismatch {
                variable: variable.to_string(),
                observed: flat.len(),
                rows,
                cols,
                expected: rows * cols,
                excerpt: e.to_string(),
            }
        })?;
        let sentinel = self.sentinel;
        matrix.map_values(|v| v.unify_sentinel(sentinel));
        Ok((matrix, layout))
    }
}
