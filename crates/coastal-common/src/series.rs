//! Numeric value types shared by the parser, cache and coordinator.
//!
//! Every missing reading is represented by [`Value::Missing`], whatever the
//! source encoding was (a `NaN` token in the payload or the dataset sentinel).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single reading: either a finite number or the unified missing marker.
///
/// Serialises as a JSON number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Value {
    Number(f64),
    Missing,
}

impl Value {
    /// Wrap a float, mapping non-finite values to `Missing`.
    pub fn from_f64(v: f64) -> Self {
        if v.is_finite() {
            Value::Number(v)
        } else {
            Value::Missing
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Replace the dataset sentinel with `Missing`.
    pub fn unify_sentinel(self, sentinel: f64) -> Self {
        match self {
            Value::Number(v) if v == sentinel => Value::Missing,
            other => other,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::from_f64(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map(Value::from_f64).unwrap_or(Value::Missing)
    }
}

impl From<Value> for Option<f64> {
    fn from(v: Value) -> Self {
        v.as_f64()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Missing => write!(f, "NaN"),
        }
    }
}

/// Ordered sequence of readings in source order.
pub type NumericSeries = Vec<Value>;

/// Replace every sentinel occurrence in a series with `Missing`.
pub fn unify_sentinel(series: &mut [Value], sentinel: f64) {
    for value in series.iter_mut() {
        *value = value.unify_sentinel(sentinel);
    }
}

/// A row whose length does not match the matrix column count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row} has {found} values, expected {expected}")]
pub struct MatrixError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// Rectangular matrix of readings stored as rows.
///
/// Every row has exactly `cols` values; construction rejects ragged input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NumericSeries>", into = "Vec<NumericSeries>")]
pub struct Matrix2D {
    rows: Vec<NumericSeries>,
    cols: usize,
}

impl Matrix2D {
    /// Build a matrix with an explicit column count.
    pub fn new(rows: Vec<NumericSeries>, cols: usize) -> Result<Self, MatrixError> {
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MatrixError {
                row,
                expected: cols,
                found: r.len(),
            });
        }
        Ok(Self { rows, cols })
    }

    /// Build a matrix taking the column count from the first row.
    pub fn from_rows(rows: Vec<NumericSeries>) -> Result<Self, MatrixError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        Self::new(rows, cols)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> &[NumericSeries] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Value> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Apply a transformation to every value in place.
    pub fn map_values(&mut self, f: impl Fn(Value) -> Value) {
        for row in &mut self.rows {
            for value in row.iter_mut() {
                *value = f(*value);
            }
        }
    }

    /// Number of missing readings across all rows.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.iter())
            .filter(|v| v.is_missing())
            .count()
    }

    pub fn into_rows(self) -> Vec<NumericSeries> {
        self.rows
    }
}

impl TryFrom<Vec<NumericSeries>> for Matrix2D {
    type Error = MatrixError;

    fn try_from(rows: Vec<NumericSeries>) -> Result<Self, Self::Error> {
        Matrix2D::from_rows(rows)
    }
}

impl From<Matrix2D> for Vec<NumericSeries> {
    fn from(m: Matrix2D) -> Self {
        m.rows
    }
}
