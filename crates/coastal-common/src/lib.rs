//! Common types shared across the coastal transect crates.

pub mod error;
pub mod resource;
pub mod series;

pub use error::{CoastalError, CoastalResult};
pub use resource::{DatasetKind, ResourceRequest, SliceExpr, VariableSlice};
pub use series::{Matrix2D, MatrixError, NumericSeries, Value};
