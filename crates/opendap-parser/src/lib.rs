//! Parser for OPeNDAP ASCII renderings of coastal transect data.
//!
//! The server renders each requested variable as a header line
//! (`name[dim]...`) followed by comma separated values, optionally after a
//! structural preamble closed by a dash delimiter. The format is loose:
//! values wrap arbitrarily, multi-dimensional rows carry index annotations,
//! axis order occasionally differs from the header, and missing readings
//! appear both as `NaN` and as a sentinel integer.
//!
//! # Pipeline
//!
//! 1. [`extract`] locates a variable's payload block.
//! 2. [`tokenize`] turns payload text into a flat value stream.
//! 3. [`shape`] reshapes flat streams into `time x cross-shore` matrices.
//! 4. [`time`] labels time axes with calendar years.
//! 5. [`datasets`] composes the above into one typed result per dataset.
//!
//! All parsing is synchronous and deterministic: parsing the same text twice
//! yields equal results.

pub mod config;
pub mod datasets;
pub mod error;
pub mod export;
pub mod extract;
pub mod shape;
pub mod time;
pub mod tokenize;

pub use config::{ParserConfig, VariableNames};
pub use datasets::{
    Area, DatasetParser, IdCatalog, ProfileResult, ReferencePoint, SeriesRecord, TimeSeries,
};
pub use error::{ParseError, ParseResult};
pub use export::{Cell, ProfileTable};
pub use extract::{extract_payload, Document, VariableBlock};
pub use shape::{Layout, ShapeResolver};
pub use time::{TimeLabeler, TimeUnits};
pub use tokenize::{tokenize, tokenize_annotated};
