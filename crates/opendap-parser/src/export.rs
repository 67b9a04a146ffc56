//! Row-labeled flattening of profile results.
//!
//! The first row holds the axis labels (a corner label followed by the
//! cross-shore positions); every following row is a time label followed by
//! that year's altitudes.

use coastal_common::{Matrix2D, Value};
use serde::{Deserialize, Serialize};

use crate::datasets::ProfileResult;
use crate::error::{ParseError, ParseResult};

/// Label written in the top-left cell.
pub const CORNER_LABEL: &str = "year";

/// One table cell: a text label or a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Label(String),
    Value(Value),
}

/// Flattened profile, ready for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileTable {
    pub rows: Vec<Vec<Cell>>,
}

impl ProfileResult {
    pub fn to_table(&self) -> ProfileTable {
        let header = std::iter::once(Cell::Label(CORNER_LABEL.to_string()))
            .chain(self.cross_shore.iter().copied().map(Cell::Value))
            .collect();

        let mut rows = Vec::with_capacity(self.years.len() + 1);
        rows.push(header);
        for (year, values) in self.years.iter().zip(self.altitude.rows()) {
            rows.push(
                std::iter::once(Cell::Label(year.clone()))
                    .chain(values.iter().copied().map(Cell::Value))
                    .collect(),
            );
        }
        ProfileTable { rows }
    }
}

impl ProfileTable {
    /// Re-derive the profile this table was exported from.
    pub fn to_profile(&self) -> ParseResult<ProfileResult> {
        let (header, body) = self
            .rows
            .split_first()
            .ok_or_else(|| ParseError::InvalidTable("table has no header row".to_string()))?;

        let cross_shore = values_after_label(header, 0)?;
        let mut years = Vec::with_capacity(body.len());
        let mut altitude = Vec::with_capacity(body.len());
        for (i, row) in body.iter().enumerate() {
            match row.first() {
                Some(Cell::Label(year)) => years.push(year.clone()),
                _ => {
                    return Err(ParseError::InvalidTable(format!(
                        "row {} does not start with a time label",
                        i + 1
                    )))
                }
            }
            altitude.push(values_after_label(row, i + 1)?);
        }

        let altitude = Matrix2D::new(altitude, cross_shore.len())
            .map_err(|e| ParseError::InvalidTable(e.to_string()))?;
        Ok(ProfileResult {
            cross_shore,
            years,
            altitude,
        })
    }
}

fn values_after_label(row: &[Cell], index: usize) -> ParseResult<Vec<Value>> {
    row.iter()
        .skip(1)
        .map(|cell| match cell {
            Cell::Value(v) => Ok(*v),
            Cell::Label(text) => Err(ParseError::InvalidTable(format!(
                "row {} holds label {:?} where a value was expected",
                index, text
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProfileResult {
        ProfileResult {
            cross_shore: vec![Value::Number(10.0), Value::Number(20.0)],
            years: vec!["2010".to_string(), String::new()],
            altitude: Matrix2D::from_rows(vec![
                vec![Value::Number(1.5), Value::Missing],
                vec![Value::Missing, Value::Number(-2.0)],
            ])
            .unwrap(),
        }
    }

    #[test]
    fn test_table_layout() {
        let table = profile().to_table();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], Cell::Label("year".to_string()));
        assert_eq!(table.rows[0][2], Cell::Value(Value::Number(20.0)));
        assert_eq!(table.rows[1][0], Cell::Label("2010".to_string()));
        assert_eq!(table.rows[1][2], Cell::Value(Value::Missing));
    }

    #[test]
    fn test_round_trip_keeps_missing_and_empty_labels() {
        let original = profile();
        assert_eq!(original.to_table().to_profile().unwrap(), original);
    }

    #[test]
    fn test_json_round_trip() {
        let table = profile().to_table();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.starts_with(r#"[["year",10.0,20.0],["2010",1.5,null]"#));
        let back: ProfileTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_ragged_table_rejected() {
        let mut table = profile().to_table();
        table.rows[1].pop();
        assert!(matches!(table.to_profile(), Err(ParseError::InvalidTable(_))));
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = ProfileTable { rows: Vec::new() };
        assert!(table.to_profile().is_err());
    }
}
