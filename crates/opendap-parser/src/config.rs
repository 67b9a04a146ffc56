//! Dataset constants and variable names used by the parsers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Constants describing the transect dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Integer used by the dataset for "no data".
    pub sentinel: f64,

    /// Total declared size of the identifier catalog.
    pub catalog_size: usize,

    /// Time values inside this range are read as calendar years.
    pub year_min: i32,
    pub year_max: i32,

    /// Epoch for day-offset time axes.
    pub epoch: NaiveDate,

    /// Explicit time units (e.g. `days since 1970-01-01`); overrides the range heuristic.
    pub time_units: Option<String>,

    pub variables: VariableNames,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            sentinel: -9999.0,
            catalog_size: 2465,
            year_min: 1800,
            year_max: 2100,
            epoch: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            time_units: None,
            variables: VariableNames::default(),
        }
    }
}

impl ParserConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.year_min > self.year_max {
            return Err(format!(
                "year_min ({}) must not exceed year_max ({})",
                self.year_min, self.year_max
            ));
        }
        if self.catalog_size == 0 {
            return Err("catalog_size must be > 0".to_string());
        }
        if self.variables.water_levels.is_empty() || self.variables.coastline.is_empty() {
            return Err("series datasets need at least one value variable".to_string());
        }
        Ok(())
    }
}

/// Names of the variables each dataset parser reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableNames {
    pub cross_shore: String,
    pub time: String,
    pub altitude: String,
    pub id: String,
    pub area_code: String,
    pub area_name: String,
    pub rsp_x: String,
    pub rsp_y: String,
    pub rsp_lat: String,
    pub rsp_lon: String,
    pub water_levels: Vec<String>,
    pub coastline: Vec<String>,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            cross_shore: "cross_shore".to_string(),
            time: "time".to_string(),
            altitude: "altitude".to_string(),
            id: "id".to_string(),
            area_code: "areacode".to_string(),
            area_name: "areaname".to_string(),
            rsp_x: "rsp_x".to_string(),
            rsp_y: "rsp_y".to_string(),
            rsp_lat: "rsp_lat".to_string(),
            rsp_lon: "rsp_lon".to_string(),
            water_levels: vec!["mean_high_water".to_string(), "mean_low_water".to_string()],
            coastline: vec!["momentary_coastline".to_string()],
        }
    }
}
