//! Display labels for time axes.
//!
//! Transect time axes arrive either as plain calendar years or as day
//! offsets from an epoch. When the response carries a units descriptor it
//! decides; otherwise a value range check picks the interpretation.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use coastal_common::Value;

use crate::config::ParserConfig;

/// Units of a time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnits {
    /// Values are calendar years.
    Years,
    /// Values are days since the given date.
    DaysSince(NaiveDate),
}

#[derive(Debug, thiserror::Error)]
pub enum TimeUnitsError {
    #[error("Unsupported time units: {0}")]
    Unsupported(String),
}

impl FromStr for TimeUnits {
    type Err = TimeUnitsError;

    /// Accepts `years`/`year` and `days since YYYY-MM-DD[ anything]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "years" || lower == "year" {
            return Ok(TimeUnits::Years);
        }

        let mut words = lower.split_whitespace();
        if let (Some("days" | "day"), Some("since"), Some(date)) =
            (words.next(), words.next(), words.next())
        {
            // Timestamps such as 1970-01-01T00:00:00Z keep only the date part.
            let date = date.split('t').next().unwrap_or(date);
            if let Ok(epoch) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                return Ok(TimeUnits::DaysSince(epoch));
            }
        }

        Err(TimeUnitsError::Unsupported(s.to_string()))
    }
}

/// Converts raw time axes to label strings.
#[derive(Debug, Clone)]
pub struct TimeLabeler {
    year_min: i32,
    year_max: i32,
    epoch: NaiveDate,
    units: Option<TimeUnits>,
}

impl TimeLabeler {
    pub fn new(year_min: i32, year_max: i32, epoch: NaiveDate) -> Self {
        Self {
            year_min,
            year_max,
            epoch,
            units: None,
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        let labeler = Self::new(config.year_min, config.year_max, config.epoch);
        match config.time_units.as_deref().map(str::parse::<TimeUnits>) {
            Some(Ok(units)) => labeler.with_units(units),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring configured time units");
                labeler
            }
            None => labeler,
        }
    }

    /// Use explicit units instead of the range heuristic.
    pub fn with_units(mut self, units: TimeUnits) -> Self {
        self.units = Some(units);
        self
    }

    /// Units that would be applied to `values`.
    pub fn units_for(&self, values: &[Value]) -> TimeUnits {
        if let Some(units) = self.units {
            return units;
        }
        let all_years = values
            .iter()
            .filter_map(Value::as_f64)
            .all(|v| v.round() >= self.year_min as f64 && v.round() <= self.year_max as f64);
        if all_years {
            TimeUnits::Years
        } else {
            TimeUnits::DaysSince(self.epoch)
        }
    }

    /// One label per value; missing or unrepresentable values get an empty label.
    pub fn labels(&self, values: &[Value]) -> Vec<String> {
        let units = self.units_for(values);
        values
            .iter()
            .map(|v| match (v.as_f64(), units) {
                (Some(year), TimeUnits::Years) => format!("{}", year.round() as i64),
                (Some(days), TimeUnits::DaysSince(epoch)) => day_offset_year(epoch, days)
                    .map(|y| y.to_string())
                    .unwrap_or_default(),
                (None, _) => String::new(),
            })
            .collect()
    }
}

fn day_offset_year(epoch: NaiveDate, days: f64) -> Option<i32> {
    let whole = days.floor();
    if whole.abs() > i32::MAX as f64 {
        return None;
    }
    epoch
        .checked_add_signed(Duration::days(whole as i64))
        .map(|d| d.year())
}
