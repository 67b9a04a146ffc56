//! Typed parsers for each dataset served by the transect endpoint.
//!
//! Every parser is a pure function of the raw text: the same input always
//! yields an equal result, and one dataset failing never affects another.

use coastal_common::{series::unify_sentinel, Matrix2D, NumericSeries, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::{ParseError, ParseResult};
use crate::extract::Document;
use crate::shape::ShapeResolver;
use crate::time::{TimeLabeler, TimeUnits};
use crate::tokenize::tokenize_annotated;

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("quoted string pattern is valid"));

/// Altitude cross-sections for one transect.
///
/// `altitude` has one row per entry of `years` and one column per entry of `cross_shore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub cross_shore: NumericSeries,
    pub years: Vec<String>,
    pub altitude: Matrix2D,
}

/// Ordered transect identifiers, addressed by catalog position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdCatalog {
    ids: Vec<i64>,
}

impl IdCatalog {
    pub fn new(ids: Vec<i64>) -> Self {
        Self { ids }
    }

    /// Identifier at a catalog position.
    pub fn get(&self, position: usize) -> Option<i64> {
        self.ids.get(position).copied()
    }

    /// Catalog position of an identifier.
    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// Drop a leading element equal to the declared catalog size.
    ///
    /// Some responses echo the dimension size in front of the values.
    pub fn without_size_artifact(mut self, catalog_size: usize) -> Self {
        if self.ids.first() == Some(&(catalog_size as i64)) {
            debug!(catalog_size, "dropping leading catalog size artifact");
            self.ids.remove(0);
        }
        self
    }
}

/// A coastal area code and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub code: Option<i64>,
    pub name: String,
}

/// Reference point of a transect in projected and geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub x: Value,
    pub y: Value,
    pub lat: Value,
    pub lon: Value,
}

/// One time step of a series dataset: a label and one value per variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub label: String,
    pub values: Vec<Value>,
}

/// A labelled multi-variable time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub variables: Vec<String>,
    pub records: Vec<SeriesRecord>,
}

impl TimeSeries {
    /// Values of one variable in time order.
    pub fn column(&self, variable: &str) -> Option<Vec<Value>> {
        let index = self.variables.iter().position(|v| v == variable)?;
        Some(self.records.iter().map(|r| r.values[index]).collect())
    }
}

/// How the catalog identifiers were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogStrategy {
    /// Header-delimited payload block.
    Structured,
    /// Everything after the first `name[` occurrence.
    RawScan,
}

const CATALOG_STRATEGIES: &[CatalogStrategy] = &[CatalogStrategy::Structured, CatalogStrategy::RawScan];

/// Parses raw ASCII responses into typed dataset results.
#[derive(Debug, Clone, Default)]
pub struct DatasetParser {
    config: ParserConfig,
}

impl DatasetParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Cross-shore axis, year labels and the altitude matrix for one transect.
    pub fn profile(&self, raw: &str) -> ParseResult<ProfileResult> {
        let names = &self.config.variables;
        let doc = Document::parse(raw);

        let cross_shore = required_values(&doc, &names.cross_shore)?;
        if cross_shore.is_empty() {
            return Err(ParseError::empty_axis(&names.cross_shore, doc.payload(&names.cross_shore)));
        }
        let time = required_values(&doc, &names.time)?;
        if time.is_empty() {
            return Err(ParseError::empty_axis(&names.time, doc.payload(&names.time)));
        }
        let years = self.labeler(&doc).labels(&time);

        let block = doc
            .block(&names.altitude)
            .ok_or_else(|| ParseError::extraction_failure(&names.altitude, doc.body()))?;
        let flat = tokenize_annotated(block.body);
        let (altitude, layout) = ShapeResolver::new(self.config.sentinel).resolve(
            &names.altitude,
            &flat,
            years.len(),
            cross_shore.len(),
            &block.dimensions,
            block.body,
        )?;

        debug!(
            years = years.len(),
            cross_shore = cross_shore.len(),
            missing = altitude.missing_count(),
            ?layout,
            "parsed profile"
        );
        Ok(ProfileResult {
            cross_shore,
            years,
            altitude,
        })
    }

    /// The ordered identifier catalog.
    pub fn catalog(&self, raw: &str) -> ParseResult<IdCatalog> {
        let name = &self.config.variables.id;
        let doc = Document::parse(raw);
        let mut last_context = doc.body().to_string();

        for strategy in CATALOG_STRATEGIES {
            let text = match strategy {
                CatalogStrategy::Structured => doc.payload(name).to_string(),
                CatalogStrategy::RawScan => {
                    let body = doc.body();
                    match raw_scan_start(body, name) {
                        Some(at) => body[at..].to_string(),
                        None => continue,
                    }
                }
            };
            let ids = to_integers(&tokenize_annotated(&text));
            if !ids.is_empty() {
                if *strategy == CatalogStrategy::RawScan {
                    warn!(variable = %name, "catalog recovered by raw text scan");
                }
                return Ok(IdCatalog::new(ids).without_size_artifact(self.config.catalog_size));
            }
            last_context = text;
        }

        Err(ParseError::extraction_failure(name.as_str(), &last_context))
    }

    /// Area codes paired with their names.
    pub fn areas(&self, raw: &str) -> ParseResult<Vec<Area>> {
        let names = &self.config.variables;
        let doc = Document::parse(raw);

        let codes = required_values(&doc, &names.area_code)?;
        let labels: Vec<String> = QUOTED
            .captures_iter(required_payload(&doc, &names.area_name)?)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect();

        if codes.is_empty() || labels.is_empty() || codes.len() != labels.len() {
            return Err(ParseError::ArrayLengthMismatch {
                dataset: "areas".to_string(),
                lengths: vec![
                    (names.area_code.clone(), codes.len()),
                    (names.area_name.clone(), labels.len()),
                ],
            });
        }

        Ok(codes
            .into_iter()
            .zip(labels)
            .map(|(code, name)| Area {
                code: code.as_f64().map(|c| c.round() as i64),
                name,
            })
            .collect())
    }

    /// Reference points from four parallel coordinate arrays.
    pub fn reference_points(&self, raw: &str) -> ParseResult<Vec<ReferencePoint>> {
        let names = &self.config.variables;
        let doc = Document::parse(raw);

        let mut columns = Vec::with_capacity(4);
        for name in [&names.rsp_x, &names.rsp_y, &names.rsp_lat, &names.rsp_lon] {
            let mut values = required_values(&doc, name)?;
            unify_sentinel(&mut values, self.config.sentinel);
            columns.push((name.clone(), values));
        }

        let len = columns[0].1.len();
        if columns.iter().any(|(_, c)| c.len() != len) {
            return Err(ParseError::ArrayLengthMismatch {
                dataset: "reference_points".to_string(),
                lengths: columns.iter().map(|(n, c)| (n.clone(), c.len())).collect(),
            });
        }

        Ok((0..len)
            .map(|i| ReferencePoint {
                x: columns[0].1[i],
                y: columns[1].1[i],
                lat: columns[2].1[i],
                lon: columns[3].1[i],
            })
            .collect())
    }

    /// Mean water levels per time step.
    pub fn water_levels(&self, raw: &str) -> ParseResult<TimeSeries> {
        self.series(raw, &self.config.variables.water_levels)
    }

    /// Coastline positions per time step.
    pub fn coastline(&self, raw: &str) -> ParseResult<TimeSeries> {
        self.series(raw, &self.config.variables.coastline)
    }

    /// Time axis plus value arrays, paired by position.
    ///
    /// Value arrays shorter than the time axis are padded with missing
    /// values; extra trailing values are ignored.
    pub fn series(&self, raw: &str, variables: &[String]) -> ParseResult<TimeSeries> {
        let doc = Document::parse(raw);
        let time = required_values(&doc, &self.config.variables.time)?;
        let labels = self.labeler(&doc).labels(&time);

        let mut columns = Vec::with_capacity(variables.len());
        for name in variables {
            let mut values = required_values(&doc, name)?;
            unify_sentinel(&mut values, self.config.sentinel);
            if values.len() != time.len() {
                debug!(
                    variable = %name,
                    values = values.len(),
                    time = time.len(),
                    "series length differs from time axis"
                );
            }
            columns.push(values);
        }

        let records = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| SeriesRecord {
                label,
                values: columns
                    .iter()
                    .map(|c| c.get(i).copied().unwrap_or(Value::Missing))
                    .collect(),
            })
            .collect();

        Ok(TimeSeries {
            variables: variables.to_vec(),
            records,
        })
    }

    /// Labeler for this document: response units first, then configured units, then heuristic.
    fn labeler(&self, doc: &Document) -> TimeLabeler {
        let labeler = TimeLabeler::from_config(&self.config);
        match doc
            .preamble_units(&self.config.variables.time)
            .map(|u| u.parse::<TimeUnits>())
        {
            Some(Ok(units)) => labeler.with_units(units),
            _ => labeler,
        }
    }
}

fn required_payload<'d>(doc: &'d Document, name: &str) -> ParseResult<&'d str> {
    doc.block(name)
        .map(|b| b.body)
        .ok_or_else(|| ParseError::extraction_failure(name, doc.body()))
}

fn required_values(doc: &Document, name: &str) -> ParseResult<NumericSeries> {
    let payload = required_payload(doc, name)?;
    Ok(tokenize_annotated(payload))
}

/// Round finite values to integers, dropping missing ones.
fn to_integers(values: &[Value]) -> Vec<i64> {
    values
        .iter()
        .filter_map(Value::as_f64)
        .map(|v| v.round() as i64)
        .collect()
}

/// Offset of the `[` opening the first bracket group of `name` that is not
/// part of a longer identifier.
fn raw_scan_start(body: &str, name: &str) -> Option<usize> {
    let pattern = format!(r"(?m)(?:^|[^\w])(?:\w+\.)*{}\[", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.find(body).map(|m| m.end() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DatasetParser {
        DatasetParser::default()
    }

    #[test]
    fn test_catalog_size_artifact_dropped() {
        let catalog = IdCatalog::new(vec![2465, 1, 2]).without_size_artifact(2465);
        assert_eq!(catalog.ids(), &[1, 2]);
        let catalog = IdCatalog::new(vec![1, 2465]).without_size_artifact(2465);
        assert_eq!(catalog.ids(), &[1, 2465]);
    }

    #[test]
    fn test_catalog_position_lookup() {
        let catalog = IdCatalog::new(vec![7003800, 7003900]);
        assert_eq!(catalog.get(1), Some(7003900));
        assert_eq!(catalog.position_of(7003800), Some(0));
        assert_eq!(catalog.position_of(1), None);
    }

    #[test]
    fn test_catalog_raw_scan_fallback() {
        // Header carries trailing text, so the structured pattern does not match.
        let raw = "-----\nid[3] (truncated)\n7003800, NaN, 7004000\n";
        let catalog = parser().catalog(raw).unwrap();
        assert_eq!(catalog.ids(), &[3, 7003800, 7004000]);
    }

    #[test]
    fn test_catalog_raw_scan_drops_echoed_size() {
        let raw = "-----\nid[2465] values:\n7003800, 7003900\n";
        let catalog = parser().catalog(raw).unwrap();
        assert_eq!(catalog.ids(), &[7003800, 7003900]);
    }

    #[test]
    fn test_catalog_missing_variable() {
        let err = parser().catalog("-----\ntime[1]\n2010\n").unwrap_err();
        assert!(matches!(err, ParseError::ExtractionFailure { ref variable, .. } if variable == "id"));
    }

    #[test]
    fn test_series_pads_short_columns() {
        let raw = "-----\ntime[3]\n2001, 2002, 2003\nmean_high_water[2]\n1.1, 1.2\nmean_low_water[3]\n-0.9, -9999, NaN\n";
        let series = parser().water_levels(raw).unwrap();
        assert_eq!(series.records.len(), 3);
        assert_eq!(series.records[2].values, vec![Value::Missing, Value::Missing]);
        assert_eq!(
            series.column("mean_low_water").unwrap(),
            vec![Value::Number(-0.9), Value::Missing, Value::Missing]
        );
    }

    #[test]
    fn test_catalog_raw_scan_skips_longer_names() {
        let raw = "-----\ngrid[2] (x)\n1, 2\ntransect_id[1] (x)\n9\nid[3] (truncated)\n7003800, 7003900, 7004000\n";
        let catalog = parser().catalog(raw).unwrap();
        assert_eq!(catalog.ids(), &[3, 7003800, 7003900, 7004000]);
    }

    #[test]
    fn test_raw_scan_start_accepts_namespaced_name() {
        let body = "rsp_id[1] x\n5\ncatalog.id[2] x\n7, 8\n";
        let at = raw_scan_start(body, "id").unwrap();
        assert!(body[at..].starts_with("[2] x"));
        assert_eq!(raw_scan_start("grid[2]\n", "id"), None);
    }
}
