//! Dataset parsers against recorded and generated responses.

use coastal_common::Value;
use opendap_parser::{DatasetParser, ParseError, ParserConfig};
use test_utils::fixtures::{areas, catalog, profile, reference_points, series};
use test_utils::{assert_approx_eq, create_profile_grid, profile_document};

fn parser() -> DatasetParser {
    DatasetParser::new(ParserConfig::default())
}

fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().map(|v| Value::Number(*v)).collect()
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn test_annotated_profile_with_sentinel() {
    let result = parser().profile(profile::ANNOTATED_WITH_SENTINEL).unwrap();

    assert_eq!(result.cross_shore, numbers(&[10.0, 20.0, 30.0]));
    assert_eq!(result.years, vec!["2010", "2011"]);
    assert_eq!(result.altitude.row(0).unwrap(), numbers(&[1.5, 2.5, 3.5]).as_slice());
    assert_eq!(
        result.altitude.row(1).unwrap(),
        &[Value::Missing, Value::Number(5.5), Value::Number(6.5)]
    );

    let json = serde_json::to_value(&result.altitude).unwrap();
    assert_eq!(json, serde_json::json!([[1.5, 2.5, 3.5], [null, 5.5, 6.5]]));
}

#[test]
fn test_profile_matrix_dimensions_follow_axes() {
    for (rows, cols) in [(1, 1), (2, 5), (7, 3), (12, 40)] {
        let time: Vec<f64> = (0..rows).map(|r| 1965.0 + r as f64).collect();
        let cross_shore: Vec<f64> = (0..cols).map(|c| c as f64 * 5.0 - 100.0).collect();
        let raw = profile_document(&cross_shore, &time, &create_profile_grid(rows, cols));

        let result = parser().profile(&raw).unwrap();
        assert_eq!(result.altitude.n_rows(), result.years.len());
        assert_eq!(result.years.len(), rows);
        for row in result.altitude.rows() {
            assert_eq!(row.len(), result.cross_shore.len());
        }
        assert_eq!(result.altitude.get(rows - 1, cols - 1), Some(Value::Number(((rows - 1) * 100 + cols - 1) as f64)));
    }
}

#[test]
fn test_grid_response_with_wrapped_rows() {
    let result = parser().profile(profile::GRID_WRAPPED).unwrap();

    assert_eq!(result.years, vec!["2005", "2006", "2007"]);
    assert_eq!(result.cross_shore, numbers(&[-100.0, -50.0, 0.0, 50.0]));
    assert_eq!(result.altitude.n_rows(), 3);
    assert_eq!(result.altitude.get(0, 2), Some(Value::Number(2.0)));
    assert_eq!(result.altitude.get(0, 3), Some(Value::Missing));
    assert_eq!(result.altitude.get(2, 1), Some(Value::Missing));
    assert_eq!(result.altitude.missing_count(), 2);
}

#[test]
fn test_transposed_payload() {
    let result = parser().profile(profile::TRANSPOSED).unwrap();
    assert_eq!(result.altitude.row(0).unwrap(), numbers(&[1.0, 2.0, 3.0]).as_slice());
    assert_eq!(result.altitude.row(1).unwrap(), numbers(&[4.0, 5.0, 6.0]).as_slice());
}

#[test]
fn test_preamble_units_override_year_range() {
    // 2000 and 2001 look like years but the response says they are day offsets.
    let result = parser().profile(profile::WITH_UNITS).unwrap();
    assert_eq!(result.years, vec!["1975", "1975"]);
}

#[test]
fn test_configured_units_apply_without_preamble() {
    let config = ParserConfig {
        time_units: Some("days since 1970-01-01".to_string()),
        ..Default::default()
    };
    let result = DatasetParser::new(config).profile(profile::TRANSPOSED).unwrap();
    assert_eq!(result.years, vec!["1975", "1975"]);
}

#[test]
fn test_empty_time_axis_fails() {
    let err = parser().profile(profile::EMPTY_TIME).unwrap_err();
    assert!(matches!(err, ParseError::EmptyAxis { ref variable, .. } if variable == "time"));
}

#[test]
fn test_short_altitude_reports_sizes() {
    match parser().profile(profile::SHORT_ALTITUDE).unwrap_err() {
        ParseError::ShapeMismatch {
            variable,
            observed,
            expected,
            excerpt,
            ..
        } => {
            assert_eq!(variable, "altitude");
            assert_eq!(observed, 5);
            assert_eq!(expected, 6);
            assert!(excerpt.contains("4.5, 5.5"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_missing_altitude_header() {
    let raw = "-----\ncross_shore[1]\n0\ntime[1]\n2010\n";
    let err = parser().profile(raw).unwrap_err();
    assert!(matches!(err, ParseError::ExtractionFailure { ref variable, .. } if variable == "altitude"));
}

#[test]
fn test_carriage_returns_are_normalised() {
    let crlf = profile::ANNOTATED_WITH_SENTINEL.replace('\n', "\r\n");
    assert_eq!(
        parser().profile(&crlf).unwrap(),
        parser().profile(profile::ANNOTATED_WITH_SENTINEL).unwrap()
    );
}

#[test]
fn test_parsing_is_idempotent() {
    let p = parser();
    assert_eq!(p.profile(profile::GRID_WRAPPED).unwrap(), p.profile(profile::GRID_WRAPPED).unwrap());
    assert_eq!(p.catalog(catalog::PREAMBLE_DECLARES_SIZE).unwrap(), p.catalog(catalog::PREAMBLE_DECLARES_SIZE).unwrap());
    assert_eq!(
        p.water_levels(series::WATER_LEVELS).unwrap(),
        p.water_levels(series::WATER_LEVELS).unwrap()
    );
}

#[test]
fn test_export_round_trip() {
    for raw in [profile::ANNOTATED_WITH_SENTINEL, profile::GRID_WRAPPED, profile::TRANSPOSED] {
        let result = parser().profile(raw).unwrap();
        let table = result.to_table();
        assert_eq!(table.rows.len(), result.years.len() + 1);
        assert_eq!(table.to_profile().unwrap(), result);
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn test_preamble_never_contributes() {
    let ids = parser().catalog(catalog::PREAMBLE_DECLARES_SIZE).unwrap();
    assert_eq!(ids.ids(), &[2000100, 2000120, 2000140, 2000160]);
    assert_eq!(ids.position_of(2465), None);
}

#[test]
fn test_catalog_drops_size_artifact() {
    let ids = parser().catalog(catalog::SIZE_ARTIFACT).unwrap();
    assert_eq!(ids.ids(), &[7003800, 7003900, 7004000]);
}

#[test]
fn test_catalog_raw_scan_filters_missing() {
    let ids = parser().catalog(catalog::LOOSE_HEADER).unwrap();
    assert_eq!(ids.ids(), &[3, 7003800, 7004000]);
}

#[test]
fn test_generated_catalog() {
    let raw = test_utils::catalog_document(7000000, 25);
    let ids = parser().catalog(&raw).unwrap();
    assert_eq!(ids.len(), 25);
    assert_eq!(ids.get(24), Some(7000480));
}

// ============================================================================
// Areas and reference points
// ============================================================================

#[test]
fn test_areas_pair_codes_with_trimmed_names() {
    let areas = parser().areas(areas::THREE_AREAS).unwrap();
    assert_eq!(areas.len(), 3);
    assert_eq!(areas[0].code, Some(2));
    assert_eq!(areas[0].name, "Noord-Holland");
    assert_eq!(areas[1].name, "Zuid-Holland");
    assert_eq!(areas[2].code, Some(7));
}

#[test]
fn test_areas_length_mismatch() {
    let err = parser().areas(areas::MISMATCHED).unwrap_err();
    assert!(matches!(err, ParseError::ArrayLengthMismatch { ref dataset, .. } if dataset == "areas"));
}

#[test]
fn test_reference_points() {
    let points = parser().reference_points(reference_points::TWO_POINTS).unwrap();
    assert_eq!(points.len(), 2);
    assert_approx_eq!(points[0].lat.as_f64().unwrap(), 52.6201, 1e-9);
    assert_approx_eq!(points[0].x.as_f64().unwrap(), 103453.5, 1e-9);
    assert_eq!(points[1].y, Value::Missing);
    assert_eq!(points[1].lon, Value::Missing);
}

#[test]
fn test_reference_points_length_mismatch() {
    match parser().reference_points(reference_points::MISMATCHED).unwrap_err() {
        ParseError::ArrayLengthMismatch { dataset, lengths } => {
            assert_eq!(dataset, "reference_points");
            assert!(lengths.contains(&("rsp_lat".to_string(), 1)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

// ============================================================================
// Series
// ============================================================================

#[test]
fn test_water_levels_unify_missing_markers() {
    let levels = parser().water_levels(series::WATER_LEVELS).unwrap();
    assert_eq!(levels.variables, vec!["mean_high_water", "mean_low_water"]);

    let labels: Vec<&str> = levels.records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["2000", "2001", "2002"]);

    // Sentinel in one column, NaN in the other: same marker.
    assert_eq!(levels.records[1].values[0], Value::Missing);
    assert_eq!(levels.records[2].values[1], Value::Missing);
    assert_eq!(levels.records[0].values, numbers(&[1.02, -0.81]));
}

#[test]
fn test_coastline_series() {
    let coastline = parser().coastline(series::COASTLINE).unwrap();
    assert_eq!(coastline.records.len(), 4);
    assert_eq!(coastline.records[0].label, "1965");
    assert_eq!(
        coastline.column("momentary_coastline").unwrap(),
        vec![
            Value::Number(112.5),
            Value::Number(115.0),
            Value::Missing,
            Value::Number(109.75)
        ]
    );
}

#[test]
fn test_one_dataset_failing_leaves_others_intact() {
    let p = parser();
    assert!(p.profile(series::COASTLINE).is_err());
    assert!(p.coastline(series::COASTLINE).is_ok());
}
