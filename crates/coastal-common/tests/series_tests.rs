//! Tests for the shared value and matrix types.

use coastal_common::series::{unify_sentinel, Matrix2D, Value};

// ============================================================================
// Value tests
// ============================================================================

#[test]
fn test_value_from_non_finite_is_missing() {
    assert_eq!(Value::from_f64(f64::NAN), Value::Missing);
    assert_eq!(Value::from_f64(f64::INFINITY), Value::Missing);
    assert_eq!(Value::from_f64(1.5), Value::Number(1.5));
}

#[test]
fn test_value_sentinel_unification() {
    assert_eq!(Value::Number(-9999.0).unify_sentinel(-9999.0), Value::Missing);
    assert_eq!(Value::Number(-9998.0).unify_sentinel(-9999.0), Value::Number(-9998.0));
    assert_eq!(Value::Missing.unify_sentinel(-9999.0), Value::Missing);
}

#[test]
fn test_unify_sentinel_series() {
    let mut series = vec![Value::Number(1.0), Value::Number(-9999.0), Value::Missing];
    unify_sentinel(&mut series, -9999.0);
    assert_eq!(series, vec![Value::Number(1.0), Value::Missing, Value::Missing]);
}

#[test]
fn test_value_serializes_as_number_or_null() {
    let series = vec![Value::Number(2.5), Value::Missing];
    let json = serde_json::to_string(&series).unwrap();
    assert_eq!(json, "[2.5,null]");

    let back: Vec<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, series);
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Number(3.0).to_string(), "3");
    assert_eq!(Value::Missing.to_string(), "NaN");
}

// ============================================================================
// Matrix2D tests
// ============================================================================

#[test]
fn test_matrix_rejects_ragged_rows() {
    let err = Matrix2D::new(
        vec![vec![Value::Number(1.0), Value::Number(2.0)], vec![Value::Number(3.0)]],
        2,
    )
    .unwrap_err();
    assert_eq!(err.row, 1);
    assert_eq!(err.expected, 2);
    assert_eq!(err.found, 1);
}

#[test]
fn test_matrix_accessors() {
    let m = Matrix2D::from_rows(vec![
        vec![Value::Number(1.0), Value::Number(2.0)],
        vec![Value::Missing, Value::Number(4.0)],
    ])
    .unwrap();
    assert_eq!(m.n_rows(), 2);
    assert_eq!(m.n_cols(), 2);
    assert_eq!(m.get(1, 0), Some(Value::Missing));
    assert_eq!(m.get(2, 0), None);
    assert_eq!(m.missing_count(), 1);
}

#[test]
fn test_matrix_json_rejects_ragged_input() {
    let result: Result<Matrix2D, _> = serde_json::from_str("[[1.0, 2.0], [3.0]]");
    assert!(result.is_err());

    let m: Matrix2D = serde_json::from_str("[[1.0, null], [3.0, 4.0]]").unwrap();
    assert_eq!(m.get(0, 1), Some(Value::Missing));
}
