//! Numeric token extraction from payload text.

use std::borrow::Cow;

use coastal_common::{NumericSeries, Value};
use once_cell::sync::Lazy;
use regex::Regex;

/// A `NaN` literal (any case) or a decimal number with optional exponent.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bnan\b|[-+]?(?:\d+\.\d*|\.\d+|\d+)(?:e[-+]?\d+)?")
        .expect("token pattern is valid")
});

/// Leading row index annotations such as `[3][0], ` (one to four groups).
static INDEX_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:\[\s*\d+\s*\]){1,4}[ \t]*,").expect("annotation pattern is valid")
});

/// Extract values in reading order.
///
/// `NaN` tokens become [`Value::Missing`]; separators and any other text are skipped.
pub fn tokenize(block: &str) -> NumericSeries {
    TOKEN
        .find_iter(block)
        .filter_map(|m| {
            let token = m.as_str();
            if token.eq_ignore_ascii_case("nan") {
                Some(Value::Missing)
            } else {
                token.parse::<f64>().ok().map(Value::from_f64)
            }
        })
        .collect()
}

/// Remove per-row index annotations so they do not enter the value stream.
pub fn strip_index_annotations(block: &str) -> Cow<'_, str> {
    INDEX_ANNOTATION.replace_all(block, "")
}

/// Strip annotations, then tokenize. Used for every multi-dimensional payload.
pub fn tokenize_annotated(block: &str) -> NumericSeries {
    tokenize(&strip_index_annotations(block))
}
