//! Generators for synthetic ASCII payloads and value streams.
//!
//! Values are written the way the server writes them: comma separated,
//! `NaN` for non-finite readings, integers without a decimal point.

use crate::fixtures::DELIMITER;

/// Formats one reading as the server renders it.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Renders a one-dimensional block: `name[n]` followed by the values,
/// wrapped every `per_line` values.
///
/// # Example
///
/// ```
/// use test_utils::ascii_vector;
///
/// let block = ascii_vector("time", &[2010.0, 2011.0, 2012.0], 2);
/// assert_eq!(block, "time[3]\n2010, 2011,\n2012\n");
/// ```
pub fn ascii_vector(name: &str, values: &[f64], per_line: usize) -> String {
    let per_line = per_line.max(1);
    let lines: Vec<String> = values
        .chunks(per_line)
        .map(|chunk| chunk.iter().map(|v| format_value(*v)).collect::<Vec<_>>().join(", "))
        .collect();
    format!("{}[{}]\n{}\n", name, values.len(), lines.join(",\n"))
}

/// Renders a `rows x 1 x cols` block with `[r][0], ` index annotations,
/// the layout the server uses for altitude grids.
pub fn ascii_annotated_grid(name: &str, rows: &[Vec<f64>]) -> String {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut out = format!("{}[{}][1][{}]\n", name, rows.len(), cols);
    for (r, row) in rows.iter().enumerate() {
        let values = row.iter().map(|v| format_value(*v)).collect::<Vec<_>>().join(", ");
        out.push_str(&format!("[{}][0], {}\n", r, values));
    }
    out
}

/// Assembles a full response: optional preamble, delimiter, then blocks.
pub fn ascii_document(preamble: Option<&str>, blocks: &[String]) -> String {
    let mut out = String::new();
    if let Some(preamble) = preamble {
        out.push_str(preamble.trim_end());
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    for block in blocks {
        out.push_str(block);
        out.push('\n');
    }
    out
}

/// Builds a complete profile response from axes and an altitude grid.
pub fn profile_document(cross_shore: &[f64], time: &[f64], altitude: &[Vec<f64>]) -> String {
    ascii_document(
        Some("Dataset {\n} transect;"),
        &[
            ascii_vector("cross_shore", cross_shore, 8),
            ascii_vector("time", time, 8),
            ascii_annotated_grid("altitude", altitude),
        ],
    )
}

/// Creates a predictable `rows x cols` grid where `grid[r][c] == r * 100 + c`.
///
/// # Example
///
/// ```
/// use test_utils::create_profile_grid;
///
/// let grid = create_profile_grid(2, 3);
/// assert_eq!(grid[1][2], 102.0);
/// ```
pub fn create_profile_grid(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|r| (0..cols).map(|c| (r * 100 + c) as f64).collect())
        .collect()
}

/// Flattens a grid column by column, i.e. `flat[c * rows + r] == grid[r][c]`.
///
/// This is the stream a server emitting `[cols][rows]` order produces.
pub fn transpose_flatten(grid: &[Vec<f64>]) -> Vec<f64> {
    let rows = grid.len();
    let cols = grid.first().map(|r| r.len()).unwrap_or(0);
    let mut flat = vec![0.0; rows * cols];
    for (r, row) in grid.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            flat[c * rows + r] = *value;
        }
    }
    flat
}

/// Builds a catalog response holding `count` sequential identifiers starting at `first`.
pub fn catalog_document(first: i64, count: usize) -> String {
    let ids: Vec<f64> = (0..count as i64).map(|i| (first + i * 20) as f64).collect();
    ascii_document(None, &[ascii_vector("id", &ids, 10)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(10.0), "10");
        assert_eq!(format_value(-9999.0), "-9999");
        assert_eq!(format_value(1.5), "1.5");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[test]
    fn test_annotated_grid_layout() {
        let block = ascii_annotated_grid("altitude", &[vec![1.5, 2.5], vec![3.5, f64::NAN]]);
        assert_eq!(block, "altitude[2][1][2]\n[0][0], 1.5, 2.5\n[1][0], 3.5, NaN\n");
    }

    #[test]
    fn test_transpose_flatten() {
        let grid = create_profile_grid(2, 3);
        let flat = transpose_flatten(&grid);
        assert_eq!(flat, vec![0.0, 100.0, 1.0, 101.0, 2.0, 102.0]);
    }

    #[test]
    fn test_document_has_delimiter_after_preamble() {
        let doc = ascii_document(Some("Dataset {\n}"), &[ascii_vector("id", &[1.0], 4)]);
        assert_eq!(doc, format!("Dataset {{\n}}\n{}\nid[1]\n1\n\n", DELIMITER));
    }
}
