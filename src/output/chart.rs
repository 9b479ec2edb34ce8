//! Plot detection and terminal charts for query results.
//!
//! A column is numeric when the result has rows, the column has at least one
//! non-null value, and every non-null value is an integer or a real. One
//! numeric column allows a bar chart of that column by row index; two allow a
//! scatter plot of the second against the first.

use std::fmt::Write;

use serde::Serialize;

use crate::exec::value::{QueryResult, Value};

/// A chart the result can be drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlotKind {
    /// First numeric column by row index.
    #[serde(rename = "Bar Chart")]
    Bar,
    /// Second numeric column against the first.
    #[serde(rename = "Scatter Plot")]
    Scatter,
}

impl std::fmt::Display for PlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PlotKind::Bar => "Bar Chart",
            PlotKind::Scatter => "Scatter Plot",
        })
    }
}

/// Indices of numeric columns, in column order.
pub fn numeric_columns(result: &QueryResult) -> Vec<usize> {
    if result.is_empty() {
        return Vec::new();
    }
    (0..result.columns().len())
        .filter(|&idx| {
            let mut any = false;
            for row in result.rows() {
                match &row[idx] {
                    Value::Null => {}
                    Value::Integer(_) | Value::Real(_) => any = true,
                    _ => return false,
                }
            }
            any
        })
        .collect()
}

/// Charts available for `result`.
pub fn plot_kinds(result: &QueryResult) -> Vec<PlotKind> {
    match numeric_columns(result).len() {
        0 => Vec::new(),
        1 => vec![PlotKind::Bar],
        _ => vec![PlotKind::Bar, PlotKind::Scatter],
    }
}

/// Draw `kind` for `result`, or `None` when the result cannot support it.
pub fn render(result: &QueryResult, kind: PlotKind, width: usize, height: usize) -> Option<String> {
    match kind {
        PlotKind::Bar => render_bar(result, width),
        PlotKind::Scatter => render_scatter(result, width, height),
    }
}

/// Horizontal bar chart of the first numeric column, one bar per row.
pub fn render_bar(result: &QueryResult, width: usize) -> Option<String> {
    let column = *numeric_columns(result).first()?;
    let name = &result.columns()[column];
    let values: Vec<Option<f64>> = result.rows().iter().map(|r| r[column].as_f64()).collect();

    let peak = values
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let label_width = (values.len().saturating_sub(1)).to_string().len();

    let mut out = format!("{name} by Index\n");
    for (idx, value) in values.iter().enumerate() {
        match value {
            Some(v) => {
                let len = if peak > 0.0 {
                    ((v.abs() / peak) * width as f64).round() as usize
                } else {
                    0
                };
                let glyph = if *v < 0.0 { "-" } else { "#" };
                writeln!(out, "{idx:>label_width$} | {} {v}", glyph.repeat(len)).unwrap();
            }
            None => {
                writeln!(out, "{idx:>label_width$} | NULL").unwrap();
            }
        }
    }
    Some(out.trim_end().to_string())
}

/// Character-grid scatter plot of the second numeric column against the first.
pub fn render_scatter(result: &QueryResult, width: usize, height: usize) -> Option<String> {
    let numeric = numeric_columns(result);
    let (&x_col, &y_col) = (numeric.first()?, numeric.get(1)?);
    let points: Vec<(f64, f64)> = result
        .rows()
        .iter()
        .filter_map(|r| Some((r[x_col].as_f64()?, r[y_col].as_f64()?)))
        .collect();
    if points.is_empty() || width == 0 || height == 0 {
        return None;
    }

    let (x_min, x_max) = bounds(points.iter().map(|p| p.0));
    let (y_min, y_max) = bounds(points.iter().map(|p| p.1));

    let mut grid = vec![vec![' '; width]; height];
    for (x, y) in &points {
        let col = scale(*x, x_min, x_max, width);
        let row = height - 1 - scale(*y, y_min, y_max, height);
        grid[row][col] = '*';
    }

    let x_name = &result.columns()[x_col];
    let y_name = &result.columns()[y_col];
    let mut out = format!("{y_name} vs {x_name}\n");
    writeln!(out, "{y_max}").unwrap();
    for line in grid {
        let line: String = line.into_iter().collect();
        writeln!(out, "|{}", line.trim_end()).unwrap();
    }
    writeln!(out, "+{}", "-".repeat(width)).unwrap();
    write!(out, "{y_min} .. x: {x_min} .. {x_max}").unwrap();
    Some(out)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn scale(value: f64, min: f64, max: f64, cells: usize) -> usize {
    if max <= min {
        return 0;
    }
    let ratio = (value - min) / (max - min);
    ((ratio * (cells - 1) as f64).round() as usize).min(cells - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryResult {
        QueryResult::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn numeric_detection_tolerates_nulls_but_not_text() {
        let r = result(
            &["id", "name", "score", "empty"],
            vec![
                vec![Value::Integer(1), Value::Text("a".into()), Value::Null, Value::Null],
                vec![Value::Integer(2), Value::Text("b".into()), Value::Real(1.5), Value::Null],
            ],
        );
        assert_eq!(numeric_columns(&r), vec![0, 2]);
        assert_eq!(plot_kinds(&r), vec![PlotKind::Bar, PlotKind::Scatter]);
    }

    #[test]
    fn empty_results_have_no_plots() {
        let r = result(&["id"], Vec::new());
        assert!(plot_kinds(&r).is_empty());
        assert!(render_bar(&r, 10).is_none());
    }

    #[test]
    fn single_numeric_column_is_bar_only() {
        let r = result(
            &["label", "total"],
            vec![
                vec![Value::Text("a".into()), Value::Integer(10)],
                vec![Value::Text("b".into()), Value::Integer(5)],
                vec![Value::Text("c".into()), Value::Null],
            ],
        );
        assert_eq!(plot_kinds(&r), vec![PlotKind::Bar]);
        assert!(render_scatter(&r, 10, 5).is_none());
        insta::assert_snapshot!(render_bar(&r, 10).unwrap(), @r"
        total by Index
        0 | ########## 10
        1 | ##### 5
        2 | NULL
        ");
    }

    #[test]
    fn scatter_places_extremes_in_corners() {
        let r = result(
            &["x", "y"],
            vec![
                vec![Value::Integer(0), Value::Integer(0)],
                vec![Value::Integer(10), Value::Integer(100)],
            ],
        );
        let plot = render_scatter(&r, 5, 3).unwrap();
        let lines: Vec<&str> = plot.lines().collect();
        assert_eq!(lines[0], "y vs x");
        assert_eq!(lines[2], "|    *");
        assert_eq!(lines[4], "|*");
    }

    #[test]
    fn plot_kinds_serialize_with_display_names() {
        assert_eq!(
            serde_json::to_string(&[PlotKind::Bar, PlotKind::Scatter]).unwrap(),
            r#"["Bar Chart","Scatter Plot"]"#
        );
    }
}
