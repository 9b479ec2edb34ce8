use std::fmt::Write;

use crate::exec::value::QueryResult;

/// Render a result as an aligned plain-text table.
///
/// Values are left-aligned and padded to the widest cell in their column.
pub fn format_table(result: &QueryResult) -> String {
    if result.columns().is_empty() {
        return "(no columns)".to_string();
    }

    let cells: Vec<Vec<String>> = result
        .rows()
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = result
        .columns()
        .iter()
        .map(|c| c.chars().count())
        .collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, result.columns(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    write!(out, "({} row{})", cells.len(), if cells.len() == 1 { "" } else { "s" }).unwrap();
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}
