// src/display/table.rs
use crate::display::locale::Locale;
use crate::processing::dataset::{TypedDataset, Value};
use std::fmt::Write;

const COLUMN_GAP: &str = "  ";

fn cell_text(value: Value<'_>, locale: Locale) -> String {
    let strings = locale.strings();
    match value {
        Value::Bool(true) => strings.yes.to_string(),
        Value::Bool(false) => strings.no.to_string(),
        other => other.to_string(),
    }
}

/// Renders the dataset as an aligned plain-text grid with localized headers.
/// Numeric columns are right-aligned.
pub fn render_table(dataset: &TypedDataset, locale: Locale) -> String {
    if dataset.is_empty() {
        return format!("{}\n", locale.strings().no_data);
    }

    let columns = dataset.columns();
    let headers: Vec<&str> = columns.iter().map(|c| locale.column_label(c.name())).collect();
    let rows: Vec<Vec<String>> = (0..dataset.row_count())
        .map(|r| dataset.row(r).into_iter().map(|v| cell_text(v, locale)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", join_padded(headers.iter().copied(), &widths, |_| false));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join(COLUMN_GAP));
    for row in &rows {
        let line = join_padded(row.iter().map(String::as_str), &widths, |i| columns[i].kind().is_numeric());
        let _ = writeln!(out, "{}", line);
    }
    out
}

fn join_padded<'a, I, F>(cells: I, widths: &[usize], right_align: F) -> String
where
    I: Iterator<Item = &'a str>,
    F: Fn(usize) -> bool,
{
    let padded: Vec<String> = cells
        .enumerate()
        .map(|(i, cell)| {
            let width = widths.get(i).copied().unwrap_or(0);
            if right_align(i) {
                format!("{:>width$}", cell, width = width)
            } else {
                format!("{:<width$}", cell, width = width)
            }
        })
        .collect();
    padded.join(COLUMN_GAP).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::table::RawTable;
    use crate::processing::dataset::assemble;

    #[test]
    fn test_render_localized_grid() {
        let raw = RawTable::from_rows(vec![
            vec!["eScooter".into(), "Gewicht (kg)".into(), "Bremslicht".into()],
            vec!["Alpha".into(), "15,5".into(), "ja".into()],
            vec!["Beta Long".into(), "".into(), "".into()],
        ]);
        let dataset = assemble(&raw);
        let text = render_table(&dataset, Locale::En);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Model"));
        assert!(lines[0].contains("Weight (kg)"));
        assert!(lines[2].contains("15.5"));
        assert!(lines[2].ends_with("Yes"));
        assert!(lines[3].ends_with("No"));
    }

    #[test]
    fn test_render_empty_dataset() {
        let text = render_table(&TypedDataset::default(), Locale::De);
        assert_eq!(text.trim(), Locale::De.strings().no_data);
    }
}
