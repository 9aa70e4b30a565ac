// src/processing/filter.rs
//! Row filters and sorting over a [`TypedDataset`].
//!
//! Every operation returns a new dataset. An unknown column or a column of the wrong
//! kind leaves the dataset unchanged and logs a warning.
use crate::processing::dataset::{Column, TypedDataset, Value};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl CompareOp {
    pub const ALL: [CompareOp; 5] = [CompareOp::Lt, CompareOp::Le, CompareOp::Gt, CompareOp::Ge, CompareOp::Eq];

    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Eq => lhs == rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompareOp::ALL
            .into_iter()
            .find(|op| op.symbol() == s.trim())
            .ok_or_else(|| format!("invalid operator '{}'", s))
    }
}

fn numeric_column<'a>(dataset: &'a TypedDataset, column: &str) -> Option<&'a Column> {
    match dataset.column(column) {
        Some(c) if c.kind().is_numeric() => Some(c),
        Some(_) => {
            tracing::warn!("Column '{}' is not a numeric column", column);
            None
        }
        None => {
            tracing::warn!("Column '{}' not found", column);
            None
        }
    }
}

fn keep_rows<F>(dataset: &TypedDataset, column: &Column, mut keep: F) -> TypedDataset
where
    F: FnMut(Value<'_>) -> bool,
{
    let rows: Vec<usize> = (0..dataset.row_count())
        .filter(|&i| column.values.get(i).map_or(false, &mut keep))
        .collect();
    tracing::debug!("Filter on '{}' kept {} of {} rows", column.name(), rows.len(), dataset.row_count());
    dataset.select_rows(&rows)
}

/// Keeps rows where `column <op> value`. Missing values never match.
pub fn filter_numeric(dataset: &TypedDataset, column: &str, op: CompareOp, value: f64) -> TypedDataset {
    match numeric_column(dataset, column) {
        Some(c) => keep_rows(dataset, c, |v| v.as_f64().map_or(false, |x| op.apply(x, value))),
        None => dataset.clone(),
    }
}

/// Keeps rows where `min <= column <= max`.
pub fn filter_range(dataset: &TypedDataset, column: &str, min: f64, max: f64) -> TypedDataset {
    match numeric_column(dataset, column) {
        Some(c) => keep_rows(dataset, c, |v| v.as_f64().map_or(false, |x| x >= min && x <= max)),
        None => dataset.clone(),
    }
}

/// Keeps rows whose canonical value is one of `allowed`.
pub fn filter_in(dataset: &TypedDataset, column: &str, allowed: &[String]) -> TypedDataset {
    match dataset.column(column) {
        Some(c) => keep_rows(dataset, c, |v| !v.is_missing() && allowed.contains(&v.to_string())),
        None => {
            tracing::warn!("Column '{}' not found", column);
            dataset.clone()
        }
    }
}

/// Sorted distinct canonical values of a column, missing values excluded.
pub fn distinct_values(dataset: &TypedDataset, column: &str) -> Vec<String> {
    let Some(c) = dataset.column(column) else {
        return Vec::new();
    };
    let mut values: Vec<Value<'_>> = (0..dataset.row_count())
        .filter_map(|i| c.values.get(i))
        .filter(|v| !v.is_missing())
        .collect();
    values.sort_by(compare_values);
    let mut seen = BTreeSet::new();
    values
        .into_iter()
        .map(|v| v.to_string())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
    }
}

/// Stable sort on one column; missing values go last in both directions.
pub fn sort_by(dataset: &TypedDataset, column: &str, ascending: bool) -> TypedDataset {
    let Some(c) = dataset.column(column) else {
        tracing::warn!("Column '{}' not found", column);
        return dataset.clone();
    };

    let mut rows: Vec<usize> = (0..dataset.row_count()).collect();
    rows.sort_by(|&i, &j| {
        let (a, b) = (c.values.get(i), c.values.get(j));
        match (a, b) {
            (Some(a), Some(b)) => match (a.is_missing(), b.is_missing()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) if ascending => compare_values(&a, &b),
                (false, false) => compare_values(&b, &a),
            },
            _ => Ordering::Equal,
        }
    });
    dataset.select_rows(&rows)
}

/// Mean of a numeric column ignoring missing values; `None` when nothing is present.
pub fn mean(dataset: &TypedDataset, column: &str) -> Option<f64> {
    let c = dataset.column(column).filter(|c| c.kind().is_numeric())?;
    let present: Vec<f64> = (0..dataset.row_count())
        .filter_map(|i| c.values.get(i).and_then(|v| v.as_f64()))
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Smallest and largest present value of a numeric column.
pub fn bounds(dataset: &TypedDataset, column: &str) -> Option<(f64, f64)> {
    let c = dataset.column(column).filter(|c| c.kind().is_numeric())?;
    (0..dataset.row_count())
        .filter_map(|i| c.values.get(i).and_then(|v| v.as_f64()))
        .fold(None, |acc, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::table::RawTable;
    use crate::processing::dataset::assemble;

    fn sample() -> TypedDataset {
        let rows = [
            ["eScooter", "Gewicht (kg)", "Blinker", "Bremslicht", "Federung"],
            ["Alpha", "15,5", "2", "ja", "vorne"],
            ["Beta", "", "0", "nein", "keine"],
            ["Gamma", "12", "4", "✓", "vorne"],
            ["Delta", "20", "2", "", "hinten"],
        ];
        assemble(&RawTable::from_rows(
            rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
        ))
    }

    fn models(dataset: &TypedDataset) -> Vec<String> {
        (0..dataset.row_count())
            .map(|i| dataset.value("model", i).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_filter_numeric_skips_missing() {
        let ds = filter_numeric(&sample(), "gewicht_kg", CompareOp::Le, 16.0);
        assert_eq!(models(&ds), vec!["Alpha", "Gamma"]);
        let ds = filter_numeric(&sample(), "blinker", CompareOp::Eq, 2.0);
        assert_eq!(models(&ds), vec!["Alpha", "Delta"]);
    }

    #[test]
    fn test_filter_on_text_column_is_ignored() {
        let original = sample();
        assert_eq!(filter_numeric(&original, "federung", CompareOp::Lt, 1.0), original);
        assert_eq!(filter_range(&original, "nope", 0.0, 1.0), original);
    }

    #[test]
    fn test_filter_range_inclusive() {
        let ds = filter_range(&sample(), "gewicht_kg", 12.0, 15.5);
        assert_eq!(models(&ds), vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn test_filter_in() {
        let ds = filter_in(&sample(), "federung", &["vorne".to_string()]);
        assert_eq!(models(&ds), vec!["Alpha", "Gamma"]);
        let ds = filter_in(&sample(), "bremslicht", &["false".to_string()]);
        assert_eq!(models(&ds), vec!["Beta", "Delta"]);
    }

    #[test]
    fn test_sort_puts_missing_last() {
        let asc = sort_by(&sample(), "gewicht_kg", true);
        assert_eq!(models(&asc), vec!["Gamma", "Alpha", "Delta", "Beta"]);
        let desc = sort_by(&sample(), "gewicht_kg", false);
        assert_eq!(models(&desc), vec!["Delta", "Alpha", "Gamma", "Beta"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let ds = sort_by(&sample(), "blinker", true);
        assert_eq!(models(&ds), vec!["Beta", "Alpha", "Delta", "Gamma"]);
    }

    #[test]
    fn test_distinct_values() {
        assert_eq!(distinct_values(&sample(), "federung"), vec!["hinten", "keine", "vorne"]);
        assert_eq!(distinct_values(&sample(), "blinker"), vec!["0", "2", "4"]);
        assert_eq!(distinct_values(&sample(), "bremslicht"), vec!["false", "true"]);
    }

    #[test]
    fn test_mean_and_bounds() {
        let ds = sample();
        let avg = mean(&ds, "gewicht_kg").unwrap();
        assert!((avg - 47.5 / 3.0).abs() < 1e-9);
        assert_eq!(bounds(&ds, "gewicht_kg"), Some((12.0, 20.0)));
        assert_eq!(mean(&ds, "federung"), None);
    }

    #[test]
    fn test_compare_op_parsing() {
        assert_eq!("<=".parse::<CompareOp>(), Ok(CompareOp::Le));
        assert_eq!(" > ".parse::<CompareOp>(), Ok(CompareOp::Gt));
        assert!("=>".parse::<CompareOp>().is_err());
    }
}
