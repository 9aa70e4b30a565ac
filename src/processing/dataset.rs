// src/processing/dataset.rs
use crate::extractors::table::RawTable;
use crate::processing::column::{ColumnSpec, Kind, KindInferencer};
use crate::processing::value::{parse_cell, ParsedValue};
use std::fmt;

/// Normalized name of the promotional coupon column, dropped after typing.
pub const DROPPED_COLUMN: &str = "gutscheincode_werbung";

/// Homogeneous column storage, one variant per [`Kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Boolean(Vec<bool>),
    Integer(Vec<i64>),
    Numeric(Vec<Option<f64>>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn with_capacity(kind: Kind, capacity: usize) -> Self {
        match kind {
            Kind::Boolean => ColumnValues::Boolean(Vec::with_capacity(capacity)),
            Kind::IntegerCount => ColumnValues::Integer(Vec::with_capacity(capacity)),
            Kind::NumericWithUnit => ColumnValues::Numeric(Vec::with_capacity(capacity)),
            Kind::Text => ColumnValues::Text(Vec::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<Value<'_>> {
        Some(match self {
            ColumnValues::Boolean(v) => Value::Bool(*v.get(row)?),
            ColumnValues::Integer(v) => Value::Int(*v.get(row)?),
            ColumnValues::Numeric(v) => match v.get(row)? {
                Some(x) => Value::Float(*x),
                None => Value::Missing,
            },
            ColumnValues::Text(v) => Value::Text(v.get(row)?),
        })
    }

    /// Appends a parsed cell. A value of the wrong variant (including a
    /// failed parse) is stored as the column's missing/default value.
    fn push(&mut self, parsed: Option<ParsedValue>) {
        match self {
            ColumnValues::Boolean(v) => v.push(matches!(parsed, Some(ParsedValue::Bool(true)))),
            ColumnValues::Integer(v) => v.push(match parsed {
                Some(ParsedValue::Int(n)) => n,
                _ => 0,
            }),
            ColumnValues::Numeric(v) => v.push(match parsed {
                Some(ParsedValue::Float(x)) if x.is_finite() => Some(x),
                _ => None,
            }),
            ColumnValues::Text(v) => v.push(match parsed {
                Some(ParsedValue::Text(s)) => s,
                _ => String::new(),
            }),
        }
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            ColumnValues::Boolean(v) => ColumnValues::Boolean(rows.iter().map(|&i| v[i]).collect()),
            ColumnValues::Integer(v) => ColumnValues::Integer(rows.iter().map(|&i| v[i]).collect()),
            ColumnValues::Numeric(v) => ColumnValues::Numeric(rows.iter().map(|&i| v[i]).collect()),
            ColumnValues::Text(v) => ColumnValues::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Borrowed view of a single typed cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Missing,
    Text(&'a str),
}

impl Value<'_> {
    /// Numeric view for comparisons; `None` for missing and non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

/// Canonical text form, also used by the snapshot cache.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            // Integral floats keep a trailing ".0"; no exponent notation
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Missing => Ok(()),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub spec: ColumnSpec,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(spec: ColumnSpec, values: ColumnValues) -> Self {
        Self { spec, values }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> Kind {
        self.spec.kind
    }
}

/// Typed, column-aligned output of the pipeline. All columns have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedDataset {
    columns: Vec<Column>,
}

impl TypedDataset {
    /// Builds a dataset from columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, String> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(format!(
                    "column '{}' has {} values, expected {}",
                    bad.name(),
                    bad.values.len(),
                    expected
                ));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn specs(&self) -> Vec<ColumnSpec> {
        self.columns.iter().map(|c| c.spec.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn value(&self, column: &str, row: usize) -> Option<Value<'_>> {
        self.column(column)?.values.get(row)
    }

    /// Cells of one row in column order.
    pub fn row(&self, row: usize) -> Vec<Value<'_>> {
        self.columns.iter().filter_map(|c| c.values.get(row)).collect()
    }

    /// New dataset holding the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.spec.clone(), c.values.select(rows)))
            .collect();
        Self { columns }
    }

    fn drop_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c.name() != name);
        before != self.columns.len()
    }
}

// --- Assembly ---

/// Turns raw table text into a [`TypedDataset`].
pub struct DatasetAssembler {
    inferencer: KindInferencer,
}

impl DatasetAssembler {
    pub fn new() -> Self {
        Self { inferencer: KindInferencer::new() }
    }

    /// Assembles a dataset; a table without data rows yields an empty dataset.
    pub fn assemble(&self, raw: &RawTable) -> TypedDataset {
        if raw.header.is_empty() || raw.rows.is_empty() {
            tracing::info!("No data rows to assemble ({} header cells)", raw.header.len());
            return TypedDataset::default();
        }

        let width = raw.header.len();
        for (i, row) in raw.rows.iter().enumerate() {
            if row.len() > width {
                tracing::debug!("Row {} has {} cells, header has {}; extra cells dropped", i, row.len(), width);
            } else if row.len() < width {
                tracing::debug!("Row {} has {} cells, header has {}; padding", i, row.len(), width);
            }
        }

        let mut unparseable = 0usize;
        let mut columns = Vec::with_capacity(width);
        for (col, label) in raw.header.iter().enumerate() {
            let spec = self.inferencer.spec_for(label);
            let mut values = ColumnValues::with_capacity(spec.kind, raw.rows.len());

            for row in 0..raw.rows.len() {
                let cell = raw.cell(row, col).unwrap_or("");
                match parse_cell(cell, spec.kind) {
                    Ok(parsed) => values.push(Some(parsed)),
                    Err(e) => {
                        if !cell.is_empty() {
                            tracing::trace!("{} in column '{}', row {}", e, spec.name, row);
                            unparseable += 1;
                        }
                        values.push(None);
                    }
                }
            }
            tracing::debug!("Column '{}' typed as {}", spec.name, spec.kind);
            columns.push(Column::new(spec, values));
        }

        let mut dataset = TypedDataset { columns };
        if dataset.drop_column(DROPPED_COLUMN) {
            tracing::debug!("Dropped column '{}'", DROPPED_COLUMN);
        }

        tracing::info!(
            "Assembled dataset: {} rows x {} columns ({} unparseable cells set to missing)",
            dataset.row_count(),
            dataset.columns.len(),
            unparseable
        );
        dataset
    }
}

impl Default for DatasetAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles `raw` with the default inference rules.
pub fn assemble(raw: &RawTable) -> TypedDataset {
    DatasetAssembler::new().assemble(raw)
}
