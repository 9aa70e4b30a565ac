// src/extractors/table.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table").expect("Failed to compile TABLE_SELECTOR")
});

static HEADER_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("thead th").expect("Failed to compile HEADER_CELL_SELECTOR")
});

// Fallback for tables without a <thead>: the <th> cells of the first row
static FIRST_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile FIRST_ROW_SELECTOR")
});

static TH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("th").expect("Failed to compile TH_SELECTOR")
});

static BODY_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tbody tr").expect("Failed to compile BODY_ROW_SELECTOR")
});

static DATA_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile DATA_CELL_SELECTOR")
});

// --- Data Structures ---

/// Untyped table text: the header labels followed by the body rows.
///
/// Body rows are stored exactly as found; their width is not checked against
/// the header, so consumers index defensively (see [`RawTable::cell`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Builds a table from a list of rows where row 0 holds the header labels.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let header = rows.remove(0);
        Self { header, rows }
    }

    /// Number of rows including the header row (0 for an empty table).
    pub fn len(&self) -> usize {
        if self.header.is_empty() && self.rows.is_empty() {
            0
        } else {
            self.rows.len() + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell text at `row`/`col`, or `None` when the row is shorter than requested.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Both listing tables found in one page. A table that was not present is empty.
#[derive(Debug, Clone, Default)]
pub struct ListingTables {
    pub current: RawTable,
    pub deprecated: RawTable,
}

// --- Main Extractor Structure ---
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self { Self {} }

    /// Parses `html_content` and extracts the table whose `id` equals `table_id`.
    pub fn extract_table(&self, html_content: &str, table_id: &str) -> Result<RawTable, ExtractError> {
        let document = Html::parse_document(html_content);
        self.extract_from_document(&document, table_id)
    }

    /// Like [`extract_table`](Self::extract_table) but a missing table is logged and
    /// reported as an empty [`RawTable`].
    pub fn extract_table_or_empty(&self, html_content: &str, table_id: &str) -> RawTable {
        let document = Html::parse_document(html_content);
        self.extract_or_empty(&document, table_id)
    }

    /// Extracts the current and deprecated tables from one document, parsing it once.
    /// A missing table never prevents extraction of the other one.
    pub fn extract_listing(&self, html_content: &str, current_id: &str, deprecated_id: &str) -> ListingTables {
        let document = Html::parse_document(html_content);
        ListingTables {
            current: self.extract_or_empty(&document, current_id),
            deprecated: self.extract_or_empty(&document, deprecated_id),
        }
    }

    fn extract_or_empty(&self, document: &Html, table_id: &str) -> RawTable {
        match self.extract_from_document(document, table_id) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("{}; continuing without it", e);
                RawTable::default()
            }
        }
    }

    /// Extracts header and body rows of the first `<table id=table_id>` in `document`.
    pub fn extract_from_document(&self, document: &Html, table_id: &str) -> Result<RawTable, ExtractError> {
        let table = document
            .select(&TABLE_SELECTOR)
            .find(|t| t.value().attr("id") == Some(table_id))
            .ok_or_else(|| ExtractError::TableNotFound(table_id.to_string()))?;

        let header = self.header_labels(table);
        if header.is_empty() {
            return Err(ExtractError::MissingHeader(table_id.to_string()));
        }

        let mut rows = Vec::new();
        for row in table.select(&BODY_ROW_SELECTOR) {
            let cells: Vec<String> = row.select(&DATA_CELL_SELECTOR).map(cell_text).collect();
            if cells.is_empty() {
                tracing::trace!("Skipping body row without data cells in '{}'", table_id);
                continue;
            }
            rows.push(cells);
        }

        tracing::debug!("Extracted table '{}': {} columns, {} rows", table_id, header.len(), rows.len());
        Ok(RawTable { header, rows })
    }

    fn header_labels(&self, table: ElementRef) -> Vec<String> {
        let labels: Vec<String> = table.select(&HEADER_CELL_SELECTOR).map(cell_text).collect();
        if !labels.is_empty() {
            return labels;
        }
        table
            .select(&FIRST_ROW_SELECTOR)
            .next()
            .map(|row| row.select(&TH_SELECTOR).map(cell_text).collect())
            .unwrap_or_default()
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Cell text: each text fragment trimmed, non-empty fragments joined without separator.
fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"
        <!DOCTYPE html>
        <html><head><title>Tabelle</title></head><body>
        <table id="other"><thead><tr><th>Ignore</th></tr></thead><tbody><tr><td>me</td></tr></tbody></table>
        <table id="tablepress-2">
            <thead><tr><th> eScooter </th><th>Gewicht (kg)*</th><th>Bremslicht</th></tr></thead>
            <tbody>
                <tr><td>Alpha One</td><td>15,5 <span>kg</span></td><td>✓</td></tr>
                <tr></tr>
                <tr><td>Beta</td><td>12</td></tr>
            </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_extracts_header_and_rows() {
        let extractor = TableExtractor::new();
        let table = extractor.extract_table(LISTING_HTML, "tablepress-2").expect("table should exist");

        assert_eq!(table.header, vec!["eScooter", "Gewicht (kg)*", "Bremslicht"]);
        assert_eq!(table.rows.len(), 2, "row without data cells should be skipped");
        assert_eq!(table.rows[0], vec!["Alpha One", "15,5kg", "✓"]);
        // Short rows are kept as-is
        assert_eq!(table.rows[1], vec!["Beta", "12"]);
        assert_eq!(table.cell(1, 2), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_missing_table_is_not_found() {
        let extractor = TableExtractor::new();
        let err = extractor.extract_table(LISTING_HTML, "tablepress-6").unwrap_err();
        assert_eq!(err, ExtractError::TableNotFound("tablepress-6".to_string()));

        let empty = extractor.extract_table_or_empty(LISTING_HTML, "tablepress-6");
        assert!(empty.is_empty());
    }

    #[test]
    fn test_missing_table_does_not_block_other_table() {
        let extractor = TableExtractor::new();
        let tables = extractor.extract_listing(LISTING_HTML, "tablepress-6", "tablepress-2");
        assert!(tables.current.is_empty());
        assert_eq!(tables.deprecated.rows.len(), 2);
    }

    #[test]
    fn test_header_without_thead_uses_first_row() {
        let html = r#"<table id="t"><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>"#;
        let table = TableExtractor::new().extract_table(html, "t").unwrap();
        assert_eq!(table.header, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_table_without_header_cells_is_rejected() {
        let html = r#"<table id="t"><tr><td>1</td></tr></table>"#;
        let err = TableExtractor::new().extract_table(html, "t").unwrap_err();
        assert_eq!(err, ExtractError::MissingHeader("t".to_string()));
    }

    #[test]
    fn test_from_rows_splits_header() {
        let table = RawTable::from_rows(vec![
            vec!["a".to_string()],
            vec!["1".to_string()],
        ]);
        assert_eq!(table.header, vec!["a"]);
        assert_eq!(table.rows.len(), 1);
        assert!(RawTable::from_rows(Vec::new()).is_empty());
    }
}
