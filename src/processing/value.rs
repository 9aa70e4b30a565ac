// src/processing/value.rs
use crate::processing::column::Kind;
use crate::utils::error::Unparseable;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// A decimal-or-integer run; signs, exponents and thousands separators are not part of it.
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("Failed to compile NUMBER_RE")
});

/// Affirmative token, matched case-insensitively anywhere in the cell.
const AFFIRMATIVE_TOKEN: &str = "ja";
const CHECKMARK: char = '✓';

/// A cell converted to its column kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Converts one raw cell according to `kind`.
///
/// Only [`Kind::NumericWithUnit`] can fail; the other kinds always yield a value
/// (`false` and `0` stand in for cells without a usable signal).
pub fn parse_cell(raw: &str, kind: Kind) -> Result<ParsedValue, Unparseable> {
    match kind {
        Kind::Boolean => Ok(ParsedValue::Bool(parse_bool(raw))),
        Kind::IntegerCount => Ok(ParsedValue::Int(parse_count(raw))),
        Kind::NumericWithUnit => parse_numeric(raw)
            .map(ParsedValue::Float)
            .ok_or_else(|| Unparseable(raw.to_string())),
        Kind::Text => Ok(ParsedValue::Text(raw.to_string())),
    }
}

/// True when the cell contains the affirmative token or a checkmark.
/// Unknown or ambiguous cells are `false`; there is no missing boolean.
pub fn parse_bool(raw: &str) -> bool {
    raw.to_lowercase().contains(AFFIRMATIVE_TOKEN) || raw.contains(CHECKMARK)
}

/// Integer part of the first number in the cell; empty or number-less cells count as 0.
pub fn parse_count(raw: &str) -> i64 {
    if raw.is_empty() {
        return 0;
    }
    parse_numeric(raw).map(|v| v.trunc() as i64).unwrap_or(0)
}

/// Extracts a number from free-form text with units.
///
/// * `"15,5 kg"` -> `15.5` (comma decimal separator)
/// * `"2x250W"` -> `500.0` (count times value)
/// * `"250-300 km"` -> `250.0` (first number of a range)
/// * `""` -> `None`
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let value = raw.replace(',', ".");

    if value.contains('x') && NUMBER_RE.find_iter(&value).nth(1).is_some() {
        if let Some(product) = parse_multiplied(&value) {
            return Some(product);
        }
        tracing::trace!("'{}' looked multiplicative but did not parse, using first number", raw);
    }

    NUMBER_RE.find(&value).and_then(|m| m.as_str().parse().ok())
}

/// `"<count>x<value><unit>"`: the text before the first `x` must be a bare number.
fn parse_multiplied(value: &str) -> Option<f64> {
    let lower = value.to_lowercase();
    let mut parts = lower.split('x');
    let count: f64 = parts.next()?.trim().parse().ok()?;
    let each: f64 = NUMBER_RE.find(parts.next()?)?.as_str().parse().ok()?;
    Some(count * each)
}
