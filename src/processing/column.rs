// src/processing/column.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Header Normalization ---

/// Cosmetic characters stripped from header labels.
const COSMETIC_TOKENS: [char; 3] = ['*', '(', ')'];

/// Recurring product-name header and its canonical replacement.
const MODEL_HEADER: (&str, &str) = ("eScooter", "Model");

/// Normalizes a raw header label into a column name.
///
/// `"Gewicht (kg)*"` becomes `"gewicht_kg"`, `"eScooter"` becomes `"model"`.
/// Applying it to an already normalized name returns the name unchanged.
pub fn normalize_header(label: &str) -> String {
    label
        .replace(MODEL_HEADER.0, MODEL_HEADER.1)
        .replace(&COSMETIC_TOKENS[..], "")
        .trim()
        .replace(' ', "_")
        .to_lowercase()
}

// --- Kinds ---

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Boolean,
    IntegerCount,
    NumericWithUnit,
    Text,
}

impl Kind {
    /// True for kinds whose values compare numerically.
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::IntegerCount | Kind::NumericWithUnit)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Boolean => "bool",
            Kind::IntegerCount => "int",
            Kind::NumericWithUnit => "float",
            Kind::Text => "text",
        };
        f.write_str(name)
    }
}

// --- Inference Rules ---

/// One classification rule: a normalized name matching `keywords` gets `kind`.
#[derive(Debug, Clone, Copy)]
pub struct KindRule {
    pub kind: Kind,
    pub keywords: &'static [&'static str],
}

impl KindRule {
    pub fn matches(&self, column_name: &str) -> bool {
        self.keywords.iter().any(|keyword| column_name.contains(keyword))
    }
}

/// Rules are evaluated in order and the first match wins. The keyword sets overlap
/// (`wechselakku` also contains the unit keyword `w`), so the order must be kept.
pub static DEFAULT_RULES: &[KindRule] = &[
    KindRule {
        kind: Kind::Boolean,
        keywords: &["toleranz_optimiert", "bremslicht", "wechselakku"],
    },
    KindRule {
        kind: Kind::IntegerCount,
        keywords: &["blinker"],
    },
    KindRule {
        kind: Kind::NumericWithUnit,
        keywords: &["kg", "km", "wh", "volt", "ah", "w", "zollgröße", "bis_kg", "uvp"],
    },
];

/// Picks a [`Kind`] for normalized column names using an ordered rule list.
///
/// Substring matching is deliberately loose: any name containing e.g. `w` is numeric,
/// including names where the letter is incidental.
#[derive(Debug, Clone, Copy)]
pub struct KindInferencer {
    rules: &'static [KindRule],
}

impl KindInferencer {
    pub fn new() -> Self {
        Self { rules: DEFAULT_RULES }
    }

    pub fn with_rules(rules: &'static [KindRule]) -> Self {
        Self { rules }
    }

    /// Kind for an already normalized column name.
    pub fn infer(&self, column_name: &str) -> Kind {
        self.rules
            .iter()
            .find(|rule| rule.matches(column_name))
            .map(|rule| rule.kind)
            .unwrap_or(Kind::Text)
    }

    /// Normalizes a raw header label and infers its kind.
    pub fn spec_for(&self, header_label: &str) -> ColumnSpec {
        let name = normalize_header(header_label);
        let kind = self.infer(&name);
        tracing::trace!("Column '{}' -> '{}' ({})", header_label, name, kind);
        ColumnSpec { name, kind }
    }
}

impl Default for KindInferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes a raw header label and infers its kind with the default rules.
pub fn infer_kind(header_label: &str) -> Kind {
    KindInferencer::new().spec_for(header_label).kind
}

/// A column's normalized name and semantic kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: Kind,
}
