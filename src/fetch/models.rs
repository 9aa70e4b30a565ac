// src/fetch/models.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LISTING_URL: &str = "https://www.escooter-treff.de/tabelle/";
pub const CURRENT_TABLE_ID: &str = "tablepress-2";
pub const DEPRECATED_TABLE_ID: &str = "tablepress-6";

/// Which of the two listing tables to work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListingTable {
    /// Models currently on sale
    Current,
    /// Models no longer sold
    Deprecated,
}

impl ListingTable {
    pub const ALL: [ListingTable; 2] = [ListingTable::Current, ListingTable::Deprecated];

    /// Value of the table's `id` attribute in the page markup.
    pub fn table_id(self) -> &'static str {
        match self {
            ListingTable::Current => CURRENT_TABLE_ID,
            ListingTable::Deprecated => DEPRECATED_TABLE_ID,
        }
    }

    /// File stem used for the cached snapshot of this table.
    pub fn cache_stem(self) -> &'static str {
        match self {
            ListingTable::Current => "escooter_current",
            ListingTable::Deprecated => "escooter_deprecated",
        }
    }
}

/// Where the listing lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSource {
    pub url: String,
}

impl ListingSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for ListingSource {
    fn default() -> Self {
        Self::new(DEFAULT_LISTING_URL)
    }
}
