// src/processing/mod.rs
pub mod column;
pub mod dataset;
pub mod filter;
pub mod value;

// Re-export key processing types for convenience
pub use column::{infer_kind, normalize_header, ColumnSpec, Kind, KindInferencer, KindRule};
pub use dataset::{assemble, Column, ColumnValues, DatasetAssembler, TypedDataset, Value};
pub use value::{parse_cell, ParsedValue};
