// src/lib.rs
pub mod display;
pub mod extractors;
pub mod fetch;
pub mod processing;
pub mod storage;
pub mod utils;
