// src/fetch/mod.rs
pub mod client;
pub mod models;

pub use client::{fetch_listing, fetch_text};
pub use models::{ListingSource, ListingTable};
