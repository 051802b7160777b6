// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains the captured record type, the selector
//! descriptions used to read entries, and the application configuration.

mod config;
mod record;
mod selectors;

// Re-export all public types
pub use config::{Config, ExtractionConfig, FeedConfig, Messages, ScraperConfig, parse_selector};
pub use record::{MEDIA_SEPARATOR, Record};
pub use selectors::EntrySelectors;
