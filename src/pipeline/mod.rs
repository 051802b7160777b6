//! Scrape pipeline.
//!
//! - `controller`: the start/stop-able scrape loop
//! - `export`: JSON and delimited-text renderings of a session
//! - `observer`: progress signals towards the presentation layer

pub mod controller;
pub mod export;
pub mod observer;

pub use controller::{ScrapeController, ScrapeState, Session};
pub use export::{ExportFormat, to_delimited, to_json, write_export};
pub use observer::{ConsoleObserver, ScrapeObserver};
