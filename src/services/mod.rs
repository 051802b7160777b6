//! Service layer for the harvester.
//!
//! This module contains the building blocks of the scrape loop:
//! - Entry extraction (`Extractor`, `EntryStrategy`)
//! - Requesting older history (`FeedAdvancer`)
//! - Duplicate suppression (`DedupLedger`)

mod advancer;
mod extractor;
mod ledger;
mod strategy;

pub use advancer::FeedAdvancer;
pub use extractor::{Extraction, Extractor};
pub use ledger::DedupLedger;
pub use strategy::{EntryStrategy, SelectorStrategy};
