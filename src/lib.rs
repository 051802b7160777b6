// src/lib.rs

//! Feed Harvester Library
//!
//! Walks a virtualized, reverse-chronological message feed backwards in
//! time and collects its entries into a deduplicated, exportable record set.

pub mod error;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
