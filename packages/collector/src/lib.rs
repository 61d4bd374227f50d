//! SIMBA Collector - Collect wildlife occurrence records and publish them.
//!
//! This crate downloads occurrence records from the SIMBA public API
//! (Simple Darwin Core XML), stores them as JSON files and prepares a static
//! site directory with a files index for the web viewer.
//!
//! # Example
//!
//! ```
//! use simba_collector::parser::parse_records;
//!
//! let xml = r#"<dwr:SimpleDarwinRecordSet xmlns:dwr="http://rs.tdwg.org/dwc/xsd/simpledarwincore/"
//!     xmlns:dwc="http://rs.tdwg.org/dwc/terms/">
//!   <dwr:SimpleDarwinRecord><dwc:genus>Sula</dwc:genus></dwr:SimpleDarwinRecord>
//! </dwr:SimpleDarwinRecordSet>"#;
//!
//! let records = parse_records(xml);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get("genus"), Some("Sula"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, validation and directory layout
//! - [`types`]: Core data types (OccurrenceRecord, CollectionResult, FileManifest)
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML utilities
//! - [`parser`]: Simple Darwin Core record parsing
//! - [`http`]: HTTP client for the occurrence API
//! - [`writer`]: Atomic JSON file writing
//! - [`collector`]: Single collection and saving
//! - [`batch`]: City-by-year batch collection
//! - [`index`]: Data consolidation and files index generation
//! - [`publish`]: Static site build
//! - [`stats`]: Dataset statistics
//! - [`cli`]: Command-line interface

pub mod batch;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod http;
pub mod index;
pub mod parser;
pub mod publish;
pub mod stats;
pub mod types;
pub mod writer;
pub mod xml;

// Re-export commonly used items
pub use collector::Collector;
pub use config::{validate_date, CollectorConfig, SiteLayout};
pub use error::{CollectorError, Result};
pub use types::{CollectionResult, FileManifest, OccurrenceRecord};
