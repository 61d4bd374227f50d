//! Occurrence collection: one API call per municipality and start date.

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::config::{validate_date, CollectorConfig};
use crate::error::Result;
use crate::http::{build_url, create_client, get_text};
use crate::parser::parse_records;
use crate::types::CollectionResult;
use crate::writer::write_json_atomic;

/// Client for the SIMBA public occurrence endpoint.
#[derive(Debug, Clone)]
pub struct Collector {
    config: CollectorConfig,
    client: Client,
}

impl Collector {
    /// Create a collector with its own HTTP client.
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let client = create_client(&config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Fetch occurrences for a municipality starting at `start_date`.
    ///
    /// A response that does not parse as XML yields an empty result rather
    /// than an error.
    ///
    /// # Arguments
    /// * `municipality` - Municipality name, sent as-is
    /// * `start_date` - Start date in YYYY-MM-DD format
    pub fn collect(&self, municipality: &str, start_date: &str) -> Result<CollectionResult> {
        validate_date(start_date)?;

        let url = build_url(
            &self.config.base_url,
            &[("municipality", municipality), ("start_date", start_date)],
        )?;
        let body = get_text(&self.client, url)?;
        let records = parse_records(&body);

        tracing::info!(
            municipality,
            start_date,
            count = records.len(),
            "Collected occurrences"
        );

        Ok(CollectionResult::new(municipality, start_date, records))
    }

    /// Save a result as indented JSON and return the path written.
    ///
    /// Without a file name, [`CollectionResult::default_filename`] is used.
    /// Relative paths are resolved against the configured output directory.
    /// An existing file with the same name is overwritten.
    pub fn save(&self, result: &CollectionResult, filename: Option<&Path>) -> Result<PathBuf> {
        let path = self.resolve_path(result, filename);
        write_json_atomic(&path, result)?;

        tracing::info!(path = %path.display(), count = result.count(), "Saved collection");
        Ok(path)
    }

    fn resolve_path(&self, result: &CollectionResult, filename: Option<&Path>) -> PathBuf {
        match filename {
            Some(name) if name.is_absolute() => name.to_path_buf(),
            Some(name) => self.config.output_dir.join(name),
            None => self.config.output_dir.join(result.default_filename()),
        }
    }
}
