//! Configuration constants and validation functions for the collector.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{CollectorError, Result};

/// Public occurrence endpoint of the SIMBA API.
pub const SIMBA_API_URL: &str = "https://simba.petrobras.com.br/simba/web/api/v1/occurrences/public";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Municipality used when none is given.
pub const DEFAULT_MUNICIPALITY: &str = "Penha";

/// Start date used when none is given.
pub const DEFAULT_START_DATE: &str = "2025-01-01";

/// Directory freshly collected files are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// File name of the manifest in the publish directory.
pub const FILES_INDEX_NAME: &str = "files-index.json";

/// Log file kept in the publish directory across builds.
pub const PRESERVED_LOG_NAME: &str = "server.log";

/// Pause between successive API calls in a batch run.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Cities collected by a batch run.
pub const DEFAULT_BATCH_CITIES: &[&str] = &["Penha"];

/// Years collected by a batch run.
pub const DEFAULT_BATCH_YEARS: &[u16] = &[2021, 2022, 2023, 2024, 2025];

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate date format (YYYY-MM-DD).
///
/// Future dates are accepted; the API simply returns no occurrences for them.
///
/// # Examples
/// ```
/// use simba_collector::config::validate_date;
///
/// assert!(validate_date("2025-01-01").is_ok());
/// assert!(validate_date("invalid").is_err());
/// assert!(validate_date("2025-13-01").is_err()); // Invalid month
/// ```
pub fn validate_date(date_str: &str) -> Result<()> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(CollectorError::InvalidDate(date_str.to_string()));
    }

    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| CollectorError::InvalidDate(date_str.to_string()))?;

    Ok(())
}

/// Settings for talking to the occurrence API.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub output_dir: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: SIMBA_API_URL.to_string(),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl CollectorConfig {
    /// Build a config from `SIMBA_API_URL` and `SIMBA_HTTP_TIMEOUT_SECS`,
    /// falling back to the built-in defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SIMBA_API_URL").unwrap_or_else(|_| SIMBA_API_URL.into());

        let timeout_secs: u64 = std::env::var("SIMBA_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(HTTP_TIMEOUT_SECS);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

/// Directory layout of a project checkout.
///
/// ```text
/// {root}/
/// ├── src/      # static viewer assets
/// ├── output/   # freshly collected files
/// ├── data/     # canonical data store
/// └── docs/     # publish directory served as a static site
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    pub src_dir: PathBuf,
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
    pub publish_dir: PathBuf,
}

impl SiteLayout {
    /// Standard layout under a project root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            src_dir: root.join("src"),
            output_dir: root.join(DEFAULT_OUTPUT_DIR),
            data_dir: root.join("data"),
            publish_dir: root.join("docs"),
        }
    }

    /// Location of the manifest inside the publish directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.publish_dir.join(FILES_INDEX_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_valid() {
        assert!(validate_date("2025-01-01").is_ok());
        assert!(validate_date("2024-12-31").is_ok());
        assert!(validate_date("2024-02-29").is_ok());
    }

    #[test]
    fn test_validate_date_invalid_format() {
        assert!(validate_date("").is_err());
        assert!(validate_date("2025/01/01").is_err());
        assert!(validate_date("01-01-2025").is_err());
        assert!(validate_date("2025-1-1").is_err());
        assert!(validate_date("2025-01-01T00:00:00").is_err());
    }

    #[test]
    fn test_validate_date_invalid_date() {
        assert!(validate_date("2025-13-01").is_err()); // Invalid month
        assert!(validate_date("2025-02-30").is_err()); // Invalid day
        assert!(validate_date("2023-02-29").is_err()); // Not a leap year
    }

    #[test]
    fn test_config_builders() {
        let config = CollectorConfig::default()
            .with_base_url("http://localhost:9999/api")
            .with_timeout(Duration::from_secs(5))
            .with_output_dir("/tmp/out");

        assert_eq!(config.base_url, "http://localhost:9999/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_default_config() {
        let config = CollectorConfig::default();
        assert_eq!(config.base_url, SIMBA_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(HTTP_TIMEOUT_SECS));
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_site_layout() {
        let layout = SiteLayout::new("/project");
        assert_eq!(layout.src_dir, PathBuf::from("/project/src"));
        assert_eq!(layout.output_dir, PathBuf::from("/project/output"));
        assert_eq!(layout.data_dir, PathBuf::from("/project/data"));
        assert_eq!(layout.publish_dir, PathBuf::from("/project/docs"));
        assert_eq!(
            layout.manifest_path(),
            PathBuf::from("/project/docs/files-index.json")
        );
    }
}
