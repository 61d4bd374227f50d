//! Error types for the collector.
//!
//! A single `CollectorError` covers every failure kind a collection, index or
//! publish run can hit. Batch and publish steps turn per-unit errors into
//! reported outcomes instead of aborting the whole run.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the collector library.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2025-01-01)")]
    InvalidDate(String),

    /// Network or transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The configured API URL cannot be parsed.
    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// File operation failed on a specific path.
    #[error("Failed to {action} {}: {source}", .path.display())]
    FileOperation {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Every unit of a batch run failed.
    #[error("No collection succeeded ({attempted} attempted)")]
    BatchFailed { attempted: usize },

    /// A required static asset is missing from the source tree.
    #[error("Required asset not found: {}", .0.display())]
    MissingAsset(PathBuf),
}

impl CollectorError {
    /// Wrap an IO error with the action and path it happened on.
    pub(crate) fn file(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::FileOperation {
            action,
            path,
            source,
        }
    }
}

/// Result type alias for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CollectorError::InvalidDate("2025/01/01".to_string());
        assert!(err.to_string().contains("2025/01/01"));
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_http_status_display() {
        let err = CollectorError::HttpStatus {
            status: 503,
            url: "https://example.com/api".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API returned status 503 for https://example.com/api"
        );
    }

    #[test]
    fn test_file_operation_display() {
        let wrap = CollectorError::file("move", "output/a.json");
        let err = wrap(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "Failed to move output/a.json: gone");
    }

    #[test]
    fn test_missing_asset_display() {
        let err = CollectorError::MissingAsset(PathBuf::from("src/index.html"));
        assert_eq!(err.to_string(), "Required asset not found: src/index.html");
    }
}
