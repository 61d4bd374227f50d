//! HTTP client wrapper for the occurrence API.

use reqwest::blocking::Client;
use reqwest::Url;

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};

/// User agent string identifying this collector.
const USER_AGENT: &str = concat!("simba-collector/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
pub fn create_client(config: &CollectorConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Build a request URL with URL-encoded query parameters appended.
///
/// # Examples
/// ```
/// use simba_collector::http::build_url;
///
/// let params = [("municipality", "Balneário Camboriú")];
/// let url = build_url("https://example.com/api", &params).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://example.com/api?municipality=Balne%C3%A1rio+Cambori%C3%BA"
/// );
/// ```
pub fn build_url(base_url: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(base_url, params).map_err(|e| CollectorError::InvalidUrl {
        url: base_url.to_string(),
        message: e.to_string(),
    })
}

/// Issue a single GET request and return the body as text.
///
/// Non-success statuses are reported as [`CollectorError::HttpStatus`].
/// There is no retry: a failed request fails the caller's collection.
pub fn get_text(client: &Client, url: Url) -> Result<String> {
    tracing::debug!(url = %url, "Sending request");

    let response = client.get(url.clone()).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(CollectorError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes()?;
    Ok(bytes_to_string(&bytes, url.as_str()))
}

/// Decode a response body as UTF-8, replacing invalid sequences.
pub fn bytes_to_string(bytes: &[u8], context: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                context,
                "Response body is not valid UTF-8, replacing invalid sequences"
            );
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client(&CollectorConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://example.com/occurrences",
            &[("municipality", "Penha"), ("start_date", "2025-01-01")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/occurrences?municipality=Penha&start_date=2025-01-01"
        );
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        assert!(build_url("not a url", &[]).is_err());
    }

    #[test]
    fn test_bytes_to_string_lossy() {
        assert_eq!(bytes_to_string(b"ok", "test"), "ok");
        assert_eq!(bytes_to_string(&[b'a', 0xff, b'b'], "test"), "a\u{fffd}b");
    }
}
