//! Blocking fetch utilities for document loading.
//!
//! Provides a simple HTTP GET wrapper plus `data:` URL decoding. The parser
//! itself never performs I/O; everything network-shaped lives here so the
//! core stays synchronous and testable.

use base64::Engine;
use std::time::Duration;

/// User-Agent header sent with all requests.
///
/// Mimics a common desktop browser to avoid basic bot detection.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for transport failures.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be built or the request failed in transit.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    /// A `data:` URL could not be decoded.
    #[error("invalid data URL: {0}")]
    DataUrl(String),
}

/// Fetch a URL and return its body as raw bytes.
///
/// `data:` URLs are decoded locally; anything else goes through a blocking
/// HTTP GET with a short timeout.
///
/// # Errors
///
/// Returns [`FetchError`] if the client cannot be created, the request
/// fails, the response has a non-success status, or a `data:` payload
/// cannot be decoded.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    if url.starts_with("data:") {
        return decode_data_url(url);
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()?;

    let response = client.get(url).header("User-Agent", USER_AGENT).send()?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    Ok(response.bytes()?.to_vec())
}

/// Decode the payload of a `data:` URL into raw bytes.
///
/// Supports base64-encoded payloads; plain payloads are returned verbatim.
///
/// # Errors
///
/// Returns [`FetchError::DataUrl`] when the comma separator is missing or
/// base64 decoding fails.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let data_url = url.trim_start_matches("data:");
    let (metadata, data) = match data_url.find(',') {
        Some(i) => (&data_url[..i], &data_url[i + 1..]),
        None => return Err(FetchError::DataUrl("missing comma".to_string())),
    };

    if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| FetchError::DataUrl(format!("base64 decode error: {e}")))
    } else {
        Ok(data.as_bytes().to_vec())
    }
}
