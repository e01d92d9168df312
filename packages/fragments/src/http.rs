//! HTTP client wrapper for fetching XML documents.

use std::io::Read;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{FragmentError, Result};

/// User agent string identifying this tool.
const USER_AGENT: &str = concat!("sax-fragments/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Create a configured HTTP client.
pub fn create_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Outcome of a single request.
enum Attempt {
    Done(Vec<u8>),
    Retry(String),
}

/// Download content from a URL with retry logic.
///
/// Uses exponential backoff for transient failures (network errors, 5xx
/// responses). Client errors and oversized bodies are returned immediately.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to download from
/// * `max_size` - Maximum accepted body size in bytes
///
/// # Returns
/// Raw bytes of the response body
pub fn download_bytes(client: &Client, url: &str, max_size: u64) -> Result<Vec<u8>> {
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(url, attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        match request_once(client, url, max_size)? {
            Attempt::Done(body) => return Ok(body),
            Attempt::Retry(reason) => {
                tracing::warn!(
                    url,
                    reason = %reason,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "Transient failure, will retry"
                );
                last_error = Some(reason);
            }
        }
    }

    Err(FragmentError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

fn request_once(client: &Client, url: &str, max_size: u64) -> Result<Attempt> {
    let response = match client.get(url).send() {
        Ok(response) => response,
        Err(e) if e.is_connect() || e.is_timeout() => return Ok(Attempt::Retry(e.to_string())),
        Err(e) => return Err(FragmentError::Http(e)),
    };

    let status = response.status();
    if status.is_server_error() {
        return Ok(Attempt::Retry(format!("Server error: {status}")));
    }

    let response = response.error_for_status()?;
    if response.content_length().is_some_and(|len| len > max_size) {
        return Err(too_large(url, max_size));
    }
    read_limited(response, url, max_size).map(Attempt::Done)
}

/// Read a body of unknown length, holding at most `max_size + 1` bytes.
fn read_limited(body: impl Read, url: &str, max_size: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    body.take(max_size.saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() as u64 > max_size {
        return Err(too_large(url, max_size));
    }
    Ok(buf)
}

/// Download an XML document, attributing HTTP failures to the URL.
pub fn fetch_document(client: &Client, url: &str, max_size: u64) -> Result<Vec<u8>> {
    tracing::debug!(url, "Fetching XML document");
    download_bytes(client, url, max_size).map_err(|e| {
        if let FragmentError::Http(source) = e {
            FragmentError::Download {
                url: url.to_string(),
                source,
            }
        } else {
            e
        }
    })
}

fn too_large(url: &str, limit: u64) -> FragmentError {
    FragmentError::ResponseTooLarge {
        url: url.to_string(),
        limit,
    }
}
