//! Configuration constants, environment settings and validation functions.

use regex::Regex;
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};

use crate::error::{FragmentError, Result};

/// Default `strftime` format for date values (ISO-8601 calendar date).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default maximum HTTP response size in bytes (100 MB).
///
/// Documents are parsed from memory once fetched, so the limit bounds the
/// memory used for a single download.
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 100 * 1024 * 1024;

/// Log level used when `RUST_LOG` is not set or cannot be parsed.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable overriding the maximum response size.
pub const ENV_MAX_RESPONSE_SIZE: &str = "SAX_FRAGMENTS_MAX_RESPONSE_SIZE";

/// Environment variable overriding the HTTP timeout.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SAX_FRAGMENTS_HTTP_TIMEOUT_SECS";

/// Environment variable overriding the default log level.
pub const ENV_LOG_LEVEL: &str = "SAX_FRAGMENTS_LOG_LEVEL";

/// XML NCName: a name without a colon.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NCNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}\p{M}._\-\x{B7}]*$").expect("valid regex")
});

/// Check that a name is a valid XML NCName.
///
/// # Examples
/// ```
/// use sax_fragments::config::is_ncname;
///
/// assert!(is_ncname("considerans.al"));
/// assert!(!is_ncname("1abc"));
/// assert!(!is_ncname("a:b"));
/// ```
#[must_use]
pub fn is_ncname(name: &str) -> bool {
    NCNAME_PATTERN.is_match(name)
}

/// Validate a `strftime` date format.
///
/// # Returns
/// * `Ok(())` if chrono understands every specifier
/// * `Err(FragmentError::Config)` otherwise
///
/// # Examples
/// ```
/// use sax_fragments::config::validate_date_format;
///
/// assert!(validate_date_format("%d-%m-%Y").is_ok());
/// assert!(validate_date_format("%Q").is_err());
/// ```
pub fn validate_date_format(format: &str) -> Result<()> {
    if format.trim().is_empty() {
        return Err(FragmentError::Config("date format is empty".to_string()));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(FragmentError::Config(format!(
            "invalid date format: '{format}'"
        )));
    }
    Ok(())
}

/// Process settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_response_size: u64,
    pub http_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    ///
    /// Unset variables fall back to defaults; set but unparsable values
    /// are a `Config` error.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let max_response_size = parse_var(&lookup, ENV_MAX_RESPONSE_SIZE)?
            .unwrap_or(defaults.max_response_size);
        let http_timeout_secs = parse_var(&lookup, ENV_HTTP_TIMEOUT_SECS)?
            .unwrap_or(defaults.http_timeout_secs);
        let log_level = lookup(ENV_LOG_LEVEL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_level);

        if max_response_size == 0 {
            return Err(FragmentError::Config(format!(
                "{ENV_MAX_RESPONSE_SIZE} must be greater than zero"
            )));
        }

        Ok(Self {
            max_response_size,
            http_timeout_secs,
            log_level,
        })
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| FragmentError::Config(format!("{key} is not a number: '{raw}'"))),
    }
}
