//! Error types for fragment extraction.
//!
//! A single `FragmentError` covers the whole pipeline, from the XML event
//! source through path matching to value conversion and the CLI inputs.

use thiserror::Error;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// The XML input is not well-formed.
    #[error("XML parsing failed at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// Names or text could not be decoded as UTF-8.
    #[error("Invalid text encoding: {0}")]
    Encoding(String),

    /// An element or attribute used a namespace prefix that was never declared.
    #[error("Undeclared namespace prefix in <{0}>")]
    UnknownPrefix(String),

    /// An entity reference that is neither predefined nor a character reference.
    #[error("Unknown entity reference: &{0};")]
    UnknownEntity(String),

    /// Non-whitespace character data before or after the root element.
    #[error("Character data outside the root element: '{0}'")]
    TextOutsideRoot(String),

    /// The input contained no root element.
    #[error("Document has no root element")]
    EmptyDocument,

    /// A second top-level element followed the root element.
    #[error("Element <{0}> follows the root element")]
    MultipleRoots(String),

    /// The input ended before every element was closed.
    #[error("Document ended with {depth} unclosed element(s)")]
    UnexpectedEof { depth: usize },

    /// An end-element arrived while the path stack was empty.
    #[error("Path stack underflow on </{0}>")]
    PathUnderflow(String),

    /// A path specification could not be parsed.
    #[error("Invalid path specification '{spec}': {reason}")]
    InvalidPathSpec { spec: String, reason: String },

    /// More than one registered path matched under the reject policy.
    #[error("Path {path} matches several registered specs: {}", .specs.join(", "))]
    AmbiguousMatch { path: String, specs: Vec<String> },

    /// Element content could not be converted to the requested type.
    #[error("Invalid {kind} value '{content}': {reason}")]
    InvalidValue {
        kind: &'static str,
        content: String,
        reason: String,
    },

    /// A simple value element contained a child element.
    #[error("Unexpected child element <{element}> inside value element <{parent}>")]
    NestedElement { element: String, parent: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to download a document.
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// All download attempts failed with transient errors.
    #[error("Download failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The response body exceeded the configured limit.
    #[error("Response from {url} exceeds the maximum size of {limit} bytes")]
    ResponseTooLarge { url: String, limit: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FragmentError {
    /// Build an `InvalidValue` error for the given value kind.
    pub fn invalid_value(
        kind: &'static str,
        content: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            kind,
            content: content.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error was raised while converting element content.
    #[must_use]
    pub fn is_value_error(&self) -> bool {
        matches!(self, Self::InvalidValue { .. } | Self::NestedElement { .. })
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, FragmentError>;
