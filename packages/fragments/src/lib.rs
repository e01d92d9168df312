//! sax-fragments - Path-addressed fragment extraction from streaming XML.
//!
//! A document is read as a stream of events. A [`PathFragmentFilter`] tracks
//! the path of open elements and routes every subtree whose path matches a
//! registered [`PathSpec`] to a handler. A [`ContentToFragmentAdapter`]
//! turns such a subtree into calls on a [`FragmentHandler`], which produces
//! one typed value per matched fragment.
//!
//! # Example
//!
//! ```
//! use sax_fragments::fragment::handlers::DateValueHandler;
//! use sax_fragments::xml::parse_str;
//! use sax_fragments::{ContentToFragmentAdapter, PathFragmentFilter, PathSpec};
//!
//! let xml = "<invoice><date>2009-01-01</date><note><date/></note></invoice>";
//!
//! let mut dates = ContentToFragmentAdapter::new(DateValueHandler::default());
//! let mut filter = PathFragmentFilter::new()
//!     .with_handler(PathSpec::parse("/invoice/date").unwrap(), &mut dates);
//! parse_str(xml, &mut filter).unwrap();
//! drop(filter);
//!
//! assert_eq!(dates.values().len(), 1);
//! assert_eq!(dates.values()[0].unwrap().to_string(), "2009-01-01");
//! ```
//!
//! # Architecture
//!
//! - [`xml`]: Streaming event source and the [`ContentHandler`] callbacks
//! - [`path`]: Path tracking and path specifications
//! - [`fragment`]: Filter, adapter and the built-in fragment handlers
//! - [`converters`]: Text-to-value conversions used by value handlers
//! - [`extract`]: One-call extraction from strings, files and URLs
//! - [`http`]: HTTP client for remote documents
//! - [`config`]: Constants, validation and environment settings
//! - [`logging`]: Process-wide `tracing` setup
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod converters;
pub mod error;
pub mod extract;
pub mod fragment;
pub mod http;
pub mod logging;
pub mod path;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use error::{FragmentError, Result};
pub use fragment::{ContentToFragmentAdapter, FragmentHandler, MatchPolicy, PathFragmentFilter};
pub use path::{PathSpec, PathTracker};
pub use types::{QName, StartElement};
pub use xml::ContentHandler;
