//! XML event source and the raw callback interface.
//!
//! [`reader`] turns a byte stream into [`ContentHandler`] callbacks;
//! everything else in the crate consumes those callbacks.

mod handler;
pub mod reader;

pub use handler::{ContentHandler, EventRecorder, RecordedEvent};
pub use reader::{parse_file, parse_reader, parse_str};
