//! Path-addressed fragment dispatch.
//!
//! A [`PathFragmentFilter`] decides which subtrees of a streaming document
//! are interesting; a [`ContentToFragmentAdapter`] turns each of those
//! subtrees into calls on a [`FragmentHandler`], which produces a value.

mod adapter;
mod filter;
mod handler;
pub mod handlers;

pub use adapter::ContentToFragmentAdapter;
pub use filter::{MatchPolicy, PathFragmentFilter};
pub use handler::FragmentHandler;
